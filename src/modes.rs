//! Mode catalog: resolves host-selected mode ids to register tables.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigurationError;
use crate::table::RegisterTable;
use crate::validation::{validate_mode_count, validate_mode_ids};

/// Positional mode index as selected by the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeId(u32);

impl ModeId {
    /// Wrap a raw index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolution and frame rates of one sensor mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDescriptor {
    /// Catalog position of this mode.
    pub id: ModeId,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Supported frame rates in frames per second.
    pub frame_rates: BTreeSet<u32>,
}

impl ModeDescriptor {
    /// Describe a mode.
    pub fn new(id: u32, (width, height): (u32, u32), frame_rates: &[u32]) -> Self {
        Self {
            id: ModeId::new(id),
            width,
            height,
            frame_rates: frame_rates.iter().copied().collect(),
        }
    }

    /// `(width, height)`.
    pub const fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Immutable, validated set of modes and their register tables.
#[derive(Debug, Clone)]
pub struct ModeCatalog {
    modes: Vec<(ModeDescriptor, RegisterTable)>,
    common: RegisterTable,
    start_stream: RegisterTable,
    stop_stream: RegisterTable,
}

impl ModeCatalog {
    /// Start building a catalog.
    pub fn builder() -> ModeCatalogBuilder {
        ModeCatalogBuilder::default()
    }

    /// Register table for `mode`.
    pub fn resolve(&self, mode: ModeId) -> Result<&RegisterTable, ConfigurationError> {
        self.entry(mode).map(|(_, table)| table)
    }

    /// Descriptor for `mode`.
    pub fn descriptor(&self, mode: ModeId) -> Result<&ModeDescriptor, ConfigurationError> {
        self.entry(mode).map(|(descriptor, _)| descriptor)
    }

    /// Table applied before every mode table.
    pub const fn common(&self) -> &RegisterTable {
        &self.common
    }

    /// Table that starts pixel output.
    pub const fn start_stream(&self) -> &RegisterTable {
        &self.start_stream
    }

    /// Table that stops pixel output.
    pub const fn stop_stream(&self) -> &RegisterTable {
        &self.stop_stream
    }

    /// Mode descriptors in host order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ModeDescriptor> + '_ {
        self.modes.iter().map(|(descriptor, _)| descriptor)
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Whether the catalog has no modes.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    fn entry(&self, mode: ModeId) -> Result<&(ModeDescriptor, RegisterTable), ConfigurationError> {
        usize::try_from(mode.get())
            .ok()
            .and_then(|index| self.modes.get(index))
            .ok_or(ConfigurationError::UnknownMode(mode.get()))
    }
}

/// Builder for [`ModeCatalog`].
#[derive(Debug, Default)]
pub struct ModeCatalogBuilder {
    modes: Vec<(ModeDescriptor, RegisterTable)>,
    common: Option<RegisterTable>,
    start_stream: Option<RegisterTable>,
    stop_stream: Option<RegisterTable>,
}

impl ModeCatalogBuilder {
    /// Set the common initialization table.
    #[must_use]
    pub fn common(mut self, table: RegisterTable) -> Self {
        self.common = Some(table);
        self
    }

    /// Set the stream-on table.
    #[must_use]
    pub fn start_stream(mut self, table: RegisterTable) -> Self {
        self.start_stream = Some(table);
        self
    }

    /// Set the stream-off table.
    #[must_use]
    pub fn stop_stream(mut self, table: RegisterTable) -> Self {
        self.stop_stream = Some(table);
        self
    }

    /// Append a mode. Order must match the host's mode indices.
    #[must_use]
    pub fn mode(mut self, descriptor: ModeDescriptor, table: RegisterTable) -> Self {
        self.modes.push((descriptor, table));
        self
    }

    /// Validate everything and freeze the catalog.
    ///
    /// `expected_modes` is the mode count asserted by the board
    /// configuration; any disagreement is a configuration defect.
    pub fn build(self, expected_modes: usize) -> Result<ModeCatalog, ConfigurationError> {
        let common = self.common.ok_or(ConfigurationError::MissingTable("common"))?;
        let start_stream = self
            .start_stream
            .ok_or(ConfigurationError::MissingTable("start_stream"))?;
        let stop_stream = self
            .stop_stream
            .ok_or(ConfigurationError::MissingTable("stop_stream"))?;

        validate_mode_count(expected_modes, self.modes.len())?;

        let descriptors: Vec<ModeDescriptor> =
            self.modes.iter().map(|(descriptor, _)| descriptor.clone()).collect();
        validate_mode_ids(&descriptors)?;

        for table in [&common, &start_stream, &stop_stream]
            .into_iter()
            .chain(self.modes.iter().map(|(_, table)| table))
        {
            table.reachable()?;
        }

        Ok(ModeCatalog {
            modes: self.modes,
            common,
            start_stream,
            stop_stream,
        })
    }
}
