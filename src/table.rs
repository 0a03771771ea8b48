//! Register tables: ordered address/value sequences with embedded directives.

use crate::error::TableError;
use crate::validation;

/// Reserved address: sleep for `value` milliseconds.
pub const TABLE_WAIT_MS: u16 = 0x0000;
/// Reserved address: end of table.
pub const TABLE_END: u16 = 0x0001;

/// Upper bound on entries scanned while looking for `END`.
pub const MAX_TABLE_ENTRIES: usize = 4096;

/// One register table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEntry {
    /// Register address, or one of the sentinel addresses.
    pub address: u16,
    /// Register value, or the directive argument.
    pub value: u8,
}

/// What an entry asks the sequence engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Write `value` to `address`.
    Write {
        /// Register address.
        address: u16,
        /// Register value.
        value: u8,
    },
    /// Sleep this many milliseconds before the next entry.
    Wait(u32),
    /// Stop; the table is complete.
    End,
}

impl RegisterEntry {
    /// A register write.
    pub const fn write(address: u16, value: u8) -> Self {
        Self { address, value }
    }

    /// A wait directive of `ms` milliseconds.
    pub const fn wait_ms(ms: u8) -> Self {
        Self {
            address: TABLE_WAIT_MS,
            value: ms,
        }
    }

    /// The end-of-table sentinel.
    pub const fn end() -> Self {
        Self {
            address: TABLE_END,
            value: 0x00,
        }
    }

    /// Whether this is the end sentinel.
    pub const fn is_end(&self) -> bool {
        self.address == TABLE_END
    }

    /// Interpret the entry.
    pub fn directive(&self) -> Directive {
        match self.address {
            TABLE_WAIT_MS => Directive::Wait(u32::from(self.value)),
            TABLE_END => Directive::End,
            address => Directive::Write {
                address,
                value: self.value,
            },
        }
    }
}

/// A named, immutable register table.
///
/// Tables are static data. Construction does not validate; validation runs
/// when a table enters a catalog and again before every application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterTable {
    name: &'static str,
    entries: &'static [RegisterEntry],
}

impl RegisterTable {
    /// Wrap a static entry slice.
    pub const fn new(name: &'static str, entries: &'static [RegisterEntry]) -> Self {
        Self { name, entries }
    }

    /// Symbolic table name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Raw entries, including sentinels.
    pub const fn entries(&self) -> &'static [RegisterEntry] {
        self.entries
    }

    /// Check termination and return the entries up to, but excluding, `END`.
    pub fn reachable(&self) -> Result<&'static [RegisterEntry], TableError> {
        let end = validation::validate_table(self.name, self.entries)?;
        Ok(self.entries.get(..end).unwrap_or_default())
    }

    /// Number of entries that reach the transport.
    pub fn write_count(&self) -> Result<usize, TableError> {
        Ok(self
            .reachable()?
            .iter()
            .filter(|entry| matches!(entry.directive(), Directive::Write { .. }))
            .count())
    }
}
