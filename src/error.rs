//! Error taxonomy for the sensor driver.

use std::path::PathBuf;

/// Failure reported by the register transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The device did not acknowledge the transfer.
    #[error("device did not acknowledge")]
    Nack,
    /// The bus reported an error.
    #[error("bus error: {0}")]
    Bus(String),
    /// The transfer did not complete in time.
    #[error("transfer timed out")]
    Timeout,
}

/// A register table that cannot be applied safely.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// No `END` sentinel was found before the table ran out.
    #[error("table `{table}` has no END sentinel")]
    Unterminated {
        /// Table name.
        table: &'static str,
    },
    /// No `END` sentinel was found within the bounded scan length.
    #[error("table `{table}` exceeds {limit} entries without END")]
    TooLong {
        /// Table name.
        table: &'static str,
        /// Scan bound.
        limit: usize,
    },
    /// Entries follow the `END` sentinel.
    #[error("table `{table}` has {count} unreachable entries after END")]
    TrailingEntries {
        /// Table name.
        table: &'static str,
        /// Number of entries after `END`.
        count: usize,
    },
}

/// Failure while applying a register table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// The table failed validation; nothing was written.
    #[error(transparent)]
    Malformed(#[from] TableError),
    /// A register write failed; application stopped at `address`.
    #[error("table `{table}`: write to {address:#06x} failed: {source}")]
    Transport {
        /// Table name.
        table: &'static str,
        /// Offending register address.
        address: u16,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

/// Board resources or static configuration are missing or inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The catalog size disagrees with the externally asserted mode count.
    #[error("catalog declares {actual} modes but {expected} are expected")]
    ModeCountMismatch {
        /// Count asserted by the board configuration.
        expected: usize,
        /// Count present in the catalog.
        actual: usize,
    },
    /// Two descriptors claim the same mode id.
    #[error("mode id {0} is declared twice")]
    DuplicateModeId(u32),
    /// A mode id does not match its catalog position.
    #[error("mode id {id} is declared at position {position}")]
    ModeIdOutOfPlace {
        /// Declared id.
        id: u32,
        /// Catalog position.
        position: usize,
    },
    /// A mode advertises no frame rate.
    #[error("mode id {0} has no frame rates")]
    NoFrameRates(u32),
    /// The host requested a mode the catalog does not contain.
    #[error("mode id {0} is not in the catalog")]
    UnknownMode(u32),
    /// A required table is absent from the catalog.
    #[error("catalog has no `{0}` table")]
    MissingTable(&'static str),
    /// A catalog table is malformed.
    #[error(transparent)]
    Table(#[from] TableError),
    /// The board profile could not be read.
    #[error("failed to read board profile {path}: {source}")]
    ProfileIo {
        /// Profile path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The board profile could not be parsed.
    #[error("invalid board profile: {0}")]
    ProfileParse(#[from] toml::de::Error),
    /// The board profile parsed but holds an invalid value.
    #[error("invalid board profile: {0}")]
    InvalidProfile(String),
}

/// Power sequencing failure.
#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    /// The platform power hook failed.
    #[error("platform {op} hook failed: {source}")]
    Platform {
        /// `"power-on"` or `"power-off"`.
        op: &'static str,
        /// Hook error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The reset line could not be driven.
    #[error("reset line: {0}")]
    ResetLine(String),
    /// The master clock could not be switched.
    #[error("master clock `{name}`: {reason}")]
    Clock {
        /// Clock name from the board profile.
        name: String,
        /// Failure description.
        reason: String,
    },
}

/// Top-level error for driver operations.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// Direct register access failed.
    #[error("register {address:#06x}: {source}")]
    Transport {
        /// Register address.
        address: u16,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
    /// Register table application failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// Configuration defect.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Power sequencing failure.
    #[error(transparent)]
    Power(#[from] PowerError),
    /// Control channel memory could not be obtained or is gone.
    #[error("control channel allocation failed: {0}")]
    Allocation(#[source] std::io::Error),
    /// Register traffic was attempted with the rail off.
    #[error("sensor is powered off")]
    NotPowered,
    /// A previous table failed; the device must be power-cycled first.
    #[error("register state undefined after a failed table; power-cycle required")]
    RegisterStateUndefined,
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, SensorError>;
