//! ovc4cam: sensor control driver for the OVC4 camera module.
//!
//! The crate covers the parts of the driver with real invariants: register
//! tables and the sequence engine that applies them, the power/reset
//! sequencer, the mode catalog, and the shared-memory control channel read
//! by userspace. Bus access, reset lines and delays come in through
//! `embedded-hal` traits so the same code runs against hardware or mocks.

pub mod config;
pub mod control;
pub mod device;
pub mod error;
#[cfg(feature = "v4l")]
pub mod host;
pub mod identity;
pub mod imx219;
pub mod modes;
pub mod power;
pub mod sequence;
pub mod table;
pub mod traits;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub mod mock;

pub use config::{BoardProfile, SensorConfig};
pub use control::{ControlChannel, ControlReader, ControlRecord};
pub use device::{Board, Ovc4Sensor, Released};
pub use error::{
    ConfigurationError, PowerError, Result, SensorError, SequenceError, TableError, TransportError,
};
pub use identity::{resolve_sensor_index, SensorIdentity};
pub use modes::{ModeCatalog, ModeDescriptor, ModeId};
pub use power::{NoResetLine, PowerRail, PowerSequencer, PowerState};
pub use table::{RegisterEntry, RegisterTable};
pub use traits::{MasterClock, PowerHooks, SensorControls, SensorOps, Transport};
pub use transport::{DryRunClock, DryRunResetLine, DryRunTransport, I2cTransport, StdDelay};
