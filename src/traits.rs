//! Collaborator seams: register transport, platform hooks and the host
//! framework's lifecycle and per-frame control callbacks.

use crate::error::{Result, TransportError};
use crate::modes::ModeId;

/// Single-register access keyed by a 16-bit address with 8-bit values.
///
/// Bus selection, addressing mode and caching belong to the implementor.
pub trait Transport {
    /// Write `value` to the register at `address`.
    fn write(&mut self, address: u16, value: u8) -> std::result::Result<(), TransportError>;

    /// Read the register at `address`.
    fn read(&mut self, address: u16) -> std::result::Result<u8, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, address: u16, value: u8) -> std::result::Result<(), TransportError> {
        (**self).write(address, value)
    }

    fn read(&mut self, address: u16) -> std::result::Result<u8, TransportError> {
        (**self).read(address)
    }
}

/// Error returned by platform hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Board-specific power sequence overriding the built-in reset pulse.
pub trait PowerHooks {
    /// Bring the sensor supplies up.
    fn power_on(&mut self) -> std::result::Result<(), HookError>;

    /// Take the sensor supplies down.
    fn power_off(&mut self) -> std::result::Result<(), HookError>;
}

/// The sensor's master clock (`mclk`).
pub trait MasterClock {
    /// Start the clock.
    fn enable(&mut self) -> std::result::Result<(), HookError>;

    /// Stop the clock.
    fn disable(&mut self) -> std::result::Result<(), HookError>;
}

/// Lifecycle callbacks invoked by the host camera framework.
///
/// The host serializes these calls per device instance.
pub trait SensorOps {
    /// Run the power-on sequence.
    fn power_on(&mut self) -> Result<()>;

    /// Run the power-off sequence.
    fn power_off(&mut self) -> Result<()>;

    /// Program the device for `mode`.
    fn set_mode(&mut self, mode: ModeId) -> Result<()>;

    /// Start pixel output.
    fn start_streaming(&mut self) -> Result<()>;

    /// Stop pixel output.
    fn stop_streaming(&mut self) -> Result<()>;

    /// Read a single device register.
    fn read_reg(&mut self, address: u16) -> Result<u8>;

    /// Write a single device register.
    fn write_reg(&mut self, address: u16, value: u8) -> Result<()>;
}

/// Per-frame control callbacks invoked by the host camera framework.
pub trait SensorControls {
    /// Publish a new gain value.
    fn set_gain(&mut self, value: i64) -> Result<()>;

    /// Publish a new exposure value.
    fn set_exposure(&mut self, value: i64) -> Result<()>;

    /// Frame-rate request from the host.
    fn set_frame_rate(&mut self, value: i64) -> Result<()>;

    /// Group-hold request from the host.
    fn set_group_hold(&mut self, enable: bool) -> Result<()>;
}
