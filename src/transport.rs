//! Transport and delay implementations, plus logging stand-ins for the
//! board resources of a dry run.

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};
use embedded_hal::i2c::{ErrorKind, I2c};

use crate::error::TransportError;
use crate::traits::{HookError, MasterClock, Transport};

/// Register access over an `embedded-hal` I2C bus.
///
/// Registers use a 16-bit big-endian address followed by an 8-bit value.
#[derive(Debug)]
pub struct I2cTransport<I> {
    bus: I,
    address: u8,
}

impl<I: I2c> I2cTransport<I> {
    /// Talk to the device at 7-bit bus `address`.
    pub const fn new(bus: I, address: u8) -> Self {
        Self { bus, address }
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.bus
    }
}

fn map_i2c_error<E: embedded_hal::i2c::Error>(err: &E) -> TransportError {
    match err.kind() {
        ErrorKind::NoAcknowledge(_) => TransportError::Nack,
        kind => TransportError::Bus(kind.to_string()),
    }
}

impl<I: I2c> Transport for I2cTransport<I> {
    fn write(&mut self, address: u16, value: u8) -> Result<(), TransportError> {
        let [hi, lo] = address.to_be_bytes();
        self.bus
            .write(self.address, &[hi, lo, value])
            .map_err(|err| map_i2c_error(&err))
    }

    fn read(&mut self, address: u16) -> Result<u8, TransportError> {
        let mut value = [0u8; 1];
        self.bus
            .write_read(self.address, &address.to_be_bytes(), &mut value)
            .map_err(|err| map_i2c_error(&err))?;
        let [value] = value;
        Ok(value)
    }
}

/// Transport that talks to no hardware: it logs every write and keeps a
/// shadow register map for reads.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    writes: Vec<(u16, u8)>,
    shadow: HashMap<u16, u8>,
}

impl DryRunTransport {
    /// Create an empty dry-run transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write in issue order.
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }
}

impl Transport for DryRunTransport {
    fn write(&mut self, address: u16, value: u8) -> Result<(), TransportError> {
        log::trace!("write {address:#06x} = {value:#04x}");
        self.writes.push((address, value));
        self.shadow.insert(address, value);
        Ok(())
    }

    fn read(&mut self, address: u16) -> Result<u8, TransportError> {
        Ok(self.shadow.get(&address).copied().unwrap_or_default())
    }
}

/// Reset line that logs the levels it would drive on a GPIO.
#[derive(Debug, Clone)]
pub struct DryRunResetLine {
    gpio: u32,
    levels: Vec<PinState>,
}

impl DryRunResetLine {
    /// Stand-in for reset GPIO `gpio`.
    pub const fn new(gpio: u32) -> Self {
        Self {
            gpio,
            levels: Vec::new(),
        }
    }

    /// GPIO number.
    pub const fn gpio(&self) -> u32 {
        self.gpio
    }

    /// Every level driven, oldest first.
    pub fn levels(&self) -> &[PinState] {
        &self.levels
    }

    fn drive(&mut self, level: PinState) {
        log::trace!("gpio {} -> {level:?}", self.gpio);
        self.levels.push(level);
    }
}

impl ErrorType for DryRunResetLine {
    type Error = Infallible;
}

impl OutputPin for DryRunResetLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::High);
        Ok(())
    }
}

/// Master clock that only logs gate changes.
#[derive(Debug, Clone)]
pub struct DryRunClock {
    name: String,
    enabled: bool,
}

impl DryRunClock {
    /// Stand-in for the clock called `name`.
    pub const fn new(name: String) -> Self {
        Self {
            name,
            enabled: false,
        }
    }

    /// Whether the clock is currently gated on.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl MasterClock for DryRunClock {
    fn enable(&mut self) -> Result<(), HookError> {
        log::info!("mclk `{}` enabled", self.name);
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HookError> {
        log::info!("mclk `{}` disabled", self.name);
        self.enabled = false;
        Ok(())
    }
}

/// Blocking delay on the calling thread.
///
/// Sleeps are coarse: the OS may oversleep, never undersleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
