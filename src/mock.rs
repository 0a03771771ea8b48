//! Mock collaborators for testing without hardware.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::error::TransportError;
use crate::traits::{HookError, MasterClock, PowerHooks, Transport};

/// A register write observed by [`MockTransport`].
#[derive(Debug, Clone, Copy)]
pub struct RecordedWrite {
    /// Register address.
    pub address: u16,
    /// Value written.
    pub value: u8,
    /// When the write was issued.
    pub at: Instant,
}

/// Transport that records writes and serves reads from a register map.
#[derive(Debug, Default)]
pub struct MockTransport {
    writes: Vec<RecordedWrite>,
    registers: HashMap<u16, u8>,
    fail_at: Option<(u16, TransportError)>,
    attempts: usize,
}

impl MockTransport {
    /// Create an empty mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every access to `address` with `error`.
    #[must_use]
    pub fn fail_at(mut self, address: u16, error: TransportError) -> Self {
        self.fail_at = Some((address, error));
        self
    }

    /// Preload a register value for reads.
    #[must_use]
    pub fn with_register(mut self, address: u16, value: u8) -> Self {
        self.registers.insert(address, value);
        self
    }

    /// Successful writes as `(address, value)` pairs in issue order.
    pub fn written(&self) -> Vec<(u16, u8)> {
        self.writes.iter().map(|w| (w.address, w.value)).collect()
    }

    /// Successful writes with timestamps.
    pub fn records(&self) -> &[RecordedWrite] {
        &self.writes
    }

    /// Number of write calls, failed ones included.
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    fn check(&self, address: u16) -> Result<(), TransportError> {
        match &self.fail_at {
            Some((failing, error)) if *failing == address => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

impl Transport for MockTransport {
    fn write(&mut self, address: u16, value: u8) -> Result<(), TransportError> {
        self.attempts += 1;
        self.check(address)?;
        self.registers.insert(address, value);
        self.writes.push(RecordedWrite {
            address,
            value,
            at: Instant::now(),
        });
        Ok(())
    }

    fn read(&mut self, address: u16) -> Result<u8, TransportError> {
        self.check(address)?;
        Ok(self.registers.get(&address).copied().unwrap_or_default())
    }
}

/// Delay that records requested durations without sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    calls: Vec<Duration>,
}

impl MockDelay {
    /// Create an empty mock delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested delay in order.
    pub fn calls(&self) -> &[Duration] {
        &self.calls
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.calls.iter().sum()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.calls.push(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(Duration::from_millis(u64::from(ms)));
    }
}

/// Reset line that records every level it is driven to.
#[derive(Debug, Default)]
pub struct MockResetPin {
    levels: Vec<PinState>,
}

impl MockResetPin {
    /// Create a mock reset line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels driven so far.
    pub fn levels(&self) -> &[PinState] {
        &self.levels
    }

    /// Number of complete low-then-high reset pulses.
    pub fn pulses(&self) -> usize {
        self.levels
            .windows(2)
            .filter(|pair| matches!(pair, [PinState::Low, PinState::High]))
            .count()
    }
}

impl ErrorType for MockResetPin {
    type Error = Infallible;
}

impl OutputPin for MockResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(PinState::High);
        Ok(())
    }
}

/// Platform hooks with scripted outcomes.
#[derive(Debug, Default)]
pub struct MockHooks {
    /// Number of `power_on` calls.
    pub on_calls: usize,
    /// Number of `power_off` calls.
    pub off_calls: usize,
    /// Fail `power_on` when set.
    pub fail_on: bool,
    /// Fail `power_off` when set.
    pub fail_off: bool,
}

impl PowerHooks for MockHooks {
    fn power_on(&mut self) -> Result<(), HookError> {
        self.on_calls += 1;
        if self.fail_on {
            return Err("regulator enable failed".into());
        }
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), HookError> {
        self.off_calls += 1;
        if self.fail_off {
            return Err("regulator disable failed".into());
        }
        Ok(())
    }
}

/// Master clock with scripted outcome.
///
/// The running flag is shared so it stays observable after the clock has
/// been boxed into a board and dropped with it.
#[derive(Debug, Default)]
pub struct MockClock {
    /// Whether the clock is running.
    pub running: Arc<AtomicBool>,
    /// Fail `enable` when set.
    pub fail_enable: bool,
}

impl MockClock {
    /// Handle on the running flag.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

impl MasterClock for MockClock {
    fn enable(&mut self) -> Result<(), HookError> {
        if self.fail_enable {
            return Err("clock parent not found".into());
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HookError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_round_trip() {
        let mut transport = MockTransport::new().with_register(0x0000, 0x02);
        assert_eq!(transport.read(0x0000), Ok(0x02));

        transport.write(0x0100, 0x01).expect("write should succeed");
        assert_eq!(transport.read(0x0100), Ok(0x01));
        assert_eq!(transport.written(), vec![(0x0100, 0x01)]);
    }

    #[test]
    fn test_mock_transport_failure() {
        let mut transport = MockTransport::new().fail_at(0x0103, TransportError::Timeout);
        assert_eq!(transport.write(0x0103, 0x01), Err(TransportError::Timeout));
        assert_eq!(transport.attempts(), 1);
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_mock_reset_pin_counts_pulses() {
        let mut pin = MockResetPin::new();
        pin.set_low().expect("infallible");
        pin.set_high().expect("infallible");
        pin.set_low().expect("infallible");
        assert_eq!(pin.pulses(), 1);
    }

    #[test]
    fn test_mock_clock_flag_outlives_clock() {
        let mut clock = MockClock::default();
        let running = clock.running_flag();

        clock.enable().expect("enable should succeed");
        drop(clock);
        assert!(running.load(Ordering::SeqCst));
    }
}
