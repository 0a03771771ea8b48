//! Power sequencer: reset line and supply sequencing for the sensor.

use std::convert::Infallible;
use std::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::error::PowerError;
use crate::traits::PowerHooks;

/// Minimum hold after each reset-line edge on power-on, in microseconds.
pub const RESET_HOLD_US: u32 = 30;
/// Minimum settle time before the rail is released on power-off, in microseconds.
pub const POWER_OFF_SETTLE_US: u32 = 1;

/// Rail state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    /// Supplies down or sensor held in reset.
    #[default]
    Off,
    /// Sensor out of reset and accepting register traffic.
    On,
}

/// Placeholder reset line for boards without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResetLine;

impl ErrorType for NoResetLine {
    type Error = Infallible;
}

impl OutputPin for NoResetLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The sensor's reset line and its current power state.
#[derive(Debug)]
pub struct PowerRail<P> {
    reset: Option<P>,
    state: PowerState,
}

impl<P> PowerRail<P> {
    /// Take ownership of the board's reset line. The rail starts `Off`.
    pub const fn acquire(reset: Option<P>) -> Self {
        Self {
            reset,
            state: PowerState::Off,
        }
    }

    /// Current state.
    pub const fn state(&self) -> PowerState {
        self.state
    }

    /// Whether a reset line is wired.
    pub const fn has_reset_line(&self) -> bool {
        self.reset.is_some()
    }
}

/// Drives a [`PowerRail`] through `Off` / `On`.
///
/// A configured platform hook replaces the built-in reset pulse entirely.
/// The sequencer holds no lock; the host framework serializes calls for a
/// device instance.
pub struct PowerSequencer<P> {
    rail: PowerRail<P>,
    hooks: Option<Box<dyn PowerHooks + Send>>,
    assert_reset_on_off: bool,
}

impl<P> Debug for PowerSequencer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerSequencer")
            .field("state", &self.rail.state)
            .field("reset_line", &self.rail.has_reset_line())
            .field("hooks", &self.hooks.is_some())
            .field("assert_reset_on_off", &self.assert_reset_on_off)
            .finish()
    }
}

impl<P: OutputPin> PowerSequencer<P> {
    /// Create a sequencer for `rail`.
    pub fn new(rail: PowerRail<P>) -> Self {
        Self {
            rail,
            hooks: None,
            assert_reset_on_off: true,
        }
    }

    /// Delegate power transitions to board-specific hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Box<dyn PowerHooks + Send>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Whether power-off drives the reset line low.
    #[must_use]
    pub fn assert_reset_on_off(mut self, assert: bool) -> Self {
        self.assert_reset_on_off = assert;
        self
    }

    /// Current rail state.
    pub const fn state(&self) -> PowerState {
        self.rail.state
    }

    /// Bring the sensor out of reset.
    ///
    /// Re-running in state `On` repeats the sequence (one reset pulse per
    /// call) and leaves the state `On`.
    pub fn power_on<D: DelayNs + ?Sized>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        log::debug!("power on");

        if let Some(hooks) = self.hooks.as_mut() {
            return match hooks.power_on() {
                Ok(()) => {
                    self.rail.state = PowerState::On;
                    Ok(())
                }
                Err(source) => {
                    log::error!("platform power-on failed: {source}");
                    Err(PowerError::Platform {
                        op: "power-on",
                        source,
                    })
                }
            };
        }

        match self.rail.reset.as_mut() {
            Some(reset) => {
                // Sensor leaves reset on the rising edge.
                reset.set_low().map_err(reset_error)?;
                delay.delay_us(RESET_HOLD_US);
                reset.set_high().map_err(reset_error)?;
                delay.delay_us(RESET_HOLD_US);
            }
            None => log::warn!("no reset line or power hook configured; power-on is a no-op"),
        }

        self.rail.state = PowerState::On;
        Ok(())
    }

    /// Put the sensor back into its powered-down state.
    pub fn power_off<D: DelayNs + ?Sized>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        log::debug!("power off");

        if let Some(hooks) = self.hooks.as_mut() {
            return match hooks.power_off() {
                Ok(()) => {
                    self.rail.state = PowerState::Off;
                    Ok(())
                }
                Err(source) => {
                    log::error!("platform power-off failed: {source}");
                    Err(PowerError::Platform {
                        op: "power-off",
                        source,
                    })
                }
            };
        }

        delay.delay_us(POWER_OFF_SETTLE_US);
        if self.assert_reset_on_off {
            if let Some(reset) = self.rail.reset.as_mut() {
                reset.set_low().map_err(reset_error)?;
            }
        }

        self.rail.state = PowerState::Off;
        Ok(())
    }

    /// Give the reset line back to the board.
    pub fn release(self) -> Option<P> {
        self.rail.reset
    }

    /// The reset line, if wired.
    pub const fn reset_line(&self) -> Option<&P> {
        self.rail.reset.as_ref()
    }
}

fn reset_error<E: Debug>(err: E) -> PowerError {
    PowerError::ResetLine(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockHooks, MockResetPin};
    use embedded_hal::digital::PinState;
    use std::time::Duration;

    fn sequencer() -> PowerSequencer<MockResetPin> {
        PowerSequencer::new(PowerRail::acquire(Some(MockResetPin::new())))
    }

    #[test]
    fn test_rail_starts_off() {
        let rail: PowerRail<MockResetPin> = PowerRail::acquire(None);
        assert_eq!(rail.state(), PowerState::Off);
        assert!(!rail.has_reset_line());
    }

    #[test]
    fn test_power_on_pulses_reset_once() {
        let mut power = sequencer();
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("power_on should succeed");

        assert_eq!(power.state(), PowerState::On);
        let pin = power.reset_line().expect("reset line present");
        assert_eq!(pin.levels(), &[PinState::Low, PinState::High]);
        assert_eq!(
            delay.calls(),
            &[Duration::from_micros(30), Duration::from_micros(30)]
        );
    }

    #[test]
    fn test_power_on_twice_stays_on() {
        let mut power = sequencer();
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("first power_on should succeed");
        power.power_on(&mut delay).expect("second power_on should succeed");

        assert_eq!(power.state(), PowerState::On);
        assert_eq!(power.reset_line().expect("reset line present").pulses(), 2);
    }

    #[test]
    fn test_power_cycle_round_trip() {
        let mut power = sequencer();
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("power_on should succeed");
        power.power_off(&mut delay).expect("power_off should succeed");
        assert_eq!(power.state(), PowerState::Off);
        assert_eq!(
            power.reset_line().expect("reset line present").levels().last(),
            Some(&PinState::Low)
        );

        power.power_on(&mut delay).expect("power_on should succeed");
        assert_eq!(power.state(), PowerState::On);
    }

    #[test]
    fn test_power_off_without_reset_assert() {
        let mut power = sequencer().assert_reset_on_off(false);
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("power_on should succeed");
        power.power_off(&mut delay).expect("power_off should succeed");

        assert_eq!(power.state(), PowerState::Off);
        assert_eq!(
            power.reset_line().expect("reset line present").levels(),
            &[PinState::Low, PinState::High]
        );
        assert_eq!(delay.calls().last(), Some(&Duration::from_micros(1)));
    }

    #[test]
    fn test_power_on_without_reset_line_is_noop() {
        let mut power = PowerSequencer::new(PowerRail::<NoResetLine>::acquire(None));
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("power_on should succeed");

        assert_eq!(power.state(), PowerState::On);
        assert!(delay.calls().is_empty());
    }

    #[test]
    fn test_hooks_replace_reset_pulse() {
        let mut power = sequencer().with_hooks(Box::new(MockHooks::default()));
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("power_on should succeed");
        assert_eq!(power.state(), PowerState::On);
        assert!(power.reset_line().expect("reset line present").levels().is_empty());

        power.power_off(&mut delay).expect("power_off should succeed");
        assert_eq!(power.state(), PowerState::Off);
        assert!(delay.calls().is_empty());
    }

    #[test]
    fn test_hook_failure_is_fatal_and_keeps_state() {
        let hooks = MockHooks {
            fail_on: true,
            ..MockHooks::default()
        };
        let mut power = sequencer().with_hooks(Box::new(hooks));
        let mut delay = MockDelay::new();

        let result = power.power_on(&mut delay);

        assert!(matches!(
            result,
            Err(PowerError::Platform { op: "power-on", .. })
        ));
        assert_eq!(power.state(), PowerState::Off);
    }

    #[test]
    fn test_power_off_hook_failure_keeps_on() {
        let hooks = MockHooks {
            fail_off: true,
            ..MockHooks::default()
        };
        let mut power = sequencer().with_hooks(Box::new(hooks));
        let mut delay = MockDelay::new();

        power.power_on(&mut delay).expect("power_on should succeed");
        assert!(power.power_off(&mut delay).is_err());
        assert_eq!(power.state(), PowerState::On);
    }
}
