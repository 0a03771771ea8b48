//! Driver instance for one OVC4 sensor module.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::SensorConfig;
use crate::control::ControlChannel;
use crate::error::{PowerError, Result, SensorError};
use crate::identity::SensorIdentity;
use crate::modes::{ModeCatalog, ModeId};
use crate::power::{PowerRail, PowerSequencer, PowerState};
use crate::sequence;
use crate::table::RegisterTable;
use crate::traits::{MasterClock, PowerHooks, SensorControls, SensorOps, Transport};

/// Board resources handed to probe.
pub struct Board<T, P, D> {
    /// Register transport.
    pub transport: T,
    /// Reset line, if wired.
    pub reset: Option<P>,
    /// Delay provider for WAIT directives and reset holds.
    pub delay: D,
    /// Named master clock, if the board gates one.
    pub clock: Option<(String, Box<dyn MasterClock + Send>)>,
    /// Platform power override.
    pub hooks: Option<Box<dyn PowerHooks + Send>>,
    /// Drive reset low on power-off.
    pub assert_reset_on_power_off: bool,
}

impl<T, P, D> Board<T, P, D> {
    /// Board with only a transport, a reset line and a delay.
    pub const fn new(transport: T, reset: Option<P>, delay: D) -> Self {
        Self {
            transport,
            reset,
            delay,
            clock: None,
            hooks: None,
            assert_reset_on_power_off: true,
        }
    }
}

/// Parts returned by [`Ovc4Sensor::remove`].
#[derive(Debug)]
pub struct Released<T, P, D> {
    /// Register transport.
    pub transport: T,
    /// Reset line, if one was wired.
    pub reset: Option<P>,
    /// Delay provider.
    pub delay: D,
}

/// A probed sensor instance.
///
/// Register traffic requires the rail to be `On`. After a failed table the
/// register state is undefined and every table application is refused until
/// the next successful power-on.
pub struct Ovc4Sensor<T, P, D> {
    transport: T,
    delay: D,
    power: PowerSequencer<P>,
    clock: Option<(String, Box<dyn MasterClock + Send>)>,
    catalog: ModeCatalog,
    channel: ControlChannel,
    identity: SensorIdentity,
    mode: Option<ModeId>,
    streaming: bool,
    registers_defined: bool,
}

impl<T, P, D> std::fmt::Debug for Ovc4Sensor<T, P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ovc4Sensor")
            .field("power", &self.power)
            .field("identity", &self.identity)
            .field("mode", &self.mode)
            .field("streaming", &self.streaming)
            .field("registers_defined", &self.registers_defined)
            .finish_non_exhaustive()
    }
}

impl<T, P, D> Ovc4Sensor<T, P, D>
where
    T: Transport,
    P: OutputPin,
    D: DelayNs,
{
    /// Bring up a sensor instance.
    ///
    /// Resolves and publishes the sensor identity, enables the master clock
    /// and powers the sensor on. On any error no instance is created.
    pub fn probe(
        board: Board<T, P, D>,
        config: &SensorConfig,
        catalog: ModeCatalog,
        mut channel: ControlChannel,
    ) -> Result<Self> {
        log::info!("probing sensor `{}` (instance {})", config.name, config.id);

        let identity = SensorIdentity::resolve(&config.name);
        channel.publish_identity(identity.channel_id())?;

        let mut power = PowerSequencer::new(PowerRail::acquire(board.reset))
            .assert_reset_on_off(board.assert_reset_on_power_off);
        if let Some(hooks) = board.hooks {
            power = power.with_hooks(hooks);
        }

        let mut sensor = Self {
            transport: board.transport,
            delay: board.delay,
            power,
            clock: board.clock,
            catalog,
            channel,
            identity,
            mode: None,
            streaming: false,
            registers_defined: false,
        };

        sensor.board_setup()?;
        log::info!("sensor `{}` probed ({})", config.name, sensor.identity);
        Ok(sensor)
    }

    fn board_setup(&mut self) -> Result<()> {
        if let Some((name, clock)) = self.clock.as_mut() {
            clock.enable().map_err(|err| {
                log::error!("error turning on mclk `{name}`: {err}");
                PowerError::Clock {
                    name: name.clone(),
                    reason: err.to_string(),
                }
            })?;
        }

        if let Err(err) = SensorOps::power_on(self) {
            log::error!("error during power on sensor: {err}");
            self.disable_clock();
            return Err(err);
        }
        Ok(())
    }

    fn disable_clock(&mut self) {
        if let Some((name, clock)) = self.clock.as_mut() {
            if let Err(err) = clock.disable() {
                log::warn!("failed to disable mclk `{name}`: {err}");
            }
        }
    }

    /// Tear the instance down and return its board resources.
    ///
    /// Power-off and clock failures are logged; teardown always completes.
    pub fn remove(mut self) -> Released<T, P, D> {
        if let Err(err) = self.power.power_off(&mut self.delay) {
            log::error!("power off during remove failed: {err}");
        }
        self.disable_clock();

        let Self {
            transport,
            delay,
            power,
            ..
        } = self;
        Released {
            transport,
            reset: power.release(),
            delay,
        }
    }

    /// Resolved sensor identity.
    pub const fn identity(&self) -> SensorIdentity {
        self.identity
    }

    /// Current rail state.
    pub const fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// Last mode programmed successfully.
    pub const fn mode(&self) -> Option<ModeId> {
        self.mode
    }

    /// Whether pixel output is running.
    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// The mode catalog.
    pub const fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }

    /// The control channel written by the per-frame callbacks.
    pub const fn channel(&self) -> &ControlChannel {
        &self.channel
    }

    /// The register transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.power.state() != PowerState::On {
            return Err(SensorError::NotPowered);
        }
        if !self.registers_defined {
            return Err(SensorError::RegisterStateUndefined);
        }
        Ok(())
    }

    fn apply(&mut self, table: &RegisterTable) -> Result<()> {
        sequence::apply(table, &mut self.transport, &mut self.delay).map_err(|err| {
            self.registers_defined = false;
            self.streaming = false;
            err.into()
        })
    }
}

impl<T, P, D> SensorOps for Ovc4Sensor<T, P, D>
where
    T: Transport,
    P: OutputPin,
    D: DelayNs,
{
    fn power_on(&mut self) -> Result<()> {
        self.power.power_on(&mut self.delay)?;
        self.registers_defined = true;
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        self.power.power_off(&mut self.delay)?;
        self.streaming = false;
        self.mode = None;
        Ok(())
    }

    fn set_mode(&mut self, mode: ModeId) -> Result<()> {
        self.ensure_ready()?;
        let table = *self.catalog.resolve(mode)?;
        let common = *self.catalog.common();
        log::debug!("set mode {mode} (`{}`)", table.name());

        self.mode = None;
        self.apply(&common)?;
        self.apply(&table)?;
        self.mode = Some(mode);
        Ok(())
    }

    fn start_streaming(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let table = *self.catalog.start_stream();
        self.apply(&table)?;
        self.streaming = true;
        Ok(())
    }

    fn stop_streaming(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let table = *self.catalog.stop_stream();
        self.apply(&table)?;
        self.streaming = false;
        Ok(())
    }

    fn read_reg(&mut self, address: u16) -> Result<u8> {
        if self.power.state() != PowerState::On {
            return Err(SensorError::NotPowered);
        }
        self.transport
            .read(address)
            .map_err(|source| SensorError::Transport { address, source })
    }

    fn write_reg(&mut self, address: u16, value: u8) -> Result<()> {
        if self.power.state() != PowerState::On {
            return Err(SensorError::NotPowered);
        }
        self.transport
            .write(address, value)
            .map_err(|source| SensorError::Transport { address, source })
    }
}

impl<T, P, D> SensorControls for Ovc4Sensor<T, P, D>
where
    T: Transport,
    P: OutputPin,
    D: DelayNs,
{
    fn set_gain(&mut self, value: i64) -> Result<()> {
        log::trace!("set gain {value}");
        self.channel.set_gain(value)
    }

    fn set_exposure(&mut self, value: i64) -> Result<()> {
        log::trace!("set exposure {value}");
        self.channel.set_exposure(value)
    }

    fn set_frame_rate(&mut self, value: i64) -> Result<()> {
        log::debug!("frame rate request {value} ignored");
        Ok(())
    }

    fn set_group_hold(&mut self, enable: bool) -> Result<()> {
        log::debug!("group hold request {enable} ignored");
        Ok(())
    }
}
