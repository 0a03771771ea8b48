//! Board profile: the already-parsed board configuration the driver needs.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigurationError;

/// Sensor name and instance id handed to probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Display name, resolved against the supported-sensor list.
    pub name: String,
    /// Numeric instance id; names the control region.
    pub id: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            name: "null".to_owned(),
            id: 0,
        }
    }
}

/// Board wiring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Master clock name.
    pub mclk: Option<String>,
    /// Reset GPIO number.
    pub reset_gpio: Option<u32>,
    /// Drive reset low on power-off.
    pub assert_reset_on_power_off: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            mclk: None,
            reset_gpio: None,
            assert_reset_on_power_off: true,
        }
    }
}

/// Mode count asserted by the board's device tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModesConfig {
    /// Number of modes the host believes exist.
    pub expected_count: usize,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self { expected_count: 1 }
    }
}

/// Where named control regions are created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Directory for `ovc4cam_ctrl_<id>` regions.
    pub dir: PathBuf,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/dev/shm"),
        }
    }
}

/// Complete board profile.
///
/// ```toml
/// [sensor]
/// name = "picam_v2"
/// id = 0
///
/// [board]
/// mclk = "extperiph1"
/// reset_gpio = 151
/// assert_reset_on_power_off = true
///
/// [modes]
/// expected_count = 1
///
/// [control]
/// dir = "/dev/shm"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardProfile {
    /// Sensor identity inputs.
    pub sensor: SensorConfig,
    /// Board wiring.
    pub board: BoardConfig,
    /// Mode catalog expectations.
    pub modes: ModesConfig,
    /// Control channel placement.
    pub control: ControlConfig,
}

impl BoardProfile {
    /// Parse and validate a profile.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        let profile: Self = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Read, parse and validate a profile file.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::ProfileIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values no board can have.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.modes.expected_count == 0 {
            return Err(ConfigurationError::InvalidProfile(
                "modes.expected_count must be at least 1".to_owned(),
            ));
        }
        if self.control.dir.as_os_str().is_empty() {
            return Err(ConfigurationError::InvalidProfile(
                "control.dir must not be empty".to_owned(),
            ));
        }
        if self.board.mclk.is_none() {
            log::warn!("mclk not in board profile");
        }
        if self.board.reset_gpio.is_none() {
            log::warn!("reset_gpio not in board profile, power-on will not pulse reset");
        }
        Ok(())
    }

    /// The sensor inputs, handed straight to probe.
    pub fn sensor_config(&self) -> SensorConfig {
        self.sensor.clone()
    }
}
