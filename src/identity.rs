//! Sensor identity resolution against the supported-sensor list.

use std::fmt;

/// Sensors this driver knows how to identify, by display name.
pub const SUPPORTED_SENSORS: &[&str] = &["picam_v2", "picam_v1", "picam_hq"];

/// Value published on the control channel for an unidentified sensor.
pub const UNIDENTIFIED_SENSOR_ID: i32 = -1;

/// Position of `name` in [`SUPPORTED_SENSORS`].
///
/// Exact, case-sensitive match; the first match wins.
pub fn resolve_sensor_index(name: &str) -> Option<usize> {
    SUPPORTED_SENSORS.iter().position(|candidate| *candidate == name)
}

/// Resolved identity of the attached sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorIdentity {
    /// The configured name is in the supported list.
    Known {
        /// Index into [`SUPPORTED_SENSORS`].
        index: usize,
    },
    /// The configured name is not supported. Not an error.
    Unidentified,
}

impl SensorIdentity {
    /// Resolve a configured sensor name.
    pub fn resolve(name: &str) -> Self {
        match resolve_sensor_index(name) {
            Some(index) => Self::Known { index },
            None => {
                log::warn!("sensor `{name}` is not in the supported list; continuing unidentified");
                Self::Unidentified
            }
        }
    }

    /// Id written to the control channel: the list index, or `-1`.
    pub fn channel_id(self) -> i32 {
        match self {
            Self::Known { index } => i32::try_from(index).unwrap_or(UNIDENTIFIED_SENSOR_ID),
            Self::Unidentified => UNIDENTIFIED_SENSOR_ID,
        }
    }

    /// Display name of a known sensor.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Known { index } => SUPPORTED_SENSORS.get(index).copied(),
            Self::Unidentified => None,
        }
    }
}

impl fmt::Display for SensorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "unidentified"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_sensor() {
        assert_eq!(resolve_sensor_index("picam_v2"), Some(0));
        assert_eq!(
            SensorIdentity::resolve("picam_hq"),
            SensorIdentity::Known { index: 2 }
        );
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert_eq!(resolve_sensor_index("PICAM_V2"), None);
    }

    #[test]
    fn test_unknown_sensor_publishes_minus_one() {
        let identity = SensorIdentity::resolve("unknown_xyz");
        assert_eq!(identity, SensorIdentity::Unidentified);
        assert_eq!(identity.channel_id(), -1);
        assert_eq!(identity.to_string(), "unidentified");
    }

    #[test]
    fn test_known_sensor_channel_id() {
        let identity = SensorIdentity::resolve("picam_v1");
        assert_eq!(identity.channel_id(), 1);
        assert_eq!(identity.name(), Some("picam_v1"));
    }
}
