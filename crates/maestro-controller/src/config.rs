use maestro_frame::Addressing;
use maestro_transport::SerialConfig;
use serde::{Deserialize, Serialize};

/// Construction-time settings for a controller connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Frame addressing mode, fixed for the lifetime of the controller.
    pub addressing: Addressing,
    /// Serial line parameters used by [`connect`](crate::connect).
    pub serial: SerialConfig,
}

impl ControllerConfig {
    /// Pololu addressing for the given device number.
    pub fn with_device(device: u8) -> Self {
        Self {
            addressing: Addressing::Pololu { device },
            ..Self::default()
        }
    }

    /// Compact addressing, for a dedicated point-to-point link.
    pub fn compact() -> Self {
        Self {
            addressing: Addressing::Compact,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_is_device_12_addressed() {
        let config = ControllerConfig::default();
        assert_eq!(config.addressing, Addressing::Pololu { device: 12 });
        assert_eq!(config.serial, SerialConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"addressing":{"mode":"pololu","device":3}}"#).unwrap();
        assert_eq!(config.addressing.device(), Some(3));
        assert_eq!(config.serial.read_timeout, Duration::from_millis(500));
    }

    #[test]
    fn compact_constructor() {
        assert_eq!(ControllerConfig::compact().addressing, Addressing::Compact);
    }
}
