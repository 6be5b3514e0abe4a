//! Soft-limit tables persisted as JSON.
//!
//! ```json
//! { "channels": [ { "channel": 0, "min": 3000, "max": 9000 } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, Result};

/// Soft limits for one channel, in quarter-microseconds. Zero = unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub channel: u8,
    #[serde(default)]
    pub min: u16,
    #[serde(default)]
    pub max: u16,
}

/// Soft limits for any subset of channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLimits {
    pub channels: Vec<ChannelRange>,
}

impl ChannelLimits {
    /// Parse a limits table from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a limits table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ControllerError::LimitsFile {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&contents)
    }

    /// Write the table as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ControllerError::LimitsFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The range configured for `channel`, if any. Later entries win.
    pub fn get(&self, channel: u8) -> Option<&ChannelRange> {
        self.channels.iter().rev().find(|range| range.channel == channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_missing_bounds() {
        let limits = ChannelLimits::from_json(
            r#"{"channels":[{"channel":0,"min":3000,"max":9000},{"channel":5,"max":8000}]}"#,
        )
        .unwrap();
        assert_eq!(limits.channels.len(), 2);
        assert_eq!(
            limits.get(5),
            Some(&ChannelRange {
                channel: 5,
                min: 0,
                max: 8000
            })
        );
        assert!(limits.get(1).is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            ChannelLimits::from_json("{\"channels\": 3}"),
            Err(ControllerError::Json(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("maestro-limits-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("limits.json");

        let limits = ChannelLimits {
            channels: vec![ChannelRange {
                channel: 2,
                min: 4000,
                max: 8000,
            }],
        };
        limits.save(&path).unwrap();
        assert_eq!(ChannelLimits::load(&path).unwrap(), limits);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ChannelLimits::load(Path::new("/nonexistent/maestro/limits.json")).unwrap_err();
        assert!(matches!(err, ControllerError::LimitsFile { .. }));
    }
}
