//! Session configuration
//!
//! Layered from an optional file and `NEON_*` environment variables.

use crate::error::{PlaybackError, Result};
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Slowest supported playback rate
pub const MIN_PLAYBACK_RATE: f32 = 0.25;

/// Fastest supported playback rate
pub const MAX_PLAYBACK_RATE: f32 = 2.0;

/// Configuration for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0-100, default: 70)
    pub volume: u8,

    /// Start muted (default: false)
    pub muted: bool,

    /// Initial shuffle state (default: off)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Initial playback rate multiplier (default: 1.0)
    pub playback_rate: f32,

    /// Position poll interval for the UI tick (default: 1000 ms)
    pub tick_interval_ms: u64,

    /// Fixed seed for shuffle and random picks (default: none, use entropy)
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 70,
            muted: false,
            shuffle: false,
            repeat: RepeatMode::Off,
            playback_rate: 1.0,
            tick_interval_ms: 1000,
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables use the `NEON_` prefix, e.g. `NEON_VOLUME=40`
    /// or `NEON_REPEAT=all`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading playback config file");
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(config::Environment::with_prefix("NEON").try_parsing(true));

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.volume > 100 {
            return Err(PlaybackError::Config(format!(
                "volume must be 0-100, got {}",
                self.volume
            )));
        }

        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&self.playback_rate) {
            return Err(PlaybackError::Config(format!(
                "playback_rate must be {MIN_PLAYBACK_RATE}-{MAX_PLAYBACK_RATE}, got {}",
                self.playback_rate
            )));
        }

        if self.tick_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "tick_interval_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.volume, 70);
        assert!(!config.muted);
        assert!(!config.shuffle);
        assert_eq!(config.repeat, RepeatMode::Off);
        assert_eq!(config.playback_rate, 1.0);
        assert_eq!(config.tick_interval_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neon.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "volume = 35").unwrap();
        writeln!(file, "repeat = \"all\"").unwrap();
        writeln!(file, "shuffle_seed = 9").unwrap();
        drop(file);

        let config = PlaybackConfig::load(Some(&path)).unwrap();
        assert_eq!(config.volume, 35);
        assert_eq!(config.repeat, RepeatMode::All);
        assert_eq!(config.shuffle_seed, Some(9));
        // Unset fields keep their defaults
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            PlaybackConfig::load(Some(&path)),
            Err(PlaybackError::Config(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = PlaybackConfig {
            volume: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            playback_rate: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_from_json() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"muted": true, "repeat": "one"}"#).unwrap();
        assert!(config.muted);
        assert_eq!(config.repeat, RepeatMode::One);
        assert_eq!(config.volume, 70);
    }
}
