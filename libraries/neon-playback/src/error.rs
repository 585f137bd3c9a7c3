//! Error types for playback control

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Playback errors
///
/// Serializable so they can travel to the UI inside session events.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PlaybackError {
    /// Playlist index does not refer to a track
    #[error("Index out of range: {0}")]
    IndexOutOfRange(usize),

    /// Volume outside 0-100
    #[error("Volume out of range: {0} (expected 0-100)")]
    VolumeOutOfRange(i32),

    /// Playback rate outside the supported multiplier range
    #[error("Playback rate out of range: {0}x")]
    PlaybackRateOutOfRange(f32),

    /// Seek target is past the end of the loaded media
    #[error("Invalid seek position: {0} ms")]
    InvalidSeekPosition(u64),

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Playlist has no tracks
    #[error("Playlist is empty")]
    PlaylistEmpty,

    /// Backend rejected a source; non-fatal, the entry is skipped
    #[error("Invalid media: {}", .0.display())]
    InvalidMedia(PathBuf),

    /// Decode or IO failure reported by the media backend
    #[error("Backend error {code}: {message}")]
    Backend { code: i32, message: String },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for PlaybackError {
    fn from(err: config::ConfigError) -> Self {
        PlaybackError::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_keeps_code_in_message() {
        let err = PlaybackError::Backend {
            code: 3,
            message: "Could not decode".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error 3: Could not decode");
    }

    #[test]
    fn invalid_media_names_the_source() {
        let err = PlaybackError::InvalidMedia(PathBuf::from("/music/broken.mp3"));
        assert_eq!(err.to_string(), "Invalid media: /music/broken.mp3");
    }
}
