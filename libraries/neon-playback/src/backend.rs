//! Media backend contract
//!
//! Decoding and rendering live outside this crate. A platform backend (Qt,
//! GStreamer, mpv, ...) implements [`MediaBackend`] and feeds its
//! notifications back through [`BackendEvent`].

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Transport commands understood by a media backend
///
/// Commands return as soon as the request is issued; the outcome arrives later
/// as a [`BackendEvent`].
pub trait MediaBackend {
    /// Begin loading a source
    ///
    /// The backend later reports `MediaStatus::Loading` followed by
    /// `Loaded` or `Invalid`.
    fn load(&mut self, source: &Path) -> Result<()>;

    /// Start or resume playback of the loaded source
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Stop playback (position returns to start)
    fn stop(&mut self) -> Result<()>;

    /// Seek to position in milliseconds, within `[0, duration]`
    fn seek(&mut self, position_ms: u64) -> Result<()>;

    /// Set output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Set playback speed multiplier
    fn set_playback_rate(&mut self, rate: f32) -> Result<()>;

    /// Current playback position in milliseconds
    fn position(&self) -> u64;
}

/// Backend transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendPlaybackState {
    Playing,
    Paused,
    Stopped,
}

/// Backend media status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaStatus {
    /// Source is being opened
    Loading,

    /// Source opened successfully
    Loaded,

    /// Playback reached the end of the source
    EndOfMedia,

    /// Source could not be opened
    Invalid,
}

/// Notifications emitted by a media backend
///
/// Delivered one at a time to `PlaybackSession::handle_backend_event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendEvent {
    PositionChanged(u64),
    DurationChanged(u64),
    PlaybackStateChanged(BackendPlaybackState),
    MediaStatusChanged(MediaStatus),
    ErrorOccurred { code: i32, message: String },
}

/// Command log backend for unit tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub commands: Vec<String>,
    pub position_ms: u64,
    pub fail_load: bool,
}

#[cfg(test)]
impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MediaBackend for RecordingBackend {
    fn load(&mut self, source: &Path) -> Result<()> {
        if self.fail_load {
            return Err(crate::error::PlaybackError::Backend {
                code: 1,
                message: "Resource error".to_string(),
            });
        }
        self.commands.push(format!("load {}", source.display()));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.commands.push("play".to_string());
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.commands.push("pause".to_string());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.commands.push("stop".to_string());
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.commands.push(format!("seek {position_ms}"));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.commands.push(format!("volume {volume:.2}"));
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        self.commands.push(format!("rate {rate:.2}"));
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position_ms
    }
}
