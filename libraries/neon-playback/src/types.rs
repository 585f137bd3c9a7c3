//! Core types for playback control

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions classified as audio; everything else plays as video
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "aac", "ogg"];

/// Extensions accepted when importing files into the playlist
pub const MEDIA_EXTENSIONS: [&str; 10] = [
    "mp3", "mp4", "wav", "avi", "mkv", "flac", "aac", "ogg", "mov", "wmv",
];

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Whether a file has one of the importable media extensions
pub fn is_supported_media(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// How the UI should present a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Audio only (visualizer panel)
    Audio,

    /// Video output panel
    Video,
}

impl MediaKind {
    /// Classify a path by its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        match lowercase_extension(path) {
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }
}

/// A playable media reference
///
/// Identity is the path: two tracks with the same path are the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    path: PathBuf,
    kind: MediaKind,
}

impl Track {
    /// Create a track, deriving its kind from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = MediaKind::from_path(&path);
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// File name for display, falling back to the full path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Track {
    fn from(path: PathBuf) -> Self {
        Track::new(path)
    }
}

impl From<&Path> for Track {
    fn from(path: &Path) -> Self {
        Track::new(path)
    }
}

impl From<&str> for Track {
    fn from(path: &str) -> Self {
        Track::new(path)
    }
}

/// Repeat mode
///
/// Cycles Off -> All -> One -> Off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the playlist
    #[default]
    Off,

    /// Wrap around the playlist
    All,

    /// Replay the current track
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    /// Short label for the repeat button
    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Repeat off",
            RepeatMode::All => "Repeat all",
            RepeatMode::One => "Repeat one",
        }
    }
}

/// Session playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing requested yet, or playback ran off the end of the playlist
    #[default]
    Idle,

    /// Source handed to the backend, waiting for it to start
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Explicitly stopped (stop or playlist cleared)
    Stopped,

    /// Current track played through to the end
    Ended,

    /// Backend reported a failure
    Error,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Ended => "ended",
            PlaybackStatus::Error => "error",
        };
        f.write_str(text)
    }
}

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Keys the session reacts to directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Right,
    Left,
    Enter,
    Other,
}
