//! Session Events
//!
//! State-change notifications for UI binding. The session queues them as it
//! changes state; the UI drains them and updates its widgets.

use crate::error::PlaybackError;
use crate::types::{PlaybackStatus, RepeatMode};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session status changed
    StatusChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// A different track (or the same one again) was loaded
    TrackChanged {
        /// Playlist index of the new track
        index: usize,
        /// Index of the track that was loaded before (if any)
        previous_index: Option<usize>,
    },

    /// Position update (backend tick or periodic poll)
    PositionChanged {
        position_ms: u64,
    },

    /// Duration of the loaded media became known
    DurationChanged {
        duration_ms: u64,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    ShuffleChanged {
        enabled: bool,
    },

    RepeatChanged {
        mode: RepeatMode,
    },

    /// Tracks added or playlist cleared
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    PlaybackRateChanged {
        rate: f32,
    },

    /// Something went wrong
    ///
    /// `InvalidMedia` is reported here without moving the session to
    /// `Error`; backend and load failures arrive together with
    /// `StatusChanged { status: Error }`.
    Error {
        error: PlaybackError,
    },
}
