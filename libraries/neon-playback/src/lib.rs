//! Neon Media Player - Playback Control
//!
//! Toolkit-agnostic playback sequencing for Neon Media Player.
//!
//! This crate provides:
//! - Playlist (ordered, deduplicated, audio/video classification)
//! - Shuffle order (Fisher-Yates permutation with cursor)
//! - Repeat modes (Off, All, One)
//! - Volume control (0-100%, mute with restore)
//! - Next/previous/end-of-media sequencing
//! - Playback session driving an external media backend
//!
//! # Architecture
//!
//! `neon-playback` does not decode or render anything:
//! - No dependency on a GUI toolkit
//! - No dependency on a media framework
//!
//! The platform backend is plugged in through the [`MediaBackend`] trait and
//! reports back with [`BackendEvent`]s. The UI reads session state and drains
//! [`SessionEvent`]s to update its widgets.
//!
//! # Example
//!
//! ```rust
//! use neon_playback::{MediaBackend, PlaybackConfig, PlaybackSession, Result};
//! use std::path::Path;
//!
//! // Implement MediaBackend for your platform
//! struct SilentBackend;
//!
//! impl MediaBackend for SilentBackend {
//!     fn load(&mut self, _source: &Path) -> Result<()> { Ok(()) }
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) -> Result<()> { Ok(()) }
//!     fn stop(&mut self) -> Result<()> { Ok(()) }
//!     fn seek(&mut self, _position_ms: u64) -> Result<()> { Ok(()) }
//!     fn set_volume(&mut self, _volume: f32) -> Result<()> { Ok(()) }
//!     fn set_playback_rate(&mut self, _rate: f32) -> Result<()> { Ok(()) }
//!     fn position(&self) -> u64 { 0 }
//! }
//!
//! let mut session = PlaybackSession::new(SilentBackend, PlaybackConfig::default())?;
//! session.add_track("/music/intro.mp3");
//! session.add_track("/music/theme.flac");
//!
//! session.select_and_play(0)?;
//! session.toggle_shuffle();
//! session.cycle_repeat();
//! session.set_volume(55)?;
//!
//! for event in session.drain_events() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), neon_playback::PlaybackError>(())
//! ```

mod backend;
mod config;
pub mod display;
mod error;
mod events;
mod playlist;
mod sequencer;
mod session;
mod shuffle;
pub mod types;
mod volume;

// Public exports
pub use backend::{BackendEvent, BackendPlaybackState, MediaBackend, MediaStatus};
pub use config::{PlaybackConfig, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};
pub use error::{PlaybackError, Result};
pub use events::SessionEvent;
pub use playlist::Playlist;
pub use sequencer::PlaybackSequencer;
pub use session::PlaybackSession;
pub use shuffle::ShuffleOrder;
pub use types::{Direction, Key, MediaKind, PlaybackStatus, RepeatMode, Track};
pub use volume::VolumeController;
