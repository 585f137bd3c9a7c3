//! Track sequencing
//!
//! Decides which playlist index plays after a Next/Previous request or when the
//! current track reaches its end, from the shuffle state and repeat mode.

use crate::playlist::Playlist;
use crate::shuffle::ShuffleOrder;
use crate::types::{Direction, RepeatMode};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::{debug, warn};

/// Next/previous/end-of-media decisions
///
/// Owns the shuffle order, the repeat mode and the random source used for
/// both permutations and random end-of-media picks.
pub struct PlaybackSequencer {
    shuffle: ShuffleOrder,
    repeat: RepeatMode,
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for PlaybackSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSequencer")
            .field("shuffle", &self.shuffle)
            .field("repeat", &self.repeat)
            .finish_non_exhaustive()
    }
}

impl Default for PlaybackSequencer {
    fn default() -> Self {
        Self::with_seed(None)
    }
}

impl PlaybackSequencer {
    /// Create a sequencer with an injected random source
    pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            shuffle: ShuffleOrder::new(),
            repeat: RepeatMode::Off,
            rng,
        }
    }

    /// Seeded (reproducible) or entropy-backed random source
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(Box::new(rng))
    }

    // ===== Repeat =====

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Advance Off -> All -> One -> Off and return the new mode
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    // ===== Shuffle =====

    pub fn shuffle(&self) -> &ShuffleOrder {
        &self.shuffle
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle.is_enabled()
    }

    /// Turn shuffle on or off
    ///
    /// Enabling always draws a fresh permutation anchored on `current`.
    pub fn set_shuffle(&mut self, enabled: bool, playlist: &Playlist, current: Option<usize>) {
        if enabled {
            self.shuffle
                .enable(playlist.len(), current, self.rng.as_mut());
        } else {
            self.shuffle.disable();
        }
    }

    /// Flip shuffle and return the new state
    pub fn toggle_shuffle(&mut self, playlist: &Playlist, current: Option<usize>) -> bool {
        let enabled = !self.shuffle.is_enabled();
        self.set_shuffle(enabled, playlist, current);
        enabled
    }

    /// Rebuild the shuffle order after the playlist changed composition
    pub fn playlist_changed(&mut self, playlist: &Playlist, current: Option<usize>) {
        if self.shuffle.is_enabled() {
            self.shuffle
                .enable(playlist.len(), current, self.rng.as_mut());
        }
    }

    /// Keep the shuffle cursor on a track chosen outside the sequencer
    /// (explicit selection, random end-of-media pick)
    pub fn track_selected(&mut self, playlist: &Playlist, index: usize) {
        if self.shuffle.is_enabled() && !self.shuffle.locate(index) {
            self.resync(playlist, Some(index));
        }
    }

    /// Regenerate the order if it no longer matches the playlist
    fn resync(&mut self, playlist: &Playlist, current: Option<usize>) {
        if !self.shuffle.is_synced(playlist.len(), current) {
            warn!(
                len = playlist.len(),
                ?current,
                "Shuffle order out of sync with playlist, regenerating"
            );
            self.shuffle
                .enable(playlist.len(), current, self.rng.as_mut());
        }
    }

    // ===== Decisions =====

    /// Index to play for a Next request
    pub fn next(&mut self, playlist: &Playlist, current: Option<usize>) -> Option<usize> {
        self.step(Direction::Next, playlist, current)
    }

    /// Index to play for a Previous request
    pub fn previous(&mut self, playlist: &Playlist, current: Option<usize>) -> Option<usize> {
        self.step(Direction::Previous, playlist, current)
    }

    fn step(
        &mut self,
        direction: Direction,
        playlist: &Playlist,
        current: Option<usize>,
    ) -> Option<usize> {
        if playlist.is_empty() {
            return None;
        }
        let current = current.map(|index| clamp_index(index, playlist.len()));

        if self.shuffle.is_enabled() {
            self.resync(playlist, current);
            return match current {
                Some(_) => self
                    .shuffle
                    .advance(direction, self.repeat, self.rng.as_mut()),
                // Nothing loaded yet: start from the end of the order we are walking into
                None => self.shuffle.restart(direction),
            };
        }

        linear_step(direction, playlist.len(), current, self.repeat)
    }

    /// What to play once the current track has ended
    ///
    /// `None` means stop.
    pub fn on_media_ended(&mut self, playlist: &Playlist, current: Option<usize>) -> Option<usize> {
        if playlist.is_empty() {
            return None;
        }
        let current = current.map(|index| clamp_index(index, playlist.len()));

        let decision = match self.repeat {
            RepeatMode::One => current,
            RepeatMode::All if self.shuffle.is_enabled() => self.random_track(playlist, current),
            RepeatMode::All => linear_step(Direction::Next, playlist.len(), current, self.repeat),
            RepeatMode::Off if self.shuffle.is_enabled() => self.random_track(playlist, current),
            RepeatMode::Off => None,
        };

        debug!(repeat = ?self.repeat, shuffle = self.shuffle.is_enabled(), ?current, ?decision, "End of media");
        decision
    }

    /// Uniform pick among the tracks other than `current`
    ///
    /// With a single track the pick is the current track itself.
    pub fn random_track(&mut self, playlist: &Playlist, current: Option<usize>) -> Option<usize> {
        let len = playlist.len();
        let pick = match (len, current) {
            (0, _) => return None,
            (1, Some(index)) => index,
            (_, Some(index)) => {
                // Draw from len - 1 slots and skip over the current index
                let pick = self.rng.gen_range(0..len - 1);
                if pick >= index {
                    pick + 1
                } else {
                    pick
                }
            }
            (_, None) => self.rng.gen_range(0..len),
        };

        self.track_selected(playlist, pick);
        Some(pick)
    }
}

/// Linear-order step for the given repeat mode
fn linear_step(
    direction: Direction,
    len: usize,
    current: Option<usize>,
    repeat: RepeatMode,
) -> Option<usize> {
    let last = len.checked_sub(1)?;

    let Some(current) = current else {
        return match direction {
            Direction::Next => Some(0),
            Direction::Previous => None,
        };
    };

    let (at_boundary, wrap, step) = match direction {
        Direction::Next => (current == last, 0, current + 1),
        Direction::Previous => (current == 0, last, current.wrapping_sub(1)),
    };

    if !at_boundary {
        return Some(step);
    }

    match repeat {
        RepeatMode::Off => None,
        RepeatMode::All => Some(wrap),
        RepeatMode::One => Some(current),
    }
}

/// Internal indices are always valid; fail loudly in debug, clamp in release
fn clamp_index(index: usize, len: usize) -> usize {
    debug_assert!(index < len, "playlist index {index} out of range (len {len})");
    index.min(len.saturating_sub(1))
}
