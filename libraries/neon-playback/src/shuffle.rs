//! Shuffle traversal order
//!
//! Keeps a Fisher-Yates permutation of playlist indices plus a cursor into it.
//! While enabled, `order[cursor]` is the currently loaded track.

use crate::types::{Direction, RepeatMode};
use rand::seq::SliceRandom;
use rand::RngCore;

/// Randomized traversal order over playlist indices
#[derive(Debug, Clone, Default)]
pub struct ShuffleOrder {
    enabled: bool,
    order: Vec<usize>,
    cursor: usize,
}

impl ShuffleOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh permutation of `0..len`
    ///
    /// The cursor lands wherever `anchor` ended up in the permutation, or on
    /// the first entry when there is no anchor. Safe to call while already
    /// enabled: this is also how a stale order is rebuilt.
    pub fn enable(&mut self, len: usize, anchor: Option<usize>, rng: &mut dyn RngCore) {
        self.enabled = true;
        self.order = (0..len).collect();
        self.order.shuffle(rng);
        self.cursor = anchor
            .and_then(|index| self.order.iter().position(|&i| i == index))
            .unwrap_or(0);
    }

    /// Turn shuffle off and drop the permutation
    pub fn disable(&mut self) {
        self.enabled = false;
        self.order.clear();
        self.cursor = 0;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Playlist index under the cursor
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    /// Whether the order still describes a playlist of `len` tracks with
    /// `current` under the cursor
    pub fn is_synced(&self, len: usize, current: Option<usize>) -> bool {
        if !self.enabled || self.order.len() != len {
            return false;
        }
        match current {
            Some(index) => self.current() == Some(index),
            None => true,
        }
    }

    /// Move the cursor onto `index` without reshuffling
    ///
    /// Returns false if the index is not in the order.
    pub fn locate(&mut self, index: usize) -> bool {
        match self.order.iter().position(|&i| i == index) {
            Some(position) => {
                self.cursor = position;
                true
            }
            None => false,
        }
    }

    /// Put the cursor on the first (Next) or last (Previous) entry
    pub fn restart(&mut self, direction: Direction) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        self.cursor = match direction {
            Direction::Next => 0,
            Direction::Previous => self.order.len() - 1,
        };
        self.current()
    }

    /// Step through the order
    ///
    /// At the boundary, repeat All draws a new permutation and continues from
    /// its first (Next) or last (Previous) entry. Off and One stop there.
    pub fn advance(
        &mut self,
        direction: Direction,
        repeat: RepeatMode,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }

        let at_boundary = match direction {
            Direction::Next => self.cursor + 1 >= self.order.len(),
            Direction::Previous => self.cursor == 0,
        };

        if !at_boundary {
            self.cursor = match direction {
                Direction::Next => self.cursor + 1,
                Direction::Previous => self.cursor - 1,
            };
            return self.current();
        }

        match repeat {
            RepeatMode::All => {
                self.order.shuffle(rng);
                self.restart(direction)
            }
            RepeatMode::Off | RepeatMode::One => None,
        }
    }
}
