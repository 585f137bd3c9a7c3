//! Volume level and mute state
//!
//! Volume range is 0-100%. The backend receives a linear 0.0-1.0 value.
//! Mute never touches `level`; unmuting restores the level recorded at mute time.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Volume controller with restore-on-unmute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeController {
    /// Volume level (0-100)
    level: u8,

    /// Mute state
    muted: bool,

    /// Level captured by the most recent mute
    pre_mute_level: u8,
}

impl VolumeController {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume (0-100, clamped)
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            pre_mute_level: level,
        }
    }

    /// Set volume level (0-100)
    ///
    /// Values outside the range are rejected and leave the state untouched.
    /// While muted the level is stored but output stays silent.
    pub fn set_level(&mut self, level: i32) -> Result<()> {
        let level = u8::try_from(level)
            .ok()
            .filter(|level| *level <= 100)
            .ok_or(PlaybackError::VolumeOutOfRange(level))?;
        self.level = level;
        Ok(())
    }

    /// Get current volume level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Level that unmute will restore
    pub fn pre_mute_level(&self) -> u8 {
        self.pre_mute_level
    }

    /// Mute audio
    ///
    /// Returns false if already muted (no-op).
    pub fn mute(&mut self) -> bool {
        if self.muted {
            return false;
        }
        self.pre_mute_level = self.level;
        self.muted = true;
        true
    }

    /// Unmute audio, restoring the level captured by `mute`
    ///
    /// Returns false if not muted (no-op).
    pub fn unmute(&mut self) -> bool {
        if !self.muted {
            return false;
        }
        self.level = self.pre_mute_level;
        self.muted = false;
        true
    }

    /// Toggle mute state, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
        self.muted
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level actually sent to the output (0 while muted)
    pub fn effective_output(&self) -> u8 {
        if self.muted {
            0
        } else {
            self.level
        }
    }

    /// Linear gain for the backend (0.0-1.0)
    pub fn gain(&self) -> f32 {
        f32::from(self.effective_output()) / 100.0
    }

    /// Slider label, e.g. `"70%"`
    pub fn percent_label(&self) -> String {
        format!("{}%", self.level)
    }
}

impl Default for VolumeController {
    fn default() -> Self {
        Self::new(70)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = VolumeController::new(80);
        assert_eq!(vol.level(), 80);
        assert!(!vol.is_muted());
        assert_eq!(VolumeController::new(150).level(), 100);
    }

    #[test]
    fn set_volume_level() {
        let mut vol = VolumeController::new(50);
        vol.set_level(75).unwrap();
        assert_eq!(vol.level(), 75);

        vol.set_level(0).unwrap();
        vol.set_level(100).unwrap();
        assert_eq!(vol.level(), 100);
    }

    #[test]
    fn out_of_range_is_rejected_without_change() {
        let mut vol = VolumeController::new(40);

        assert_eq!(vol.set_level(101), Err(PlaybackError::VolumeOutOfRange(101)));
        assert_eq!(vol.set_level(-1), Err(PlaybackError::VolumeOutOfRange(-1)));
        assert_eq!(vol.level(), 40);
    }

    #[test]
    fn mute_unmute_restores_level() {
        let mut vol = VolumeController::new(80);
        vol.set_level(35).unwrap();

        assert!(vol.mute());
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 35); // Level preserved
        assert_eq!(vol.effective_output(), 0);

        assert!(vol.unmute());
        assert_eq!(vol.level(), 35);
        assert_eq!(vol.effective_output(), 35);
    }

    #[test]
    fn second_mute_is_noop() {
        let mut vol = VolumeController::new(60);
        assert!(vol.mute());
        let before = vol;

        assert!(!vol.mute());
        assert_eq!(vol, before);
        assert_eq!(vol.pre_mute_level(), 60);
    }

    #[test]
    fn unmute_when_not_muted_is_noop() {
        let mut vol = VolumeController::new(60);
        assert!(!vol.unmute());
        assert_eq!(vol.level(), 60);
    }

    #[test]
    fn level_set_while_muted_is_not_applied() {
        let mut vol = VolumeController::new(70);
        vol.mute();
        vol.set_level(20).unwrap();

        assert_eq!(vol.level(), 20);
        assert_eq!(vol.effective_output(), 0);

        vol.unmute();
        assert_eq!(vol.level(), 70);
    }

    #[test]
    fn toggle_mute() {
        let mut vol = VolumeController::new(80);
        assert!(vol.toggle_mute());
        assert!(!vol.toggle_mute());
        assert_eq!(vol.level(), 80);
    }

    #[test]
    fn gain_is_linear() {
        assert_eq!(VolumeController::new(0).gain(), 0.0);
        assert_eq!(VolumeController::new(100).gain(), 1.0);
        assert!((VolumeController::new(70).gain() - 0.7).abs() < 1e-6);

        let mut vol = VolumeController::new(90);
        vol.mute();
        assert_eq!(vol.gain(), 0.0);
    }

    #[test]
    fn percent_label() {
        assert_eq!(VolumeController::default().percent_label(), "70%");
    }
}
