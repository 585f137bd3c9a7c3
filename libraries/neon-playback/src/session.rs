//! Playback session - core orchestration
//!
//! Owns the playlist, sequencer and volume, drives the media backend and
//! routes backend notifications back into sequencing decisions.

use crate::{
    backend::{BackendEvent, BackendPlaybackState, MediaBackend, MediaStatus},
    config::{PlaybackConfig, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE},
    error::{PlaybackError, Result},
    events::SessionEvent,
    playlist::Playlist,
    sequencer::PlaybackSequencer,
    types::{Key, MediaKind, PlaybackStatus, RepeatMode, Track},
    volume::VolumeController,
};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Central playback state
///
/// Single-threaded and event driven: every method runs to completion, and
/// backend notifications are expected one at a time through
/// [`handle_backend_event`](Self::handle_backend_event).
pub struct PlaybackSession<B: MediaBackend> {
    backend: B,

    // Sequencing
    playlist: Playlist,
    sequencer: PlaybackSequencer,

    // Settings
    volume: VolumeController,
    playback_rate: f32,
    tick_interval_ms: u64,

    // Backend mirror
    current_index: Option<usize>,
    status: PlaybackStatus,
    position_ms: u64,
    duration_ms: u64,

    // Invalid sources skipped in a row, bounds automatic skipping
    consecutive_invalid: usize,

    // Event queue for UI synchronization
    pending_events: Vec<SessionEvent>,
}

impl<B: MediaBackend> PlaybackSession<B> {
    /// Create a session and push the initial volume and rate to the backend
    pub fn new(backend: B, config: PlaybackConfig) -> Result<Self> {
        config.validate()?;

        let mut sequencer = PlaybackSequencer::with_seed(config.shuffle_seed);
        sequencer.set_repeat(config.repeat);

        let mut volume = VolumeController::new(config.volume);
        if config.muted {
            volume.mute();
        }

        let mut session = Self {
            backend,
            playlist: Playlist::new(),
            sequencer,
            volume,
            playback_rate: config.playback_rate,
            tick_interval_ms: config.tick_interval_ms,
            current_index: None,
            status: PlaybackStatus::Idle,
            position_ms: 0,
            duration_ms: 0,
            consecutive_invalid: 0,
            pending_events: Vec::new(),
        };

        if config.shuffle {
            session
                .sequencer
                .set_shuffle(true, &session.playlist, None);
        }

        session.backend.set_volume(session.volume.gain())?;
        session.backend.set_playback_rate(session.playback_rate)?;
        Ok(session)
    }

    // ===== Playlist =====

    /// Append a track (no-op if its path is already present)
    ///
    /// Returns true if the playlist changed.
    pub fn add_track(&mut self, track: impl Into<Track>) -> bool {
        if !self.playlist.add(track.into()) {
            return false;
        }
        self.playlist_changed();
        true
    }

    /// Import a batch of files, keeping only supported media in sorted order
    pub fn add_tracks<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let added = self.playlist.add_many(paths);
        if added > 0 {
            info!(added, total = self.playlist.len(), "Imported tracks");
            self.playlist_changed();
        }
        added
    }

    /// Add a track and play it right away
    ///
    /// A track that is already in the playlist plays from its existing entry.
    pub fn open_and_play(&mut self, track: impl Into<Track>) -> Result<()> {
        let track = track.into();
        let path = track.path().to_path_buf();
        self.add_track(track);

        let index = self
            .playlist
            .position(&path)
            .ok_or(PlaybackError::PlaylistEmpty)?;
        self.select_and_play(index)
    }

    /// Clear the playlist and stop playback
    pub fn remove_all_tracks(&mut self) -> Result<()> {
        self.playlist.remove_all();
        self.current_index = None;
        self.position_ms = 0;
        self.duration_ms = 0;
        self.consecutive_invalid = 0;
        self.sequencer.playlist_changed(&self.playlist, None);

        info!("Playlist cleared");
        self.emit(SessionEvent::PlaylistChanged { length: 0 });
        self.set_status(PlaybackStatus::Stopped);
        self.backend.stop()
    }

    fn playlist_changed(&mut self) {
        self.sequencer
            .playlist_changed(&self.playlist, self.current_index);
        self.emit(SessionEvent::PlaylistChanged {
            length: self.playlist.len(),
        });
    }

    // ===== Playback Control =====

    /// Load and play the track at `index`
    pub fn select_and_play(&mut self, index: usize) -> Result<()> {
        self.playlist.at(index)?;
        self.consecutive_invalid = 0;
        self.sequencer.track_selected(&self.playlist, index);
        self.load_index(index)
    }

    /// Pause when playing, otherwise start or resume
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.status == PlaybackStatus::Playing {
            return self.pause();
        }
        if self.playlist.is_empty() {
            debug!("Play requested with an empty playlist");
            return Ok(());
        }
        self.play()
    }

    /// Start or resume playback
    ///
    /// Resumes a paused track; after a stop, error or end of playlist the
    /// current track is loaded again. With nothing selected the first track
    /// plays.
    pub fn play(&mut self) -> Result<()> {
        let Some(index) = self.current_index else {
            if self.playlist.is_empty() {
                return Err(PlaybackError::PlaylistEmpty);
            }
            return self.select_and_play(0);
        };

        match self.status {
            PlaybackStatus::Paused => {
                self.backend.play()?;
                self.set_status(PlaybackStatus::Playing);
                Ok(())
            }
            PlaybackStatus::Playing | PlaybackStatus::Loading => Ok(()),
            PlaybackStatus::Idle
            | PlaybackStatus::Stopped
            | PlaybackStatus::Ended
            | PlaybackStatus::Error => {
                self.consecutive_invalid = 0;
                self.load_index(index)
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if self.status == PlaybackStatus::Playing {
            self.backend.pause()?;
            self.set_status(PlaybackStatus::Paused);
        }
        Ok(())
    }

    /// Stop playback, keeping the current selection
    pub fn stop(&mut self) -> Result<()> {
        self.backend.stop()?;
        self.position_ms = 0;
        self.set_status(PlaybackStatus::Stopped);
        Ok(())
    }

    /// Skip to the next track
    ///
    /// Returns the index that started loading, or `None` when the sequencer
    /// decided there is nothing further to play.
    pub fn next(&mut self) -> Result<Option<usize>> {
        let target = self.sequencer.next(&self.playlist, self.current_index);
        self.navigate(target)
    }

    /// Go back to the previous track
    pub fn previous(&mut self) -> Result<Option<usize>> {
        let target = self.sequencer.previous(&self.playlist, self.current_index);
        self.navigate(target)
    }

    fn navigate(&mut self, target: Option<usize>) -> Result<Option<usize>> {
        match target {
            Some(index) => {
                self.consecutive_invalid = 0;
                self.load_index(index)?;
                Ok(Some(index))
            }
            None => {
                debug!(current = ?self.current_index, "No track in that direction");
                Ok(None)
            }
        }
    }

    /// Seek within the loaded track
    ///
    /// Once the duration is known, targets past it are rejected without
    /// touching the backend.
    pub fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        if self.current_index.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.duration_ms > 0 && position_ms > self.duration_ms {
            return Err(PlaybackError::InvalidSeekPosition(position_ms));
        }

        self.backend.seek(position_ms)?;
        self.update_position(position_ms);
        Ok(())
    }

    /// Set playback speed multiplier (0.25x - 2.0x)
    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&rate) {
            return Err(PlaybackError::PlaybackRateOutOfRange(rate));
        }
        self.backend.set_playback_rate(rate)?;
        self.playback_rate = rate;
        debug!(rate, "Playback rate changed");
        self.emit(SessionEvent::PlaybackRateChanged { rate });
        Ok(())
    }

    // ===== Shuffle & Repeat =====

    /// Flip shuffle and return the new state
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self
            .sequencer
            .toggle_shuffle(&self.playlist, self.current_index);
        info!(enabled, "Shuffle toggled");
        self.emit(SessionEvent::ShuffleChanged { enabled });
        enabled
    }

    /// Advance the repeat mode and return it
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        let mode = self.sequencer.cycle_repeat();
        info!(?mode, "Repeat mode changed");
        self.emit(SessionEvent::RepeatChanged { mode });
        mode
    }

    // ===== Volume =====

    /// Set volume (0-100)
    pub fn set_volume(&mut self, level: i32) -> Result<()> {
        self.volume.set_level(level)?;
        self.apply_volume()
    }

    /// Toggle mute and return the new mute state
    pub fn toggle_mute(&mut self) -> Result<bool> {
        let muted = self.volume.toggle_mute();
        self.apply_volume()?;
        Ok(muted)
    }

    fn apply_volume(&mut self) -> Result<()> {
        self.backend.set_volume(self.volume.gain())?;
        self.emit(SessionEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
        Ok(())
    }

    // ===== Input =====

    /// Keyboard shortcuts: Space plays/pauses, Right and Left navigate
    ///
    /// Returns false for keys the session does not handle.
    pub fn handle_key(&mut self, key: Key) -> Result<bool> {
        match key {
            Key::Space => self.toggle_play_pause()?,
            Key::Right => {
                self.next()?;
            }
            Key::Left => {
                self.previous()?;
            }
            Key::Enter | Key::Other => return Ok(false),
        }
        Ok(true)
    }

    /// Periodic position poll
    ///
    /// Skipped while the user drags the seek control or nothing is loaded.
    /// Returns the polled position.
    pub fn tick(&mut self, user_seeking: bool) -> Option<u64> {
        if user_seeking || self.current_index.is_none() {
            return None;
        }
        let position_ms = self.backend.position();
        self.update_position(position_ms);
        Some(position_ms)
    }

    // ===== Backend Events =====

    /// React to a backend notification
    ///
    /// Returns an error only if a follow-up command (auto-advance) failed.
    pub fn handle_backend_event(&mut self, event: BackendEvent) -> Result<()> {
        match event {
            BackendEvent::PositionChanged(position_ms) => {
                self.update_position(position_ms);
                Ok(())
            }
            BackendEvent::DurationChanged(duration_ms) => {
                if self.duration_ms != duration_ms {
                    self.duration_ms = duration_ms;
                    self.emit(SessionEvent::DurationChanged { duration_ms });
                }
                Ok(())
            }
            BackendEvent::PlaybackStateChanged(state) => {
                self.on_backend_state(state);
                Ok(())
            }
            BackendEvent::MediaStatusChanged(status) => self.on_media_status(status),
            BackendEvent::ErrorOccurred { code, message } => {
                error!(code, %message, "Media backend error");
                self.report_error(PlaybackError::Backend { code, message });
                Ok(())
            }
        }
    }

    fn on_backend_state(&mut self, state: BackendPlaybackState) {
        // Error is only left through a new load started by an explicit play
        if self.status == PlaybackStatus::Error && state != BackendPlaybackState::Stopped {
            debug!(?state, "Ignoring backend state while in error");
            return;
        }

        match state {
            BackendPlaybackState::Playing => {
                self.consecutive_invalid = 0;
                self.set_status(PlaybackStatus::Playing);
            }
            BackendPlaybackState::Paused => {
                if self.status == PlaybackStatus::Playing {
                    self.set_status(PlaybackStatus::Paused);
                }
            }
            BackendPlaybackState::Stopped => {
                // Echo of our own stop while switching tracks must not clobber Loading
                if matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused) {
                    self.set_status(PlaybackStatus::Stopped);
                }
            }
        }
    }

    fn on_media_status(&mut self, status: MediaStatus) -> Result<()> {
        match status {
            MediaStatus::Loading => {
                debug!(index = ?self.current_index, "Loading media");
                if self.status != PlaybackStatus::Error {
                    self.set_status(PlaybackStatus::Loading);
                }
                Ok(())
            }
            MediaStatus::Loaded => {
                debug!(index = ?self.current_index, "Media loaded");
                Ok(())
            }
            MediaStatus::EndOfMedia | MediaStatus::Invalid
                if self.status == PlaybackStatus::Error =>
            {
                debug!(?status, "Ignoring media status while in error");
                Ok(())
            }
            MediaStatus::EndOfMedia => self.on_end_of_media(),
            MediaStatus::Invalid => self.on_invalid_media(),
        }
    }

    fn on_end_of_media(&mut self) -> Result<()> {
        self.set_status(PlaybackStatus::Ended);

        match self.sequencer.on_media_ended(&self.playlist, self.current_index) {
            Some(index) if Some(index) == self.current_index => {
                debug!(index, "Replaying current track");
                self.restart_current()
            }
            Some(index) => {
                info!(index, "Advancing to next track");
                self.load_index(index)
            }
            None => {
                info!("Reached end of playlist");
                self.set_status(PlaybackStatus::Idle);
                Ok(())
            }
        }
    }

    fn on_invalid_media(&mut self) -> Result<()> {
        let path = self
            .current_track()
            .map(|track| track.path().to_path_buf())
            .unwrap_or_default();
        warn!(path = %path.display(), "Invalid media, skipping");
        // Non-fatal: reported, but the status never becomes Error
        self.emit(SessionEvent::Error {
            error: PlaybackError::InvalidMedia(path),
        });
        self.consecutive_invalid += 1;

        // Replaying a broken source or cycling through a playlist of them would never end
        let can_advance = self.sequencer.repeat() != RepeatMode::One
            && self.consecutive_invalid < self.playlist.len();

        let target = if can_advance {
            self.sequencer
                .on_media_ended(&self.playlist, self.current_index)
                .filter(|index| Some(*index) != self.current_index)
        } else {
            None
        };

        match target {
            Some(index) => self.load_index(index),
            None => {
                self.set_status(PlaybackStatus::Stopped);
                Ok(())
            }
        }
    }

    // ===== Internal =====

    /// Stop whatever is playing, then load and start `index`
    fn load_index(&mut self, index: usize) -> Result<()> {
        let path = self.playlist.at(index)?.path().to_path_buf();
        let previous_index = self.current_index.replace(index);

        self.position_ms = 0;
        self.duration_ms = 0;
        self.set_status(PlaybackStatus::Loading);
        self.emit(SessionEvent::TrackChanged {
            index,
            previous_index,
        });
        info!(index, path = %path.display(), "Loading track");

        let started = self
            .backend
            .stop()
            .and_then(|()| self.backend.load(&path))
            .and_then(|()| self.backend.set_volume(self.volume.gain()))
            .and_then(|()| self.backend.play());

        if let Err(err) = started {
            error!(index, error = %err, "Failed to start track");
            self.report_error(err.clone());
            return Err(err);
        }
        Ok(())
    }

    fn restart_current(&mut self) -> Result<()> {
        self.set_status(PlaybackStatus::Loading);
        let restarted = self
            .backend
            .seek(0)
            .and_then(|()| self.backend.play());

        match restarted {
            Ok(()) => {
                self.update_position(0);
                Ok(())
            }
            Err(err) => {
                self.report_error(err.clone());
                Err(err)
            }
        }
    }

    fn report_error(&mut self, error: PlaybackError) {
        self.set_status(PlaybackStatus::Error);
        self.emit(SessionEvent::Error { error });
    }

    fn update_position(&mut self, position_ms: u64) {
        if self.position_ms != position_ms {
            self.position_ms = position_ms;
            self.emit(SessionEvent::PositionChanged { position_ms });
        }
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "Status changed");
            self.status = status;
            self.emit(SessionEvent::StatusChanged { status });
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== State Queries =====

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.sequencer.shuffle_enabled()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.sequencer.repeat()
    }

    pub fn volume(&self) -> &VolumeController {
        &self.volume
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    /// How often the UI should call [`tick`](Self::tick)
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn sequencer(&self) -> &PlaybackSequencer {
        &self.sequencer
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index
            .and_then(|index| self.playlist.at(index).ok())
    }

    /// Audio or video, for choosing the visualizer or video panel
    pub fn current_kind(&self) -> Option<MediaKind> {
        self.current_track().map(Track::kind)
    }

    /// Title and position labels, e.g. `("song.mp3", "Track 2 of 5")`
    pub fn now_playing(&self) -> Option<(String, String)> {
        let index = self.current_index?;
        let track = self.playlist.at(index).ok()?;
        Some((
            track.file_name(),
            format!("Track {} of {}", index + 1, self.playlist.len()),
        ))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    fn session(tracks: &[&str]) -> PlaybackSession<RecordingBackend> {
        let config = PlaybackConfig {
            shuffle_seed: Some(1),
            ..Default::default()
        };
        let mut session = PlaybackSession::new(RecordingBackend::new(), config).unwrap();
        for track in tracks {
            session.add_track(*track);
        }
        session.backend_mut().commands.clear();
        session.drain_events();
        session
    }

    #[test]
    fn new_session_pushes_initial_settings() {
        let session = PlaybackSession::new(RecordingBackend::new(), PlaybackConfig::default()).unwrap();

        assert_eq!(session.backend().commands, vec!["volume 0.70", "rate 1.00"]);
        assert_eq!(session.status(), PlaybackStatus::Idle);
        assert_eq!(session.current_index(), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PlaybackConfig {
            playback_rate: 0.1,
            ..Default::default()
        };
        assert!(PlaybackSession::new(RecordingBackend::new(), config).is_err());
    }

    #[test]
    fn switching_tracks_stops_before_loading() {
        let mut session = session(&["/m/a.mp3", "/m/b.mp3"]);
        session.select_and_play(1).unwrap();

        assert_eq!(
            session.backend().commands,
            vec!["stop", "load /m/b.mp3", "volume 0.70", "play"]
        );
        assert_eq!(session.status(), PlaybackStatus::Loading);
        assert_eq!(session.current_index(), Some(1));
    }

    #[test]
    fn select_out_of_range() {
        let mut session = session(&["/m/a.mp3"]);
        assert_eq!(
            session.select_and_play(3),
            Err(PlaybackError::IndexOutOfRange(3))
        );
        assert!(session.backend().commands.is_empty());
    }

    #[test]
    fn load_failure_moves_to_error() {
        let mut session = session(&["/m/a.mp3"]);
        session.backend_mut().fail_load = true;

        assert!(session.select_and_play(0).is_err());
        assert_eq!(session.status(), PlaybackStatus::Error);
        assert!(session
            .drain_events()
            .iter()
            .any(|event| matches!(event, SessionEvent::Error { .. })));
    }

    #[test]
    fn tick_is_gated_by_seek_drag() {
        let mut session = session(&["/m/a.mp3"]);
        assert_eq!(session.tick(false), None);

        session.select_and_play(0).unwrap();
        session.backend_mut().position_ms = 4_000;

        assert_eq!(session.tick(true), None);
        assert_eq!(session.position_ms(), 0);

        assert_eq!(session.tick(false), Some(4_000));
        assert_eq!(session.position_ms(), 4_000);

        session.drain_events();
        assert_eq!(session.tick(false), Some(4_000));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn end_of_media_with_repeat_one_restarts() {
        let mut session = session(&["/m/a.mp3", "/m/b.mp3"]);
        session.cycle_repeat();
        session.cycle_repeat();
        session.select_and_play(0).unwrap();
        session.backend_mut().commands.clear();

        session
            .handle_backend_event(BackendEvent::MediaStatusChanged(MediaStatus::EndOfMedia))
            .unwrap();

        assert_eq!(session.backend().commands, vec!["seek 0", "play"]);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn backend_stop_echo_keeps_loading() {
        let mut session = session(&["/m/a.mp3"]);
        session.select_and_play(0).unwrap();

        session
            .handle_backend_event(BackendEvent::PlaybackStateChanged(
                BackendPlaybackState::Stopped,
            ))
            .unwrap();
        assert_eq!(session.status(), PlaybackStatus::Loading);
    }

    #[test]
    fn error_ignores_backend_echoes_until_play() {
        let mut session = session(&["/m/a.mp3", "/m/b.mp3"]);
        session.select_and_play(0).unwrap();
        session
            .handle_backend_event(BackendEvent::ErrorOccurred {
                code: 5,
                message: "Decoder crashed".to_string(),
            })
            .unwrap();
        session.backend_mut().commands.clear();

        for state in [BackendPlaybackState::Playing, BackendPlaybackState::Paused] {
            session
                .handle_backend_event(BackendEvent::PlaybackStateChanged(state))
                .unwrap();
            assert_eq!(session.status(), PlaybackStatus::Error);
        }
        for status in [MediaStatus::EndOfMedia, MediaStatus::Invalid] {
            session
                .handle_backend_event(BackendEvent::MediaStatusChanged(status))
                .unwrap();
            assert_eq!(session.status(), PlaybackStatus::Error);
        }
        assert!(session.backend().commands.is_empty());
        assert_eq!(session.current_index(), Some(0));

        session.play().unwrap();
        assert_eq!(session.status(), PlaybackStatus::Loading);
        session
            .handle_backend_event(BackendEvent::PlaybackStateChanged(
                BackendPlaybackState::Playing,
            ))
            .unwrap();
        assert_eq!(session.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn seek_past_known_duration_is_rejected() {
        let mut session = session(&["/m/a.mp3"]);
        session.select_and_play(0).unwrap();
        session
            .handle_backend_event(BackendEvent::DurationChanged(10_000))
            .unwrap();
        session.backend_mut().commands.clear();

        assert_eq!(
            session.seek_to(10_001),
            Err(PlaybackError::InvalidSeekPosition(10_001))
        );
        assert!(session.backend().commands.is_empty());

        session.seek_to(10_000).unwrap();
        assert_eq!(session.backend().commands, vec!["seek 10000"]);
    }

    #[test]
    fn now_playing_labels() {
        let mut session = session(&["/m/a.mp3", "/m/clip.mkv"]);
        assert_eq!(session.now_playing(), None);

        session.select_and_play(1).unwrap();
        assert_eq!(
            session.now_playing(),
            Some(("clip.mkv".to_string(), "Track 2 of 2".to_string()))
        );
        assert_eq!(session.current_kind(), Some(MediaKind::Video));
    }
}
