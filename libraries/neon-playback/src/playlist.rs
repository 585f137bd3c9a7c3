//! Ordered, deduplicated track list

use crate::error::{PlaybackError, Result};
use crate::types::{is_supported_media, Track};
use std::path::{Path, PathBuf};

/// Playlist in insertion order
///
/// Adding a path that is already present is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track unless its path is already in the playlist
    ///
    /// Returns true if the track was appended.
    pub fn add(&mut self, track: Track) -> bool {
        if self.contains(track.path()) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Import a batch of files (e.g. a folder listing)
    ///
    /// Unsupported extensions are skipped and the rest are added in sorted
    /// path order. Returns the number of tracks actually appended.
    pub fn add_many<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut paths: Vec<PathBuf> = paths
            .into_iter()
            .map(Into::into)
            .filter(|path| is_supported_media(path))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .filter(|path| self.add(Track::new(path.clone())))
            .count()
    }

    /// Remove every track
    pub fn remove_all(&mut self) {
        self.tracks.clear();
    }

    /// Track at index
    pub fn at(&self, index: usize) -> Result<&Track> {
        self.tracks
            .get(index)
            .ok_or(PlaybackError::IndexOutOfRange(index))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    /// Index of the track with this path
    pub fn position(&self, path: &Path) -> Option<usize> {
        self.tracks.iter().position(|track| track.path() == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// List label, e.g. `"3. song.mp3"`
    pub fn label(&self, index: usize) -> Result<String> {
        let track = self.at(index)?;
        Ok(format!("{}. {}", index + 1, track.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_duplicates() {
        let mut playlist = Playlist::new();
        assert!(playlist.add(Track::new("/music/a.mp3")));
        assert!(playlist.add(Track::new("/music/b.mp3")));
        assert!(!playlist.add(Track::new("/music/a.mp3")));

        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.at(0).unwrap().path(), Path::new("/music/a.mp3"));
        assert_eq!(playlist.at(1).unwrap().path(), Path::new("/music/b.mp3"));
    }

    #[test]
    fn at_out_of_range() {
        let mut playlist = Playlist::new();
        playlist.add(Track::new("/music/a.mp3"));

        assert_eq!(playlist.at(1), Err(PlaybackError::IndexOutOfRange(1)));
    }

    #[test]
    fn remove_all_empties_playlist() {
        let mut playlist = Playlist::new();
        playlist.add(Track::new("/music/a.mp3"));
        playlist.add(Track::new("/music/b.mp3"));

        playlist.remove_all();
        assert!(playlist.is_empty());
        assert!(playlist.at(0).is_err());
    }

    #[test]
    fn add_many_filters_and_sorts() {
        let mut playlist = Playlist::new();
        playlist.add(Track::new("/folder/b.mp4"));

        let added = playlist.add_many([
            "/folder/c.flac",
            "/folder/notes.txt",
            "/folder/a.mp3",
            "/folder/b.mp4",
        ]);

        assert_eq!(added, 2);
        let names: Vec<String> = playlist.iter().map(Track::file_name).collect();
        assert_eq!(names, vec!["b.mp4", "a.mp3", "c.flac"]);
    }

    #[test]
    fn labels_are_one_based() {
        let mut playlist = Playlist::new();
        playlist.add(Track::new("/music/intro.ogg"));
        playlist.add(Track::new("/music/outro.ogg"));

        assert_eq!(playlist.label(1).unwrap(), "2. outro.ogg");
    }
}
