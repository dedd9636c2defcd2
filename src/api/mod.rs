//! Operation surface
//!
//! [`TabEditor`] holds at most one song and exposes every operation on it
//! directly. Operations are grouped by domain, each module adding an
//! `impl TabEditor` block:
//!
//! - `export`: binary, file, interchange and MIDI input/output
//! - `song`: song-level metadata, lyrics, page setup, statistics
//! - `tracks`: track creation, properties, listings, transposition
//! - `measures`: measure headers and their signatures
//! - `notes`: note entry and lookup
//! - `chords`: chord diagrams on beats
//! - `structure`: repeats, sections, navigation signs
//!
//! Mutations return [`crate::error::Result`] and fail with a state error
//! when no song is loaded. Queries on an empty editor return an empty
//! result instead.

pub mod helpers;
pub mod types;

mod chords;
mod export;
mod measures;
mod notes;
mod song;
mod structure;
mod tracks;

pub use types::*;

use crate::error::{Result, StateError};
use crate::models::Song;

#[derive(Debug, Default)]
pub struct TabEditor {
    song: Option<Song>,
}

impl TabEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(song: Song) -> Self {
        Self { song: Some(song) }
    }

    pub fn is_loaded(&self) -> bool {
        self.song.is_some()
    }

    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    /// Replace the loaded song, returning the previous one
    pub fn set_song(&mut self, song: Song) -> Option<Song> {
        self.song.replace(song)
    }

    pub fn take_song(&mut self) -> Option<Song> {
        self.song.take()
    }

    pub(crate) fn loaded(&self) -> Result<&Song> {
        self.song.as_ref().ok_or_else(|| StateError.into())
    }

    pub(crate) fn loaded_mut(&mut self) -> Result<&mut Song> {
        self.song.as_mut().ok_or_else(|| StateError.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_editor_state() {
        let mut editor = TabEditor::new();
        assert!(!editor.is_loaded());
        assert!(editor.loaded().unwrap_err().is_state());
        assert!(editor.loaded_mut().unwrap_err().is_state());
    }

    #[test]
    fn test_set_and_take_song() {
        let mut editor = TabEditor::new();
        assert!(editor.set_song(Song::new()).is_none());
        assert!(editor.is_loaded());
        assert!(editor.take_song().is_some());
        assert!(!editor.is_loaded());
    }
}
