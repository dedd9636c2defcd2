//! Song to MIDI
//!
//! `converter` flattens a song into timed note events per melodic track;
//! `write` serializes those events as a Standard MIDI File.
//!
//! # Usage
//! ```rust,ignore
//! use gp_editor::renderers::midi::{project_events, song_to_smf, DEFAULT_TPQ};
//!
//! let tracks = project_events(&song, DEFAULT_TPQ);
//! let bytes = song_to_smf(&song, DEFAULT_TPQ)?;
//! ```

pub mod converter;
pub mod defaults;
pub mod write;

pub use converter::{measure_start_ticks, project_events, NoteEvent, TrackEvents};
pub use defaults::DEFAULT_TPQ;
pub use write::{song_to_smf, write_smf};
