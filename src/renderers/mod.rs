//! Output renderers
//!
//! Converts a song into formats meant for playback or reading rather than
//! round-tripping: timed MIDI events and ASCII tablature.

pub mod midi;
pub mod tab;

pub use midi::{project_events, song_to_smf, NoteEvent, TrackEvents};
pub use tab::render_track_tab;
