//! Guitar Pro tablature editor core
//!
//! A document model for multi-track fretted-instrument scores, with codecs
//! for the Guitar Pro 5 binary format and a JSON/YAML interchange tree, a
//! note-event projection for MIDI, and plain-text tablature rendering.
//!
//! [`TabEditor`] is the operation surface: it owns at most one [`Song`] and
//! exposes every edit and query on it.

pub mod api;
pub mod converters;
pub mod error;
pub mod models;
pub mod renderers;
pub mod utils;

// Re-export commonly used types
pub use api::{BeatRef, NoteEffects, TabEditor};
pub use error::{FormatError, InterchangeError, Result, StateError, TabError, ValidationError};
pub use models::{Beat, Measure, MeasureHeader, Note, Song, Track};
pub use renderers::midi::{NoteEvent, TrackEvents};
