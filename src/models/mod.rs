//! Models module for the tablature document
//!
//! This module contains the entity graph of a multi-track tablature score:
//! song, measure headers, tracks, measures, voices, beats, notes, chords and
//! their effects. Ownership is strictly top-down (a `Song` owns everything);
//! cross-references such as measure → header or header → repeat group are
//! expressed as indices so structural edits never leave dangling pointers.

pub mod beat;
pub mod chord;
pub mod measure;
pub mod note;
pub mod repeat;
pub mod song;
pub mod track;

// Re-export commonly used types
pub use beat::*;
pub use chord::*;
pub use measure::*;
pub use note::*;
pub use repeat::{RepeatGroup, RepeatGroupId};
pub use song::*;
pub use track::*;
