//! Small shared helpers

pub mod pitch_utils;

pub use pitch_utils::*;
