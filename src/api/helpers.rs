//! Shared validation helpers for the operation modules
//!
//! Every mutating operation validates its arguments with these before it
//! touches the song, so a failed call leaves the model unchanged.

use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::converters::gp5::{storable_text, TEXT_FIELD};
use crate::error::{Result, ValidationError};
use crate::models::{Beat, Measure, Song, Track, Voice, VOICES_PER_MEASURE};

/// Text as a length-byte string field of the file stores it
pub fn field_text(text: &str) -> String {
    storable_text(text, TEXT_FIELD)
}

/// Validate that an index is within bounds
pub fn validate_index(index: usize, len: usize, context: &str) -> Result<()> {
    if index >= len {
        return Err(ValidationError::new(if len == 0 {
            format!("{} index {} out of bounds (there are none)", context, index)
        } else {
            format!("{} index {} out of bounds (max: {})", context, index, len - 1)
        })
        .into());
    }
    Ok(())
}

/// Validate that a value lies in an inclusive range
pub fn validate_range<T>(value: T, range: RangeInclusive<T>, what: &str) -> Result<()>
where
    T: PartialOrd + Display,
{
    if !range.contains(&value) {
        return Err(ValidationError::new(format!(
            "{} {} out of range ({}..={})",
            what,
            value,
            range.start(),
            range.end()
        ))
        .into());
    }
    Ok(())
}

pub fn validate_duration(value: u8) -> Result<()> {
    if !crate::models::Duration::is_valid_value(u32::from(value)) {
        return Err(ValidationError::new(format!(
            "duration {} is not one of 1, 2, 4, 8, 16, 32, 64",
            value
        ))
        .into());
    }
    Ok(())
}

// ============================================================================
// Checked lookups
// ============================================================================

pub fn track_at(song: &Song, index: usize) -> Result<&Track> {
    validate_index(index, song.tracks.len(), "track")?;
    Ok(&song.tracks[index])
}

pub fn measure_at(song: &Song, track: usize, measure: usize) -> Result<&Measure> {
    let track = track_at(song, track)?;
    validate_index(measure, track.measures.len(), "measure")?;
    Ok(&track.measures[measure])
}

pub fn voice_at(song: &Song, track: usize, measure: usize, voice: usize) -> Result<&Voice> {
    let measure = measure_at(song, track, measure)?;
    validate_index(voice, measure.voices.len().min(VOICES_PER_MEASURE), "voice")?;
    Ok(&measure.voices[voice])
}

pub fn beat_at(song: &Song, track: usize, measure: usize, voice: usize, beat: usize) -> Result<&Beat> {
    let voice = voice_at(song, track, measure, voice)?;
    validate_index(beat, voice.beats.len(), "beat")?;
    Ok(&voice.beats[beat])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_index() {
        assert!(validate_index(0, 1, "track").is_ok());
        let err = validate_index(1, 1, "track").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "validation failed: track index 1 out of bounds (max: 0)"
        );
        assert!(validate_index(0, 0, "measure").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(127, 0..=127, "instrument").is_ok());
        assert!(validate_range(128, 0..=127, "instrument").is_err());
        assert!(validate_range(-8, -7..=7, "key").is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(16).is_ok());
        assert!(validate_duration(3).is_err());
        assert!(validate_duration(0).is_err());
    }
}
