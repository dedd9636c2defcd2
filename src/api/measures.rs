//! Measure header operations
//!
//! Setting a signature on a measure past the end grows the header list,
//! adding an empty measure to every track for each new header.

use super::helpers::{measure_at, validate_duration, validate_range};
use super::song::TEMPO_RANGE;
use super::types::MeasureInfo;
use super::TabEditor;
use crate::error::Result;
use crate::models::{KeySignature, TimeSignature};

impl TabEditor {
    /// Append a header (and a measure on every track), returning its index
    pub fn add_measure_header(&mut self) -> Result<usize> {
        let song = self.loaded_mut()?;
        let index = song.measure_headers.len();
        song.ensure_measure(index)?;
        Ok(index)
    }

    pub fn set_time_signature(&mut self, measure: usize, numerator: u8, denominator: u8) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_range(numerator, 1..=32, "time signature numerator")?;
        validate_duration(denominator)?;
        song.ensure_measure(measure)?;
        let beams = song.measure_headers[measure].time_signature.beams;
        song.measure_headers[measure].time_signature = TimeSignature {
            beams,
            ..TimeSignature::new(numerator, denominator)
        };
        Ok(())
    }

    /// `key` counts sharps (positive) or flats (negative)
    pub fn set_key_signature(&mut self, measure: usize, key: i8, minor: bool) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_range(key, -7..=7, "key signature")?;
        song.ensure_measure(measure)?;
        song.measure_headers[measure].key_signature = KeySignature { key, minor };
        Ok(())
    }

    /// Set the song tempo
    ///
    /// Tempo is a single song-wide value: the measure index only grows the
    /// header list, it does not scope the change.
    pub fn set_tempo(&mut self, measure: usize, tempo: i32) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_range(tempo, TEMPO_RANGE, "tempo")?;
        song.ensure_measure(measure)?;
        song.tempo = tempo;
        Ok(())
    }

    pub fn get_measure_info(&self, track: usize, measure: usize) -> Result<Option<MeasureInfo>> {
        let Some(song) = self.song() else {
            return Ok(None);
        };
        let content = measure_at(song, track, measure)?;
        let header = &song.measure_headers[measure];
        Ok(Some(MeasureInfo {
            index: measure,
            time_signature: format!(
                "{}/{}",
                header.time_signature.numerator, header.time_signature.denominator
            ),
            key_signature: header.key_signature.name(),
            repeat_open: header.repeat_open,
            repeat_close: header.repeat_close,
            alternative_endings: header.alternative_endings(),
            marker: header.marker.as_ref().map(|m| m.title.clone()),
            double_bar: header.double_bar,
            voice_count: content.voices.iter().filter(|v| !v.is_empty()).count(),
            beat_count: content.beats().count(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_MEASURE_HEADERS;

    fn editor() -> TabEditor {
        let mut editor = TabEditor::new();
        editor.create_song("Measures", "");
        editor
    }

    #[test]
    fn test_add_measure_header() {
        let mut editor = editor();
        assert_eq!(editor.add_measure_header().unwrap(), 1);
        assert_eq!(editor.add_measure_header().unwrap(), 2);
        let song = editor.song().unwrap();
        assert_eq!(song.measure_count(), 3);
        assert!(song.is_consistent());
    }

    #[test]
    fn test_set_time_signature_grows_headers() {
        let mut editor = editor();
        editor.set_time_signature(3, 6, 8).unwrap();
        let song = editor.song().unwrap();
        assert_eq!(song.measure_count(), 4);
        assert!(song.is_consistent());
        assert_eq!(song.measure_headers[3].time_signature.numerator, 6);
        assert_eq!(song.measure_headers[3].time_signature.denominator, 8);
        assert_eq!(song.measure_headers[2].time_signature.numerator, 4);

        let info = editor.get_measure_info(0, 3).unwrap().unwrap();
        assert_eq!(info.time_signature, "6/8");
        assert_eq!(info.beat_count, 0);
    }

    #[test]
    fn test_set_time_signature_rejects_bad_values() {
        let mut editor = editor();
        assert!(editor.set_time_signature(0, 0, 4).unwrap_err().is_validation());
        assert!(editor.set_time_signature(0, 4, 3).unwrap_err().is_validation());
        assert!(editor.set_time_signature(5, 33, 4).unwrap_err().is_validation());
        assert_eq!(editor.song().unwrap().measure_count(), 1);
    }

    #[test]
    fn test_growth_cap() {
        let mut editor = editor();
        let err = editor.set_key_signature(MAX_MEASURE_HEADERS, 1, false).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(editor.song().unwrap().measure_count(), 1);
    }

    #[test]
    fn test_key_signature() {
        let mut editor = editor();
        editor.set_key_signature(0, -3, true).unwrap();
        let info = editor.get_measure_info(0, 0).unwrap().unwrap();
        assert_eq!(info.key_signature, "C minor");
        assert!(editor.set_key_signature(0, 8, false).is_err());
    }

    #[test]
    fn test_set_tempo_is_global() {
        let mut editor = editor();
        editor.set_tempo(2, 140).unwrap();
        let song = editor.song().unwrap();
        assert_eq!(song.tempo, 140);
        assert_eq!(song.measure_count(), 3);
        assert!(editor.set_tempo(0, 0).unwrap_err().is_validation());
    }

    #[test]
    fn test_measure_info_bounds() {
        let editor = editor();
        assert!(editor.get_measure_info(0, 1).unwrap_err().is_validation());
        assert!(editor.get_measure_info(1, 0).unwrap_err().is_validation());
        assert!(TabEditor::new().get_measure_info(0, 0).unwrap().is_none());
    }
}
