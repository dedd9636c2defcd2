//! Chord diagrams attached to beats of the first voice

use super::helpers::{beat_at, track_at};
use super::TabEditor;
use crate::converters::gp5::{storable_text, CHORD_NAME_FIELD};
use crate::converters::interchange::{chord_from_tree, chord_to_tree, ChordTree};
use crate::error::{invalid, Result};
use crate::models::MAX_BARRES;

impl TabEditor {
    /// Attach a chord diagram to an existing beat, replacing any chord there
    pub fn add_chord(&mut self, track: usize, measure: usize, beat: usize, chord: &ChordTree) -> Result<()> {
        let song = self.loaded_mut()?;
        beat_at(song, track, measure, 0, beat)?;
        if chord.root >= 12 {
            return invalid(format!("chord root {} is not a pitch class (0..=11)", chord.root));
        }
        if chord.barres.len() > MAX_BARRES {
            return invalid(format!(
                "chord has {} barres, at most {} allowed",
                chord.barres.len(),
                MAX_BARRES
            ));
        }
        let string_count = track_at(song, track)?.strings.len();

        let mut chord = chord_from_tree(chord, string_count);
        chord.name = storable_text(&chord.name, CHORD_NAME_FIELD);
        log::debug!(
            "chord '{}' on track {} measure {} beat {}",
            chord.display_name(),
            track,
            measure,
            beat
        );
        song.tracks[track].measures[measure].voices[0].beats[beat].chord = Some(chord);
        Ok(())
    }

    pub fn get_chord(&self, track: usize, measure: usize, beat: usize) -> Result<Option<ChordTree>> {
        let Some(song) = self.song() else {
            return Ok(None);
        };
        let beat = beat_at(song, track, measure, 0, beat)?;
        Ok(beat.chord.as_ref().map(chord_to_tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BeatRef;
    use crate::converters::interchange::BarreTree;
    use crate::models::ChordType;

    fn editor_with_beat() -> TabEditor {
        let mut editor = TabEditor::new();
        editor.create_song("Chords", "");
        editor.add_note(BeatRef::new(0, 0, 0, 0), 2, 1, 4).unwrap();
        editor
    }

    fn a_minor() -> ChordTree {
        let mut chord: ChordTree = serde_json::from_value(serde_json::json!({
            "name": "Am",
            "root": 9,
            "type": 4,
            "strings": [0, 1, 2, 2, 0, -1]
        }))
        .unwrap();
        chord.barres.push(BarreTree {
            fret: 1,
            start: 1,
            end: 2,
        });
        chord
    }

    #[test]
    fn test_add_and_get_chord() {
        let mut editor = editor_with_beat();
        editor.add_chord(0, 0, 0, &a_minor()).unwrap();

        let chord = editor.get_chord(0, 0, 0).unwrap().unwrap();
        assert_eq!(chord.name, "Am");
        assert_eq!(chord.root, 9);
        assert_eq!(chord.kind, ChordType::Minor);
        assert_eq!(chord.strings, vec![0, 1, 2, 2, 0, -1]);
        assert_eq!(chord.barres.len(), 1);
    }

    #[test]
    fn test_chord_validation() {
        let mut editor = editor_with_beat();
        let mut chord = a_minor();
        chord.root = 12;
        assert!(editor.add_chord(0, 0, 0, &chord).unwrap_err().is_validation());

        let mut chord = a_minor();
        chord.barres = vec![chord.barres[0]; 6];
        assert!(editor.add_chord(0, 0, 0, &chord).unwrap_err().is_validation());

        assert!(editor.add_chord(0, 0, 1, &a_minor()).unwrap_err().is_validation());
        assert!(editor.get_chord(0, 0, 0).unwrap().is_none());
    }
}
