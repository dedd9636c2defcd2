//! Note entry and lookup

use super::helpers::{beat_at, measure_at, track_at, validate_duration, validate_index, validate_range};
use super::types::{BeatRef, NoteEffects, NoteInfo};
use super::TabEditor;
use crate::converters::gp5::storable_velocity;
use crate::error::{invalid, Result};
use crate::models::{
    slide, Beat, Bend, Duration, Harmonic, Note, NoteType, MAX_FRET, VOICES_PER_MEASURE,
};

impl TabEditor {
    /// Put a note on `string` at `fret` in the addressed beat
    ///
    /// A beat index one past the last beat appends a new beat of `duration`;
    /// an existing beat takes the new duration value. A note already on that
    /// string is replaced.
    pub fn add_note(&mut self, at: BeatRef, string: u8, fret: u8, duration: u8) -> Result<()> {
        self.place_note(at, duration, Note::new(string, fret))
    }

    /// Like [`TabEditor::add_note`] with effects applied
    ///
    /// The velocity snaps to the nearest dynamic level the file format stores.
    pub fn add_note_with_effects(
        &mut self,
        at: BeatRef,
        string: u8,
        fret: u8,
        duration: u8,
        effects: &NoteEffects,
    ) -> Result<()> {
        if let Some(velocity) = effects.velocity {
            validate_range(velocity, 1..=127, "velocity")?;
        }
        let mut note = Note::new(string, fret);
        if let Some(velocity) = effects.velocity {
            note.velocity = storable_velocity(velocity);
        }
        note.kind = if effects.tied {
            NoteType::Tie
        } else if effects.dead {
            NoteType::Dead
        } else {
            NoteType::Normal
        };

        let effect = &mut note.effect;
        if effects.bend {
            effect.bend = Some(Bend::full_step());
        }
        if effects.harmonic {
            effect.harmonic = Some(Harmonic::Natural);
        }
        if effects.slide {
            effect.slide = slide::SHIFT_SLIDE_TO;
        }
        effect.vibrato = effects.vibrato;
        effect.ghost = effects.ghost;
        effect.hammer = effects.hammer || effects.pull_off;
        effect.palm_mute = effects.palm_mute;
        effect.let_ring = effects.let_ring;
        effect.staccato = effects.staccato;
        effect.accentuated = effects.accentuated;

        self.place_note(at, duration, note)
    }

    /// First note of a beat, by string order
    pub fn get_note_info(
        &self,
        track: usize,
        measure: usize,
        voice: usize,
        beat: usize,
    ) -> Result<Option<NoteInfo>> {
        let Some(song) = self.song() else {
            return Ok(None);
        };
        let beat = beat_at(song, track, measure, voice, beat)?;
        Ok(beat.notes.first().map(|note| NoteInfo {
            value: note.fret,
            string: note.string,
            velocity: note.velocity,
            duration: beat.duration.value,
            is_dotted: beat.duration.dotted,
            is_tied: note.is_tied(),
            is_ghost: note.effect.ghost,
            is_dead: note.is_dead(),
            is_hammer_on: note.effect.hammer,
            is_slide: note.effect.is_slide(),
            is_vibrato: note.effect.vibrato,
            is_bend: note.effect.bend.is_some(),
            is_harmonic: note.effect.harmonic.is_some(),
            is_palm_mute: note.effect.palm_mute,
            is_let_ring: note.effect.let_ring,
        }))
    }

    fn place_note(&mut self, at: BeatRef, duration: u8, note: Note) -> Result<()> {
        let song = self.loaded_mut()?;
        let track = track_at(song, at.track)?;
        if track.string(note.string).is_none() {
            return invalid(format!(
                "string {} does not exist on track '{}' ({} strings)",
                note.string,
                track.name,
                track.strings.len()
            ));
        }
        let measure = measure_at(song, at.track, at.measure)?;
        validate_index(at.voice, measure.voices.len().min(VOICES_PER_MEASURE), "voice")?;
        validate_range(note.fret, 0..=MAX_FRET, "fret")?;
        validate_duration(duration)?;
        let beat_count = measure.voices[at.voice].beats.len();
        if at.beat > beat_count {
            return invalid(format!(
                "beat index {} out of bounds (a new beat goes at {})",
                at.beat, beat_count
            ));
        }

        let beats = &mut song.tracks[at.track].measures[at.measure].voices[at.voice].beats;
        if at.beat == beats.len() {
            beats.push(Beat::new(Duration::new(duration)));
        } else {
            beats[at.beat].duration.value = duration;
        }
        log::trace!(
            "note on string {} fret {} at track {} measure {} voice {} beat {}",
            note.string,
            note.fret,
            at.track,
            at.measure,
            at.voice,
            at.beat
        );
        beats[at.beat].set_note(note);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> TabEditor {
        let mut editor = TabEditor::new();
        editor.create_song("Notes", "");
        editor
    }

    #[test]
    fn test_add_note_appends_beats() {
        let mut editor = editor();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 3, 4).unwrap();
        editor.add_note(BeatRef::new(0, 0, 0, 1), 2, 5, 8).unwrap();
        let notes = editor.get_track_notes(0).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!((notes[0].string, notes[0].value, notes[0].duration), (1, 3, 4));
        assert_eq!((notes[1].beat, notes[1].duration), (1, 8));
    }

    #[test]
    fn test_add_note_replaces_same_string() {
        let mut editor = editor();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 2, 3, 4).unwrap();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 2, 7, 4).unwrap();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 0, 4).unwrap();
        let beat = &editor.song().unwrap().tracks[0].measures[0].voices[0].beats[0];
        assert_eq!(beat.notes.len(), 2);
        assert_eq!(beat.notes[0].string, 1);
        assert_eq!(beat.notes[1].fret, 7);
    }

    #[test]
    fn test_add_note_validation_leaves_song_alone() {
        let mut editor = editor();
        let before = editor.song().unwrap().clone();
        let bad = [
            (BeatRef::new(1, 0, 0, 0), 1, 0, 4),
            (BeatRef::new(0, 1, 0, 0), 1, 0, 4),
            (BeatRef::new(0, 0, 2, 0), 1, 0, 4),
            (BeatRef::new(0, 0, 0, 1), 1, 0, 4),
            (BeatRef::new(0, 0, 0, 0), 7, 0, 4),
            (BeatRef::new(0, 0, 0, 0), 0, 0, 4),
            (BeatRef::new(0, 0, 0, 0), 1, 100, 4),
            (BeatRef::new(0, 0, 0, 0), 1, 0, 5),
        ];
        for (at, string, fret, duration) in bad {
            let err = editor.add_note(at, string, fret, duration).unwrap_err();
            assert!(err.is_validation(), "{:?} should be rejected", at);
        }
        assert_eq!(editor.song().unwrap(), &before);
    }

    #[test]
    fn test_add_note_without_song() {
        let mut editor = TabEditor::new();
        let err = editor.add_note(BeatRef::default(), 1, 0, 4).unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn test_effects_and_note_info() {
        let mut editor = editor();
        let effects = NoteEffects {
            bend: true,
            hammer: true,
            slide: true,
            palm_mute: true,
            velocity: Some(111),
            ..Default::default()
        };
        editor
            .add_note_with_effects(BeatRef::new(0, 0, 0, 0), 3, 5, 8, &effects)
            .unwrap();

        let info = editor.get_note_info(0, 0, 0, 0).unwrap().unwrap();
        assert_eq!(info.value, 5);
        assert_eq!(info.string, 3);
        assert_eq!(info.velocity, 111);
        assert_eq!(info.duration, 8);
        assert!(info.is_bend && info.is_hammer_on && info.is_slide && info.is_palm_mute);
        assert!(!info.is_tied && !info.is_harmonic);

        let dead = NoteEffects {
            dead: true,
            ..Default::default()
        };
        editor
            .add_note_with_effects(BeatRef::new(0, 0, 1, 0), 6, 0, 4, &dead)
            .unwrap();
        assert!(editor.get_note_info(0, 0, 1, 0).unwrap().unwrap().is_dead);

        let loud = NoteEffects {
            velocity: Some(0),
            ..Default::default()
        };
        assert!(editor
            .add_note_with_effects(BeatRef::new(0, 0, 0, 1), 1, 0, 4, &loud)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_velocity_snaps_and_pull_off_sets_legato() {
        let mut editor = editor();
        let effects = NoteEffects {
            pull_off: true,
            velocity: Some(100),
            ..Default::default()
        };
        editor
            .add_note_with_effects(BeatRef::new(0, 0, 0, 0), 2, 7, 4, &effects)
            .unwrap();
        let info = editor.get_note_info(0, 0, 0, 0).unwrap().unwrap();
        assert_eq!(info.velocity, 95);
        assert!(info.is_hammer_on);
    }

    #[test]
    fn test_note_info_on_empty_beat_list() {
        let editor = editor();
        assert!(editor.get_note_info(0, 0, 0, 0).unwrap_err().is_validation());
        assert!(TabEditor::new().get_note_info(0, 0, 0, 0).unwrap().is_none());
    }
}
