//! Track operations

use super::helpers::{track_at, validate_index, validate_range};
use super::types::{StringInfo, TrackInfo, TrackNote, TrackProperties, TrackSummary};
use super::TabEditor;
use crate::converters::gp5::{storable_channel_value, storable_text, TRACK_NAME_FIELD};
use crate::error::Result;
use crate::models::Track;
use crate::renderers::tab::render_track_tab;
use crate::utils::pitch_utils::tuning_names;

impl TabEditor {
    /// Append a standard-tuned guitar track on the next free channel pair
    pub fn add_track(&mut self, name: &str) -> Result<usize> {
        let song = self.loaded_mut()?;
        let mut track = Track::new(storable_text(name, TRACK_NAME_FIELD));
        let (channel, effect_channel) = song.next_free_channel(false);
        track.channel.channel = channel;
        track.channel.effect_channel = effect_channel;
        let index = song.add_track(track);
        log::debug!("added track '{}' at {} on channel {}", name, index, channel);
        Ok(index)
    }

    /// Update name, program, volume and pan; values are checked before any is applied
    ///
    /// Volume and pan snap to the mixer steps the file format stores, and the
    /// name is cut to the format's track name field.
    pub fn set_track_properties(&mut self, index: usize, properties: TrackProperties) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_index(index, song.tracks.len(), "track")?;
        if let Some(instrument) = properties.instrument {
            validate_range(instrument, 0..=127, "instrument")?;
        }
        if let Some(volume) = properties.volume {
            validate_range(volume, 0..=127, "volume")?;
        }
        if let Some(pan) = properties.pan {
            validate_range(pan, 0..=127, "pan")?;
        }

        let track = &mut song.tracks[index];
        if let Some(name) = properties.name {
            track.name = storable_text(&name, TRACK_NAME_FIELD);
        }
        if let Some(instrument) = properties.instrument {
            track.channel.instrument = instrument;
        }
        if let Some(volume) = properties.volume {
            track.channel.volume = storable_channel_value(volume as u8);
        }
        if let Some(pan) = properties.pan {
            track.channel.balance = storable_channel_value(pan as u8);
        }
        Ok(())
    }

    /// Melodic tracks with their tuning; percussion tracks are left out
    pub fn get_tracks(&self) -> Vec<TrackSummary> {
        let Some(song) = self.song() else {
            return Vec::new();
        };
        song.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_percussion)
            .map(|(index, track)| TrackSummary {
                name: track.name.clone(),
                index,
                strings: track
                    .strings
                    .iter()
                    .map(|s| StringInfo {
                        number: s.number,
                        value: s.value,
                    })
                    .collect(),
                instrument: track.channel.instrument,
                is_percussion: track.is_percussion,
            })
            .collect()
    }

    /// Every note of a track in measure, voice, beat order
    pub fn get_track_notes(&self, index: usize) -> Result<Vec<TrackNote>> {
        let Some(song) = self.song() else {
            return Ok(Vec::new());
        };
        let track = track_at(song, index)?;
        let mut notes = Vec::new();
        for (m, measure) in track.measures.iter().enumerate() {
            for (v, voice) in measure.voices.iter().enumerate() {
                for (b, beat) in voice.beats.iter().enumerate() {
                    for note in &beat.notes {
                        notes.push(TrackNote {
                            measure: m,
                            voice: v,
                            beat: b,
                            string: note.string,
                            value: note.fret,
                            duration: beat.duration.value,
                            is_dotted: beat.duration.dotted,
                            is_rest: beat.is_rest(),
                            has_tie: note.is_tied(),
                        });
                    }
                }
            }
        }
        Ok(notes)
    }

    pub fn get_track_info(&self, index: usize) -> Result<Option<TrackInfo>> {
        let Some(song) = self.song() else {
            return Ok(None);
        };
        let track = track_at(song, index)?;
        Ok(Some(TrackInfo {
            name: track.name.clone(),
            instrument: track.channel.instrument,
            channel: track.channel.channel,
            volume: track.channel.volume,
            pan: track.channel.balance,
            is_solo: track.is_solo,
            is_mute: track.is_mute,
            is_percussion: track.is_percussion,
            string_count: track.strings.len(),
            tuning: tuning_names(&track.tuning()),
            measure_count: track.measures.len(),
        }))
    }

    /// ASCII tablature of a track; empty when nothing is loaded
    pub fn get_track_tab(&self, index: usize) -> Result<String> {
        let Some(song) = self.song() else {
            return Ok(String::new());
        };
        Ok(render_track_tab(track_at(song, index)?))
    }

    /// Shift every non-tied note by `semitones`, returning how many moved
    ///
    /// Notes that would land below fret 0 or above the highest fret stay put.
    pub fn transpose_track(&mut self, index: usize, semitones: i32) -> Result<usize> {
        let song = self.loaded_mut()?;
        validate_index(index, song.tracks.len(), "track")?;
        let moved = song.tracks[index].transpose(semitones);
        log::debug!(
            "transposed track {} by {} semitone(s): {} note(s) moved",
            index,
            semitones,
            moved
        );
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BeatRef;

    fn editor() -> TabEditor {
        let mut editor = TabEditor::new();
        editor.create_song("Tracks", "");
        editor
    }

    #[test]
    fn test_add_track_pads_measures_and_picks_channels() {
        let mut editor = editor();
        editor.add_measure_header().unwrap();
        let index = editor.add_track("Bass").unwrap();
        assert_eq!(index, 1);
        let song = editor.song().unwrap();
        assert!(song.is_consistent());
        assert_eq!(song.tracks[1].measures.len(), 2);
        assert_ne!(song.tracks[0].channel.channel, song.tracks[1].channel.channel);
    }

    #[test]
    fn test_add_track_without_song() {
        let mut editor = TabEditor::new();
        assert!(editor.add_track("Lead").unwrap_err().is_state());
    }

    #[test]
    fn test_set_track_properties_is_all_or_nothing() {
        let mut editor = editor();
        let err = editor
            .set_track_properties(
                0,
                TrackProperties {
                    name: Some("Renamed".into()),
                    instrument: Some(128),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(editor.song().unwrap().tracks[0].name, "Guitar");

        editor
            .set_track_properties(
                0,
                TrackProperties {
                    name: Some("Lead".into()),
                    instrument: Some(30),
                    volume: Some(100),
                    pan: Some(0),
                },
            )
            .unwrap();
        let info = editor.get_track_info(0).unwrap().unwrap();
        assert_eq!(info.name, "Lead");
        assert_eq!(info.instrument, 30);
        // stored in mixer steps of 8
        assert_eq!(info.volume, 96);
        assert_eq!(info.pan, 0);
        assert_eq!(info.tuning[0], "E4");
    }

    #[test]
    fn test_track_values_snap_to_storable() {
        let mut editor = editor();
        let long_name = format!("{}\u{266b}", "n".repeat(45));
        let index = editor.add_track(&long_name).unwrap();
        assert_eq!(editor.song().unwrap().tracks[index].name, "n".repeat(40));

        editor
            .set_track_properties(
                0,
                TrackProperties {
                    name: Some("Gr\u{fc}n \u{266b}".into()),
                    pan: Some(70),
                    volume: Some(127),
                    ..Default::default()
                },
            )
            .unwrap();
        let info = editor.get_track_info(0).unwrap().unwrap();
        assert_eq!(info.name, "Gr\u{fc}n ?");
        assert_eq!(info.pan, 64);
        assert_eq!(info.volume, 120);
    }

    #[test]
    fn test_get_tracks_skips_percussion() {
        let mut editor = editor();
        let drums = editor.add_track("Drums").unwrap();
        let mut song = editor.take_song().unwrap();
        song.tracks[drums].is_percussion = true;
        editor.set_song(song);
        let tracks = editor.get_tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Guitar");
        assert_eq!(tracks[0].strings.len(), 6);
    }

    #[test]
    fn test_transpose_skips_ties_and_negative_frets() {
        let mut editor = editor();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 2, 4).unwrap();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 2, 5, 4).unwrap();
        editor
            .add_note_with_effects(
                BeatRef::new(0, 0, 0, 1),
                1,
                2,
                4,
                &crate::api::NoteEffects {
                    tied: true,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(editor.transpose_track(0, -3).unwrap(), 1);
        let notes = editor.get_track_notes(0).unwrap();
        assert_eq!(notes[0].value, 2);
        assert_eq!(notes[1].value, 2);
        assert_eq!(notes[2].value, 2);

        assert!(editor.transpose_track(1, 2).unwrap_err().is_validation());
    }

    #[test]
    fn test_reads_on_empty_editor() {
        let editor = TabEditor::new();
        assert!(editor.get_tracks().is_empty());
        assert!(editor.get_track_notes(0).unwrap().is_empty());
        assert!(editor.get_track_info(0).unwrap().is_none());
        assert_eq!(editor.get_track_tab(0).unwrap(), "");
    }
}
