//! Tracks: tuning, MIDI channel and the per-track measure list

use super::measure::{Color, Measure};
use super::note::Note;

/// Standard six-string guitar tuning, string 1 (high E) first
pub const STANDARD_TUNING: [u8; 6] = [64, 59, 55, 50, 45, 40];

/// Most strings a track can have in the binary format
pub const MAX_STRINGS: usize = 7;

/// Acoustic guitar (nylon), General MIDI program 24
pub const DEFAULT_INSTRUMENT: i32 = 24;

/// MIDI channel 10, reserved for percussion
pub const PERCUSSION_CHANNEL: u8 = 9;

/// One tuned string; `number` is 1-based, counting from the highest string
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuitarString {
    pub number: u8,
    /// Open-string MIDI pitch
    pub value: u8,
}

/// Mixer settings of the channel a track plays on
///
/// Volume, balance and the effect sends use the 0..=127 MIDI scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiChannel {
    pub channel: u8,
    pub effect_channel: u8,
    pub instrument: i32,
    pub volume: u8,
    pub balance: u8,
    pub chorus: u8,
    pub reverb: u8,
    pub phaser: u8,
    pub tremolo: u8,
    pub bank: u8,
}

impl MidiChannel {
    pub fn new(channel: u8, effect_channel: u8) -> Self {
        Self {
            channel,
            effect_channel,
            instrument: DEFAULT_INSTRUMENT,
            volume: 104,
            balance: 64,
            chorus: 0,
            reverb: 0,
            phaser: 0,
            tremolo: 0,
            bank: 0,
        }
    }

    pub fn is_percussion(&self) -> bool {
        self.channel % 16 == PERCUSSION_CHANNEL
    }
}

impl Default for MidiChannel {
    fn default() -> Self {
        MidiChannel::new(0, 1)
    }
}

/// Realistic Sound Engine instrument reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RseInstrument {
    pub instrument: i32,
    pub unknown: i32,
    pub sound_bank: i32,
    pub effect_number: i32,
    pub effect: String,
    pub effect_category: String,
}

impl Default for RseInstrument {
    fn default() -> Self {
        Self {
            instrument: -1,
            unknown: -1,
            sound_bank: -1,
            effect_number: -1,
            effect: String::new(),
            effect_category: String::new(),
        }
    }
}

/// Track-level Realistic Sound Engine settings
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TrackRse {
    pub humanize: u8,
    pub auto_accentuation: u8,
    pub instrument: RseInstrument,
    /// Low, mid, high and gain knobs
    pub equalizer: [i8; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub name: String,
    /// Sorted by number; numbers are unique, 1-based and contiguous
    pub strings: Vec<GuitarString>,
    pub channel: MidiChannel,
    pub port: i32,
    pub fret_count: i32,
    /// Capo position
    pub offset: i32,
    pub color: Color,

    pub is_percussion: bool,
    pub is_12_string: bool,
    pub is_banjo: bool,
    pub is_visible: bool,
    pub is_solo: bool,
    pub is_mute: bool,
    pub use_rse: bool,
    pub indicate_tuning: bool,

    /// Raw display flags (tablature, notation, diagram placement)
    pub display_flags: u16,
    pub rse: TrackRse,

    /// One per song measure header, same order
    pub measures: Vec<Measure>,
}

impl Track {
    /// A six-string guitar track in standard tuning with no measures yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strings: standard_strings(),
            channel: MidiChannel::default(),
            port: 1,
            fret_count: 24,
            offset: 0,
            color: Color::RED,
            is_percussion: false,
            is_12_string: false,
            is_banjo: false,
            is_visible: true,
            is_solo: false,
            is_mute: false,
            use_rse: false,
            indicate_tuning: false,
            display_flags: 0x0043,
            rse: TrackRse::default(),
            measures: Vec::new(),
        }
    }

    /// Look a string up by its number (not its position)
    pub fn string(&self, number: u8) -> Option<&GuitarString> {
        self.strings.iter().find(|s| s.number == number)
    }

    /// Sounding pitch of a fretted position: open string + fret
    pub fn pitch_at(&self, string: u8, fret: u8) -> Option<i32> {
        self.string(string)
            .map(|s| i32::from(s.value) + i32::from(fret))
    }

    /// Sounding pitch of a note, ignoring tie semantics
    pub fn pitch_of(&self, note: &Note) -> Option<i32> {
        self.pitch_at(note.string, note.fret)
    }

    /// Shift every non-tied note by `semitones`
    ///
    /// Notes whose fret would become negative, or exceed the format maximum,
    /// are left alone. Returns how many notes moved.
    pub fn transpose(&mut self, semitones: i32) -> usize {
        let mut moved = 0;
        let strings = self.strings.clone();
        for measure in &mut self.measures {
            for voice in &mut measure.voices {
                for beat in &mut voice.beats {
                    for note in &mut beat.notes {
                        if note.is_tied() {
                            continue;
                        }
                        let Some(open) = strings.iter().find(|s| s.number == note.string) else {
                            log::warn!("note on missing string {} left untransposed", note.string);
                            continue;
                        };
                        let open = i32::from(open.value);
                        let new_fret = (open + i32::from(note.fret) + semitones) - open;
                        if (0..=i32::from(super::note::MAX_FRET)).contains(&new_fret) {
                            note.fret = new_fret as u8;
                            moved += 1;
                        }
                    }
                }
            }
        }
        moved
    }

    /// Replace the tuning; values are listed from string 1 down
    pub fn set_tuning(&mut self, values: &[u8]) {
        self.strings = values
            .iter()
            .enumerate()
            .map(|(i, &value)| GuitarString {
                number: (i + 1) as u8,
                value,
            })
            .collect();
    }

    pub fn tuning(&self) -> Vec<u8> {
        self.strings.iter().map(|s| s.value).collect()
    }
}

/// Strings of a standard-tuned guitar
pub fn standard_strings() -> Vec<GuitarString> {
    STANDARD_TUNING
        .iter()
        .enumerate()
        .map(|(i, &value)| GuitarString {
            number: (i + 1) as u8,
            value,
        })
        .collect()
}

/// Check the string-list invariant: unique, 1-based, contiguous numbers
pub fn strings_are_contiguous(strings: &[GuitarString]) -> bool {
    let mut numbers: Vec<u8> = strings.iter().map(|s| s.number).collect();
    numbers.sort_unstable();
    numbers
        .iter()
        .enumerate()
        .all(|(i, &n)| usize::from(n) == i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Beat, Duration, Measure};

    fn track_with_notes(notes: Vec<Note>) -> Track {
        let mut track = Track::new("Guitar");
        let mut measure = Measure::new();
        let mut beat = Beat::new(Duration::new(4));
        for note in notes {
            beat.set_note(note);
        }
        measure.voices[0].beats.push(beat);
        track.measures.push(measure);
        track
    }

    #[test]
    fn test_pitch_lookup_by_number() {
        let mut track = Track::new("Guitar");
        track.strings.reverse();
        assert_eq!(track.pitch_at(1, 3), Some(67));
        assert_eq!(track.pitch_at(6, 0), Some(40));
        assert_eq!(track.pitch_at(7, 0), None);
    }

    #[test]
    fn test_transpose_skips_ties_and_negative_frets() {
        let mut track = track_with_notes(vec![
            Note::new(1, 3),
            Note::tied(2, 5),
            Note::new(3, 1),
        ]);

        let moved = track.transpose(-2);
        assert_eq!(moved, 1);

        let notes = &track.measures[0].voices[0].beats[0].notes;
        assert_eq!(notes[0].fret, 1);
        assert_eq!(notes[1].fret, 5);
        assert_eq!(notes[2].fret, 1);
    }

    #[test]
    fn test_transpose_inverse_restores_frets() {
        let mut track = track_with_notes(vec![Note::new(1, 3), Note::new(6, 7)]);
        track.transpose(5);
        track.transpose(-5);
        let frets: Vec<u8> = track.measures[0].voices[0].beats[0]
            .notes
            .iter()
            .map(|n| n.fret)
            .collect();
        assert_eq!(frets, vec![3, 7]);
    }

    #[test]
    fn test_strings_are_contiguous() {
        assert!(strings_are_contiguous(&standard_strings()));
        let gap = vec![
            GuitarString { number: 1, value: 64 },
            GuitarString { number: 3, value: 55 },
        ];
        assert!(!strings_are_contiguous(&gap));
    }
}
