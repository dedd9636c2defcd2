//! Beats, durations and beat-level effects

use num_rational::Rational32;
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::chord::Chord;
use super::note::{Bend, Note};
use super::track::RseInstrument;

/// Duration values the format can express (whole .. sixty-fourth)
pub const DURATION_VALUES: [u8; 7] = [1, 2, 4, 8, 16, 32, 64];

/// Tuplet ratio: `enters` notes in the time of `times`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuplet {
    pub enters: u8,
    pub times: u8,
}

impl Tuplet {
    pub const NONE: Tuplet = Tuplet { enters: 1, times: 1 };

    /// Tuplets the binary format accepts, keyed by `enters`
    pub fn from_enters(enters: i32) -> Option<Tuplet> {
        let times = match enters {
            1 => 1,
            3 => 2,
            5..=7 => 4,
            9..=13 => 8,
            _ => return None,
        };
        Some(Tuplet { enters: enters as u8, times })
    }

    pub fn is_none(&self) -> bool {
        self.enters == self.times
    }
}

impl Default for Tuplet {
    fn default() -> Self {
        Tuplet::NONE
    }
}

/// Rhythmic value of a beat
///
/// `value` is the note denominator: 1 = whole, 4 = quarter, 16 = sixteenth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Duration {
    pub value: u8,
    pub dotted: bool,
    pub tuplet: Tuplet,
}

impl Duration {
    pub fn new(value: u8) -> Self {
        Self {
            value,
            dotted: false,
            tuplet: Tuplet::NONE,
        }
    }

    pub fn is_valid_value(value: u32) -> bool {
        DURATION_VALUES.iter().any(|&v| u32::from(v) == value)
    }

    /// Length as a fraction of a whole note, dot and tuplet applied
    pub fn fraction(&self) -> Rational32 {
        let mut length = Rational32::new(1, i32::from(self.value.max(1)));
        if self.dotted {
            length = length * Rational32::new(3, 2);
        }
        if !self.tuplet.is_none() {
            length = length * Rational32::new(i32::from(self.tuplet.times), i32::from(self.tuplet.enters));
        }
        length
    }

    /// Length in ticks: `round(tpq * 4 / value)`, ×1.5 when dotted, then tuplet scaled
    pub fn ticks(&self, ticks_per_quarter: u32) -> u64 {
        let value = f64::from(self.value.max(1));
        let mut ticks = (f64::from(ticks_per_quarter) * 4.0 / value).round();
        if self.dotted {
            ticks *= 1.5;
        }
        if !self.tuplet.is_none() {
            ticks = ticks * f64::from(self.tuplet.times) / f64::from(self.tuplet.enters);
        }
        ticks.round() as u64
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::new(4)
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
pub enum BeatStatus {
    /// Placeholder beat that takes no time
    Empty = 0,
    #[default]
    Normal = 1,
    Rest = 2,
}

impl BeatStatus {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BeatStatus::Empty),
            1 => Some(BeatStatus::Normal),
            2 => Some(BeatStatus::Rest),
            _ => None,
        }
    }
}

/// Strum speeds for the two directions, 0 when absent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BeatStroke {
    pub down: i8,
    pub up: i8,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BeatEffects {
    pub vibrato: bool,
    pub fade_in: bool,
    /// Slap code: 1 tapping, 2 slapping, 3 popping
    pub slap: Option<i8>,
    pub tremolo_bar: Option<Bend>,
    pub stroke: Option<BeatStroke>,
    pub rasgueado: bool,
    /// Pick stroke direction: 1 up, 2 down
    pub pick_stroke: Option<i8>,
}

impl BeatEffects {
    pub fn is_default(&self) -> bool {
        *self == BeatEffects::default()
    }
}

/// A single changed value in a mix table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MixTableItem {
    pub value: i32,
    /// Transition length in beats
    pub duration: i8,
    /// Applies to every track, not only the owning one
    pub all_tracks: bool,
}

impl MixTableItem {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            duration: 0,
            all_tracks: false,
        }
    }
}

/// Mid-song change of instrument, mixer values or tempo
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixTableChange {
    pub instrument: Option<i8>,
    pub rse: RseInstrument,
    pub volume: Option<MixTableItem>,
    pub balance: Option<MixTableItem>,
    pub chorus: Option<MixTableItem>,
    pub reverb: Option<MixTableItem>,
    pub phaser: Option<MixTableItem>,
    pub tremolo: Option<MixTableItem>,
    pub tempo_name: String,
    pub tempo: Option<MixTableItem>,
    pub hide_tempo: bool,
    pub use_rse: bool,
    pub show_wah: bool,
    /// Wah pedal: -1 none, -2 off, otherwise 0..=100
    pub wah: i8,
}

impl Default for MixTableChange {
    fn default() -> Self {
        Self {
            instrument: None,
            rse: RseInstrument::default(),
            volume: None,
            balance: None,
            chorus: None,
            reverb: None,
            phaser: None,
            tremolo: None,
            tempo_name: String::new(),
            tempo: None,
            hide_tempo: false,
            use_rse: false,
            show_wah: false,
            wah: -1,
        }
    }
}

impl MixTableChange {
    /// The six mixer items in file order (tempo is handled separately)
    pub fn mixer_items(&self) -> [Option<MixTableItem>; 6] {
        [self.volume, self.balance, self.chorus, self.reverb, self.phaser, self.tremolo]
    }

    pub fn mixer_items_mut(&mut self) -> [&mut Option<MixTableItem>; 6] {
        [
            &mut self.volume,
            &mut self.balance,
            &mut self.chorus,
            &mut self.reverb,
            &mut self.phaser,
            &mut self.tremolo,
        ]
    }
}

/// One rhythmic slot in a voice
#[derive(Clone, Debug, PartialEq)]
pub struct Beat {
    pub duration: Duration,
    pub status: BeatStatus,
    /// Sorted by string number, at most one note per string
    pub notes: Vec<Note>,
    pub chord: Option<Chord>,
    pub text: Option<String>,
    pub effect: BeatEffects,
    pub mix_table: Option<MixTableChange>,
    /// Raw display flags (stem, beaming and break hints)
    pub display_flags: u16,
    /// Secondary beam break, written when display flag 0x0800 is set
    pub break_secondary: u8,
}

impl Beat {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            status: BeatStatus::Normal,
            notes: Vec::new(),
            chord: None,
            text: None,
            effect: BeatEffects::default(),
            mix_table: None,
            display_flags: 0,
            break_secondary: 0,
        }
    }

    pub fn rest(duration: Duration) -> Self {
        Self {
            status: BeatStatus::Rest,
            ..Self::new(duration)
        }
    }

    pub fn is_rest(&self) -> bool {
        self.status == BeatStatus::Rest
    }

    pub fn is_empty(&self) -> bool {
        self.status == BeatStatus::Empty
    }

    pub fn is_chord(&self) -> bool {
        self.chord.is_some()
    }

    /// Time the beat occupies; empty placeholders take none
    pub fn length(&self) -> Rational32 {
        if self.is_empty() {
            Rational32::from_integer(0)
        } else {
            self.duration.fraction()
        }
    }

    pub fn note_on_string(&self, string: u8) -> Option<&Note> {
        self.notes.iter().find(|n| n.string == string)
    }

    /// Insert keeping string order, replacing any note already on that string
    pub fn set_note(&mut self, note: Note) {
        match self.notes.binary_search_by_key(&note.string, |n| n.string) {
            Ok(pos) => self.notes[pos] = note,
            Err(pos) => self.notes.insert(pos, note),
        }
        self.status = BeatStatus::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_ticks() {
        assert_eq!(Duration::new(4).ticks(480), 480);
        assert_eq!(Duration::new(1).ticks(480), 1920);
        assert_eq!(Duration::new(16).ticks(480), 120);

        let mut dotted = Duration::new(8);
        dotted.dotted = true;
        assert_eq!(dotted.ticks(480), 360);

        let mut triplet = Duration::new(8);
        triplet.tuplet = Tuplet { enters: 3, times: 2 };
        assert_eq!(triplet.ticks(480), 160);
    }

    #[test]
    fn test_duration_fraction() {
        let mut d = Duration::new(4);
        assert_eq!(d.fraction(), Rational32::new(1, 4));
        d.dotted = true;
        assert_eq!(d.fraction(), Rational32::new(3, 8));
    }

    #[test]
    fn test_tuplet_from_enters() {
        assert_eq!(Tuplet::from_enters(3), Some(Tuplet { enters: 3, times: 2 }));
        assert_eq!(Tuplet::from_enters(6), Some(Tuplet { enters: 6, times: 4 }));
        assert_eq!(Tuplet::from_enters(12), Some(Tuplet { enters: 12, times: 8 }));
        assert_eq!(Tuplet::from_enters(4), None);
    }

    #[test]
    fn test_set_note_keeps_string_order() {
        let mut beat = Beat::rest(Duration::new(4));
        beat.set_note(Note::new(3, 2));
        beat.set_note(Note::new(1, 0));
        beat.set_note(Note::new(3, 5));

        assert!(!beat.is_rest());
        let strings: Vec<u8> = beat.notes.iter().map(|n| n.string).collect();
        assert_eq!(strings, vec![1, 3]);
        assert_eq!(beat.note_on_string(3).map(|n| n.fret), Some(5));
    }

    #[test]
    fn test_empty_beat_has_no_length() {
        let mut beat = Beat::new(Duration::new(2));
        assert_eq!(beat.length(), Rational32::new(1, 2));
        beat.status = BeatStatus::Empty;
        assert_eq!(beat.length(), Rational32::from_integer(0));
    }
}
