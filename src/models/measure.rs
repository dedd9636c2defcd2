//! Measure headers (shared by all tracks) and per-track measures

use num_rational::Rational32;
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::beat::Beat;
use super::repeat::RepeatGroupId;

/// Voices stored per measure by the binary format
pub const VOICES_PER_MEASURE: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    /// Power-of-two duration value (4 = quarter)
    pub denominator: u8,
    /// Eighth-note beaming groups
    pub beams: [u8; 4],
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
            beams: [2, 2, 2, 2],
        }
    }

    /// Measure length as a fraction of a whole note
    pub fn length(&self) -> Rational32 {
        Rational32::new(i32::from(self.numerator), i32::from(self.denominator.max(1)))
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::new(4, 4)
    }
}

/// Key as a count of sharps (positive) or flats (negative)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct KeySignature {
    pub key: i8,
    pub minor: bool,
}

const MAJOR_KEY_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_KEY_NAMES: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

impl KeySignature {
    pub fn name(&self) -> String {
        let index = (i32::from(self.key).clamp(-7, 7) + 7) as usize;
        if self.minor {
            format!("{} minor", MINOR_KEY_NAMES[index])
        } else {
            format!("{} major", MAJOR_KEY_NAMES[index])
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    pub title: String,
    pub color: Color,
}

impl Marker {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color: Color::RED,
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
pub enum TripletFeel {
    #[default]
    None = 0,
    Eighth = 1,
    Sixteenth = 2,
}

impl TripletFeel {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TripletFeel::None),
            1 => Some(TripletFeel::Eighth),
            2 => Some(TripletFeel::Sixteenth),
            _ => None,
        }
    }
}

/// Navigation signs, in the order the binary format lists them
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
pub enum DirectionSign {
    Coda = 0,
    DoubleCoda,
    Segno,
    SegnoSegno,
    Fine,
    DaCapo,
    DaCapoAlCoda,
    DaCapoAlDoubleCoda,
    DaCapoAlFine,
    DaSegno,
    DaSegnoAlCoda,
    DaSegnoAlDoubleCoda,
    DaSegnoAlFine,
    DaSegnoSegno,
    DaSegnoSegnoAlCoda,
    DaSegnoSegnoAlDoubleCoda,
    DaSegnoSegnoAlFine,
    DaCoda,
    DaDoubleCoda,
}

impl DirectionSign {
    pub const ALL: [DirectionSign; 19] = [
        DirectionSign::Coda,
        DirectionSign::DoubleCoda,
        DirectionSign::Segno,
        DirectionSign::SegnoSegno,
        DirectionSign::Fine,
        DirectionSign::DaCapo,
        DirectionSign::DaCapoAlCoda,
        DirectionSign::DaCapoAlDoubleCoda,
        DirectionSign::DaCapoAlFine,
        DirectionSign::DaSegno,
        DirectionSign::DaSegnoAlCoda,
        DirectionSign::DaSegnoAlDoubleCoda,
        DirectionSign::DaSegnoAlFine,
        DirectionSign::DaSegnoSegno,
        DirectionSign::DaSegnoSegnoAlCoda,
        DirectionSign::DaSegnoSegnoAlDoubleCoda,
        DirectionSign::DaSegnoSegnoAlFine,
        DirectionSign::DaCoda,
        DirectionSign::DaDoubleCoda,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        use DirectionSign::*;
        match self {
            Coda => "Coda",
            DoubleCoda => "Double Coda",
            Segno => "Segno",
            SegnoSegno => "Segno Segno",
            Fine => "Fine",
            DaCapo => "Da Capo",
            DaCapoAlCoda => "Da Capo al Coda",
            DaCapoAlDoubleCoda => "Da Capo al Double Coda",
            DaCapoAlFine => "Da Capo al Fine",
            DaSegno => "Da Segno",
            DaSegnoAlCoda => "Da Segno al Coda",
            DaSegnoAlDoubleCoda => "Da Segno al Double Coda",
            DaSegnoAlFine => "Da Segno al Fine",
            DaSegnoSegno => "Da Segno Segno",
            DaSegnoSegnoAlCoda => "Da Segno Segno al Coda",
            DaSegnoSegnoAlDoubleCoda => "Da Segno Segno al Double Coda",
            DaSegnoSegnoAlFine => "Da Segno Segno al Fine",
            DaCoda => "Da Coda",
            DaDoubleCoda => "Da Double Coda",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Per-measure data shared across all tracks
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MeasureHeader {
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
    pub repeat_open: bool,
    /// Repeat count byte as stored; greater than zero closes a repeat
    pub repeat_close: u8,
    /// Bitmask of alternative ending numbers (bit 0 = ending 1)
    pub repeat_alternative: u8,
    pub marker: Option<Marker>,
    pub double_bar: bool,
    pub triplet_feel: TripletFeel,
    /// Navigation signs anchored on this measure
    pub directions: Vec<DirectionSign>,
    /// Owning repeat group, maintained by [`crate::models::Song::rebuild_repeat_groups`]
    pub repeat_group: Option<RepeatGroupId>,
}

impl MeasureHeader {
    pub fn new(time_signature: TimeSignature) -> Self {
        Self {
            time_signature,
            ..Default::default()
        }
    }

    pub fn is_repeat_close(&self) -> bool {
        self.repeat_close > 0
    }

    /// Alternative ending numbers, 1-based
    pub fn alternative_endings(&self) -> Vec<u8> {
        (0..8)
            .filter(|bit| self.repeat_alternative & (1 << bit) != 0)
            .map(|bit| bit + 1)
            .collect()
    }

    pub fn length(&self) -> Rational32 {
        self.time_signature.length()
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Voice {
    pub beats: Vec<Beat>,
}

impl Voice {
    /// Total time of the voice's beats as a fraction of a whole note
    pub fn length(&self) -> Rational32 {
        self.beats
            .iter()
            .fold(Rational32::from_integer(0), |acc, beat| acc + beat.length())
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}

/// A track's content for one measure header (same index)
#[derive(Clone, Debug, PartialEq)]
pub struct Measure {
    pub voices: Vec<Voice>,
    /// Line/page break hint byte
    pub line_break: u8,
}

impl Measure {
    pub fn new() -> Self {
        Self {
            voices: vec![Voice::default(); VOICES_PER_MEASURE],
            line_break: 0,
        }
    }

    /// Time the longest voice takes
    pub fn length(&self) -> Rational32 {
        self.voices
            .iter()
            .map(Voice::length)
            .max()
            .unwrap_or_else(|| Rational32::from_integer(0))
    }

    pub fn is_empty(&self) -> bool {
        self.voices.iter().all(Voice::is_empty)
    }

    pub fn beats(&self) -> impl Iterator<Item = &Beat> {
        self.voices.iter().flat_map(|v| v.beats.iter())
    }
}

impl Default for Measure {
    fn default() -> Self {
        Measure::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Duration, Note};

    #[test]
    fn test_time_signature_length() {
        assert_eq!(TimeSignature::new(3, 4).length(), Rational32::new(3, 4));
        assert_eq!(TimeSignature::new(6, 8).length(), Rational32::new(3, 4));
    }

    #[test]
    fn test_key_names() {
        assert_eq!(KeySignature { key: 0, minor: false }.name(), "C major");
        assert_eq!(KeySignature { key: 2, minor: false }.name(), "D major");
        assert_eq!(KeySignature { key: -3, minor: true }.name(), "C minor");
    }

    #[test]
    fn test_direction_sign_order() {
        assert_eq!(DirectionSign::from_index(0), Some(DirectionSign::Coda));
        assert_eq!(DirectionSign::from_index(18), Some(DirectionSign::DaDoubleCoda));
        assert_eq!(DirectionSign::from_index(19), None);
        assert_eq!(DirectionSign::from_label("da capo al fine"), Some(DirectionSign::DaCapoAlFine));
        for (i, sign) in DirectionSign::ALL.iter().enumerate() {
            assert_eq!(sign.index(), i);
        }
    }

    #[test]
    fn test_alternative_endings() {
        let header = MeasureHeader {
            repeat_alternative: 0b0000_0101,
            ..Default::default()
        };
        assert_eq!(header.alternative_endings(), vec![1, 3]);
    }

    #[test]
    fn test_measure_length_uses_longest_voice() {
        let mut measure = Measure::new();
        let mut beat = Beat::new(Duration::new(4));
        beat.set_note(Note::new(1, 0));
        measure.voices[0].beats.push(beat.clone());
        measure.voices[1].beats.push(beat.clone());
        measure.voices[1].beats.push(beat);
        assert_eq!(measure.length(), Rational32::new(1, 2));
    }
}
