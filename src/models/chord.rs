//! Chord diagrams
//!
//! Mirrors the extended chord block of the binary format: a spelled chord
//! (root, type, extension, alterations) plus a fret diagram with barres and
//! fingerings.

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Chord-name pitch classes, C = 0
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
pub enum ChordType {
    #[default]
    Major = 0,
    Seventh = 1,
    MajorSeventh = 2,
    Sixth = 3,
    Minor = 4,
    MinorSeventh = 5,
    MinorMajor = 6,
    MinorSixth = 7,
    SuspendedSecond = 8,
    SuspendedFourth = 9,
    SeventhSuspendedSecond = 10,
    SeventhSuspendedFourth = 11,
    Diminished = 12,
    Augmented = 13,
    Power = 14,
}

impl ChordType {
    pub fn from_u8(value: u8) -> Option<Self> {
        use ChordType::*;
        Some(match value {
            0 => Major,
            1 => Seventh,
            2 => MajorSeventh,
            3 => Sixth,
            4 => Minor,
            5 => MinorSeventh,
            6 => MinorMajor,
            7 => MinorSixth,
            8 => SuspendedSecond,
            9 => SuspendedFourth,
            10 => SeventhSuspendedSecond,
            11 => SeventhSuspendedFourth,
            12 => Diminished,
            13 => Augmented,
            14 => Power,
            _ => return None,
        })
    }

    /// Suffix used when spelling a chord name
    pub fn suffix(&self) -> &'static str {
        use ChordType::*;
        match self {
            Major => "",
            Seventh => "7",
            MajorSeventh => "maj7",
            Sixth => "6",
            Minor => "m",
            MinorSeventh => "m7",
            MinorMajor => "m(maj7)",
            MinorSixth => "m6",
            SuspendedSecond => "sus2",
            SuspendedFourth => "sus4",
            SeventhSuspendedSecond => "7sus2",
            SeventhSuspendedFourth => "7sus4",
            Diminished => "dim",
            Augmented => "aug",
            Power => "5",
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
pub enum ChordExtension {
    #[default]
    None = 0,
    Ninth = 1,
    Eleventh = 2,
    Thirteenth = 3,
}

impl ChordExtension {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ChordExtension::None),
            1 => Some(ChordExtension::Ninth),
            2 => Some(ChordExtension::Eleventh),
            3 => Some(ChordExtension::Thirteenth),
            _ => None,
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
pub enum ChordAlteration {
    #[default]
    Perfect = 0,
    Diminished = 1,
    Augmented = 2,
}

impl ChordAlteration {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ChordAlteration::Perfect),
            1 => Some(ChordAlteration::Diminished),
            2 => Some(ChordAlteration::Augmented),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barre {
    pub fret: u8,
    pub start: u8,
    pub end: u8,
}

/// Max barres in a diagram
pub const MAX_BARRES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chord {
    pub name: String,
    pub sharp: bool,
    /// Root pitch class, C = 0
    pub root: u8,
    pub kind: ChordType,
    pub extension: ChordExtension,
    /// Bass pitch class
    pub bass: i32,
    pub tonality: ChordAlteration,
    pub add: bool,
    pub fifth: ChordAlteration,
    pub ninth: ChordAlteration,
    pub eleventh: ChordAlteration,
    /// Fret shown at the top of the diagram
    pub first_fret: i32,
    /// One entry per track string, -1 for an unplayed string
    pub strings: Vec<i32>,
    pub barres: Vec<Barre>,
    pub omissions: [bool; 7],
    /// Finger codes per string, -2 unknown
    pub fingerings: [i8; 7],
    pub show: bool,
}

impl Chord {
    pub fn new(name: impl Into<String>, string_count: usize) -> Self {
        Self {
            name: name.into(),
            sharp: true,
            root: 0,
            kind: ChordType::Major,
            extension: ChordExtension::None,
            bass: 0,
            tonality: ChordAlteration::Perfect,
            add: false,
            fifth: ChordAlteration::Perfect,
            ninth: ChordAlteration::Perfect,
            eleventh: ChordAlteration::Perfect,
            first_fret: 1,
            strings: vec![-1; string_count],
            barres: Vec::new(),
            omissions: [true; 7],
            fingerings: [-2; 7],
            show: true,
        }
    }

    /// Name built from root and type, used when the diagram has no explicit name
    pub fn spelled_name(&self) -> String {
        let root = PITCH_CLASS_NAMES[usize::from(self.root % 12)];
        format!("{}{}", root, self.kind.suffix())
    }

    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.spelled_name()
        } else {
            self.name.clone()
        }
    }

    /// Resize the diagram to a track's string count, padding with unplayed strings
    pub fn fit_to_strings(&mut self, string_count: usize) {
        self.strings.resize(string_count, -1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelled_name() {
        let mut chord = Chord::new("", 6);
        chord.root = 9;
        chord.kind = ChordType::Minor;
        assert_eq!(chord.display_name(), "Am");

        chord.name = "A minor".into();
        assert_eq!(chord.display_name(), "A minor");
    }

    #[test]
    fn test_fit_to_strings() {
        let mut chord = Chord::new("G", 6);
        chord.strings = vec![3, 0, 0, 0, 2, 3];
        chord.fit_to_strings(7);
        assert_eq!(chord.strings, vec![3, 0, 0, 0, 2, 3, -1]);
        chord.fit_to_strings(4);
        assert_eq!(chord.strings.len(), 4);
    }
}
