//! Notes and their effects
//!
//! A note sits on one string of its track and stores a fret, not a pitch.
//! The sounding pitch is resolved through the track tuning (see
//! [`crate::models::Track::pitch_of`]). Tied notes inherit the pitch of the
//! previous non-tied note on the same string; their stored fret is kept only
//! so the binary codec can write back what it read.

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Default velocity of a note: the binary format's *forte* dynamic
pub const DEFAULT_VELOCITY: u8 = 95;

/// Highest fret the format can store
pub const MAX_FRET: u8 = 99;

/// Kind of note, stored in the binary format as a single byte
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
pub enum NoteType {
    Rest = 0,
    #[default]
    Normal = 1,
    /// Continues the previous note on the same string
    Tie = 2,
    /// Muted ("dead") note, percussive
    Dead = 3,
}

impl NoteType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NoteType::Rest),
            1 => Some(NoteType::Normal),
            2 => Some(NoteType::Tie),
            3 => Some(NoteType::Dead),
            _ => None,
        }
    }
}

/// A point on a bend or tremolo-bar curve, in the format's raw units
/// (position 0..=60, value in quarter tones × 25 per semitone)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BendPoint {
    pub position: i32,
    pub value: i32,
    pub vibrato: bool,
}

/// Bend curve (also used for the beat-level tremolo bar)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bend {
    /// Bend shape code (1 = bend, 2 = bend and release, ...)
    pub kind: i8,
    /// Peak value, 25 units per semitone
    pub value: i32,
    pub points: Vec<BendPoint>,
}

impl Bend {
    /// A plain full-step bend, the shape used when a caller only asks for "a bend"
    pub fn full_step() -> Self {
        Self {
            kind: 1,
            value: 50,
            points: vec![
                BendPoint { position: 0, value: 0, vibrato: false },
                BendPoint { position: 30, value: 50, vibrato: false },
                BendPoint { position: 60, value: 50, vibrato: false },
            ],
        }
    }
}

/// Grace note attached before the main note, raw binary fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grace {
    pub fret: u8,
    pub dynamic: u8,
    pub transition: u8,
    pub duration: u8,
    /// 0x01 dead, 0x02 on beat
    pub flags: u8,
}

/// Harmonic kinds understood by the format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Harmonic {
    Natural,
    Artificial { semitone: u8, accidental: i8, octave: u8 },
    Tapped { fret: u8 },
    Pinch,
    Semi,
}

impl Harmonic {
    /// Type code as written in the binary format
    pub fn code(&self) -> i8 {
        match self {
            Harmonic::Natural => 1,
            Harmonic::Artificial { .. } => 2,
            Harmonic::Tapped { .. } => 3,
            Harmonic::Pinch => 4,
            Harmonic::Semi => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trill {
    pub fret: i8,
    pub period: i8,
}

/// Slide bitmask values
pub mod slide {
    pub const SHIFT_SLIDE_TO: u8 = 0x01;
    pub const LEGATO_SLIDE_TO: u8 = 0x02;
    pub const OUT_DOWNWARDS: u8 = 0x04;
    pub const OUT_UPWARDS: u8 = 0x08;
    pub const INTO_FROM_BELOW: u8 = 0x10;
    pub const INTO_FROM_ABOVE: u8 = 0x20;
}

/// Effect set of a single note
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NoteEffect {
    pub bend: Option<Bend>,
    pub grace: Option<Grace>,
    pub harmonic: Option<Harmonic>,
    pub trill: Option<Trill>,
    /// Tremolo picking speed code (1 = eighth, 2 = sixteenth, 3 = thirty-second)
    pub tremolo_picking: Option<i8>,
    /// Slide bitmask, see [`slide`]; zero means no slide
    pub slide: u8,
    /// Hammer-on or pull-off into the next note (the format stores one flag for both)
    pub hammer: bool,
    pub let_ring: bool,
    pub staccato: bool,
    pub palm_mute: bool,
    pub vibrato: bool,
    pub ghost: bool,
    pub accentuated: bool,
    pub heavy_accentuated: bool,
    /// Left and right hand finger codes; present or absent as a pair
    pub fingering: Option<(i8, i8)>,
}

impl NoteEffect {
    /// True when the note-effects block would carry nothing
    ///
    /// Ghost, accent and fingering live in the note flags byte rather than the
    /// effects block, so they do not count here.
    pub fn is_default(&self) -> bool {
        self.bend.is_none()
            && self.grace.is_none()
            && self.harmonic.is_none()
            && self.trill.is_none()
            && self.tremolo_picking.is_none()
            && self.slide == 0
            && !self.hammer
            && !self.let_ring
            && !self.staccato
            && !self.palm_mute
            && !self.vibrato
    }

    pub fn is_slide(&self) -> bool {
        self.slide != 0
    }
}

/// A fretted note within a beat
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    /// String number, 1-based, referencing the owning track's tuning
    pub string: u8,
    /// Fret; for tied notes this is informational only
    pub fret: u8,
    /// MIDI velocity
    pub velocity: u8,
    pub kind: NoteType,
    pub effect: NoteEffect,
    /// Relative length of the note within its beat, absent when 100%
    pub duration_percent: Option<f64>,
    pub swap_accidentals: bool,
}

impl Note {
    pub fn new(string: u8, fret: u8) -> Self {
        Self {
            string,
            fret,
            velocity: DEFAULT_VELOCITY,
            kind: NoteType::Normal,
            effect: NoteEffect::default(),
            duration_percent: None,
            swap_accidentals: false,
        }
    }

    pub fn tied(string: u8, fret: u8) -> Self {
        Self {
            kind: NoteType::Tie,
            ..Self::new(string, fret)
        }
    }

    pub fn is_tied(&self) -> bool {
        self.kind == NoteType::Tie
    }

    pub fn is_dead(&self) -> bool {
        self.kind == NoteType::Dead
    }
}
