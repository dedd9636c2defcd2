//! Interchange tree shape
//!
//! The tree mirrors the document hierarchy: metadata, then tracks → measures
//! → voices → beats → notes. Every field is optional on input; missing values
//! take the defaults below so hand-edited or foreign files still load.

use serde::{Deserialize, Serialize};

use crate::models::{ChordAlteration, ChordExtension, ChordType, TripletFeel, DEFAULT_TEMPO, DEFAULT_VELOCITY};

fn default_tempo() -> i32 {
    DEFAULT_TEMPO
}

fn default_tempo_name() -> String {
    "Moderate".into()
}

fn default_velocity() -> u8 {
    DEFAULT_VELOCITY
}

fn default_duration_value() -> u32 {
    4
}

fn default_one() -> u8 {
    1
}

fn default_four() -> u8 {
    4
}

fn default_true() -> bool {
    true
}

fn default_instrument() -> i32 {
    crate::models::DEFAULT_INSTRUMENT
}

fn default_volume() -> u8 {
    104
}

fn default_balance() -> u8 {
    64
}

fn default_fret_count() -> i32 {
    24
}

fn default_first_fret() -> i32 {
    1
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SongTree {
    #[serde(default)]
    pub metadata: MetadataTree,
    #[serde(default)]
    pub tracks: Vec<TrackTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTree {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub words: String,
    #[serde(default)]
    pub music: String,
    #[serde(default)]
    pub copyright: String,
    /// Transcriber
    #[serde(default)]
    pub tab: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub notice: Vec<String>,
    #[serde(default = "default_tempo")]
    pub tempo: i32,
    #[serde(default = "default_tempo_name")]
    pub tempo_name: String,
    #[serde(default)]
    pub key: i8,
    #[serde(default)]
    pub lyrics: LyricsTree,
}

impl Default for MetadataTree {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            artist: String::new(),
            album: String::new(),
            words: String::new(),
            music: String::new(),
            copyright: String::new(),
            tab: String::new(),
            instructions: String::new(),
            notice: Vec::new(),
            tempo: DEFAULT_TEMPO,
            tempo_name: default_tempo_name(),
            key: 0,
            lyrics: LyricsTree::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LyricsTree {
    #[serde(default)]
    pub track: i32,
    #[serde(default)]
    pub lines: Vec<LyricLineTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLineTree {
    #[serde(default = "default_starting_measure")]
    pub starting_measure: i32,
    #[serde(default)]
    pub text: String,
}

fn default_starting_measure() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackTree {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub is_percussion: bool,
    #[serde(default)]
    pub channel: ChannelTree,
    /// Empty means standard tuning
    #[serde(default)]
    pub strings: Vec<StringTree>,
    #[serde(default = "default_fret_count")]
    pub fret_count: i32,
    /// Capo fret
    #[serde(default)]
    pub offset: i32,
    #[serde(default)]
    pub measures: Vec<MeasureTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTree {
    /// MIDI channel; allocated automatically when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_channel: Option<u8>,
    #[serde(default = "default_instrument")]
    pub instrument: i32,
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_balance")]
    pub balance: u8,
    #[serde(default)]
    pub chorus: u8,
    #[serde(default)]
    pub reverb: u8,
    #[serde(default)]
    pub phaser: u8,
    #[serde(default)]
    pub tremolo: u8,
}

impl Default for ChannelTree {
    fn default() -> Self {
        Self {
            channel: None,
            effect_channel: None,
            instrument: default_instrument(),
            volume: default_volume(),
            balance: default_balance(),
            chorus: 0,
            reverb: 0,
            phaser: 0,
            tremolo: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StringTree {
    pub number: u8,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MeasureTree {
    /// Header this measure belongs to; list position when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Present on the first track only; later tracks share these headers by index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderTree>,
    #[serde(default)]
    pub voices: Vec<VoiceTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderTree {
    #[serde(default = "default_four")]
    pub numerator: u8,
    #[serde(default = "default_four")]
    pub denominator: u8,
    #[serde(default)]
    pub key: i8,
    #[serde(default)]
    pub minor: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub repeat_open: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub repeat_close: u8,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub repeat_alternative: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerTree>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub double_bar: bool,
    #[serde(default)]
    pub triplet_feel: TripletFeel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directions: Vec<String>,
}

impl Default for HeaderTree {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
            key: 0,
            minor: false,
            repeat_open: false,
            repeat_close: 0,
            repeat_alternative: 0,
            marker: None,
            double_bar: false,
            triplet_feel: TripletFeel::None,
            directions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerTree {
    #[serde(default)]
    pub title: String,
    /// `[r, g, b]`
    #[serde(default = "default_marker_color")]
    pub color: [u8; 3],
}

fn default_marker_color() -> [u8; 3] {
    [255, 0, 0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VoiceTree {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub beats: Vec<BeatTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BeatTree {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub duration: DurationTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord: Option<ChordTree>,
    #[serde(default)]
    pub notes: Vec<NoteTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationTree {
    #[serde(default = "default_duration_value")]
    pub value: u32,
    #[serde(default)]
    pub is_dotted: bool,
    #[serde(default)]
    pub is_rest: bool,
    #[serde(default = "default_one")]
    pub tuplet_enters: u8,
    #[serde(default = "default_one")]
    pub tuplet_times: u8,
}

impl Default for DurationTree {
    fn default() -> Self {
        Self {
            value: default_duration_value(),
            is_dotted: false,
            is_rest: false,
            tuplet_enters: 1,
            tuplet_times: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTree {
    #[serde(default = "default_one")]
    pub string: u8,
    /// Fret
    #[serde(default)]
    pub value: i32,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
    #[serde(default)]
    pub is_tied: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_dead: bool,
    #[serde(default)]
    pub effect: NoteEffectTree,
}

/// Effect switches; only the ones that are on are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NoteEffectTree {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bend: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub harmonic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ghost: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub slide: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub vibrato: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hammer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub let_ring: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub palm_mute: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub staccato: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub accentuated: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub heavy_accentuated: bool,
}

/// Chord diagram, also the shape returned by chord queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordTree {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub root: u8,
    #[serde(default, rename = "type")]
    pub kind: ChordType,
    #[serde(default)]
    pub extension: ChordExtension,
    #[serde(default)]
    pub bass: i32,
    #[serde(default)]
    pub tonality: ChordAlteration,
    #[serde(default)]
    pub fifth: ChordAlteration,
    #[serde(default)]
    pub ninth: ChordAlteration,
    #[serde(default)]
    pub eleventh: ChordAlteration,
    #[serde(default = "default_first_fret")]
    pub first_fret: i32,
    /// Fret per string, string 1 first, -1 for unplayed
    #[serde(default)]
    pub strings: Vec<i32>,
    #[serde(default)]
    pub barres: Vec<BarreTree>,
    #[serde(default)]
    pub fingerings: Vec<i8>,
    #[serde(default = "default_true")]
    pub show: bool,
}

impl Default for ChordTree {
    fn default() -> Self {
        Self {
            name: String::new(),
            root: 0,
            kind: ChordType::Major,
            extension: ChordExtension::None,
            bass: 0,
            tonality: ChordAlteration::Perfect,
            fifth: ChordAlteration::Perfect,
            ninth: ChordAlteration::Perfect,
            eleventh: ChordAlteration::Perfect,
            first_fret: 1,
            strings: Vec::new(),
            barres: Vec::new(),
            fingerings: Vec::new(),
            show: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarreTree {
    pub fret: u8,
    #[serde(alias = "startString")]
    pub start: u8,
    #[serde(alias = "endString")]
    pub end: u8,
}
