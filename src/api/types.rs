//! Plain-value shapes passed across the operation surface
//!
//! Query results are `Serialize` so a caller can hand them straight to a
//! JSON encoder; property updates are `Deserialize` with every field optional.

use serde::{Deserialize, Serialize};

/// Address of a beat: track, measure, voice and beat indices (all 0-based)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeatRef {
    pub track: usize,
    pub measure: usize,
    #[serde(default)]
    pub voice: usize,
    #[serde(default)]
    pub beat: usize,
}

impl BeatRef {
    pub fn new(track: usize, measure: usize, voice: usize, beat: usize) -> Self {
        Self {
            track,
            measure,
            voice,
            beat,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub copyright: String,
    pub subtitle: String,
    pub notice: Vec<String>,
    pub tempo: i32,
    pub track_count: usize,
    pub measure_count: usize,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SongProperties {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub tempo: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackStatistics {
    pub name: String,
    pub string_count: usize,
    pub measure_count: usize,
    pub note_count: usize,
    pub beat_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongStatistics {
    pub title: String,
    pub track_count: usize,
    pub measure_count: usize,
    pub tracks: Vec<TrackStatistics>,
    pub total_notes: usize,
    pub total_beats: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringInfo {
    pub number: u8,
    pub value: u8,
}

/// Entry of the track listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub name: String,
    pub index: usize,
    pub strings: Vec<StringInfo>,
    pub instrument: i32,
    pub is_percussion: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub instrument: i32,
    pub channel: u8,
    pub volume: u8,
    pub pan: u8,
    pub is_solo: bool,
    pub is_mute: bool,
    pub is_percussion: bool,
    pub string_count: usize,
    pub tuning: Vec<String>,
    pub measure_count: usize,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackProperties {
    #[serde(default)]
    pub name: Option<String>,
    /// General MIDI program, 0..=127
    #[serde(default)]
    pub instrument: Option<i32>,
    /// 0..=127
    #[serde(default)]
    pub volume: Option<i32>,
    /// 0..=127, 64 is centre
    #[serde(default)]
    pub pan: Option<i32>,
}

/// One note of a track listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackNote {
    pub measure: usize,
    pub voice: usize,
    pub beat: usize,
    pub string: u8,
    /// Fret
    pub value: u8,
    pub duration: u8,
    pub is_dotted: bool,
    pub is_rest: bool,
    pub has_tie: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureInfo {
    pub index: usize,
    /// `"numerator/denominator"`
    pub time_signature: String,
    pub key_signature: String,
    pub repeat_open: bool,
    pub repeat_close: u8,
    pub alternative_endings: Vec<u8>,
    pub marker: Option<String>,
    pub double_bar: bool,
    pub voice_count: usize,
    pub beat_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteInfo {
    pub value: u8,
    pub string: u8,
    pub velocity: u8,
    pub duration: u8,
    pub is_dotted: bool,
    pub is_tied: bool,
    pub is_ghost: bool,
    pub is_dead: bool,
    pub is_hammer_on: bool,
    pub is_slide: bool,
    pub is_vibrato: bool,
    pub is_bend: bool,
    pub is_harmonic: bool,
    pub is_palm_mute: bool,
    pub is_let_ring: bool,
}

/// Effect switches for a note being added
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteEffects {
    pub bend: bool,
    pub harmonic: bool,
    pub slide: bool,
    pub vibrato: bool,
    pub ghost: bool,
    pub dead: bool,
    pub tied: bool,
    /// Hammer-on or pull-off: the format keeps a single legato flag
    pub hammer: bool,
    /// Sets the same legato flag as `hammer`
    pub pull_off: bool,
    pub palm_mute: bool,
    pub let_ring: bool,
    pub staccato: bool,
    pub accentuated: bool,
    pub velocity: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageSetupInfo {
    pub width: i32,
    pub height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
    /// Percent
    pub score_size_proportion: i32,
    /// Bit set of the header/footer fields shown
    pub header_footer: i16,
    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub album: String,
    pub words: String,
    pub music: String,
    pub words_and_music: String,
    pub copyright: Vec<String>,
    pub page_number: String,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedMetadata {
    pub subtitle: String,
    pub words: String,
    pub music: String,
    pub tab: String,
    pub instructions: String,
    pub notice: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepeatGroupInfo {
    pub repeat_count: u8,
    pub endings: Vec<u8>,
    pub measures: Vec<usize>,
    pub is_closed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub name: String,
    pub start_measure: usize,
    pub end_measure: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureMarkKind {
    Marker,
    DoubleBar,
    Text,
    Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureMark {
    #[serde(rename = "type")]
    pub kind: StructureMarkKind,
    pub measure: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beat: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongStructure {
    pub sections: Vec<SectionInfo>,
    pub repeat_groups: Vec<RepeatGroupInfo>,
    pub markers: Vec<StructureMark>,
}
