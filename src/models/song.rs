//! The song: metadata, measure headers, tracks and derived repeat groups
//!
//! `Song` is the single owner of the document. All structural growth
//! (adding headers or tracks) goes through its methods so the invariant
//! "every track has exactly one measure per header" cannot be broken from
//! outside.

use crate::error::ValidationError;

use super::measure::{Measure, MeasureHeader};
use super::repeat::{build_repeat_groups, RepeatGroup};
use super::track::Track;

/// Default song tempo in BPM
pub const DEFAULT_TEMPO: i32 = 120;

/// Upper bound on headers created by growing operations
pub const MAX_MEASURE_HEADERS: usize = 2048;

/// Binary format revision a song is written as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormatVersion {
    V500,
    #[default]
    V510,
}

impl FormatVersion {
    pub fn version_string(&self) -> &'static str {
        match self {
            FormatVersion::V500 => "FICHIER GUITAR PRO v5.00",
            FormatVersion::V510 => "FICHIER GUITAR PRO v5.10",
        }
    }

    pub fn from_version_string(version: &str) -> Option<Self> {
        match version {
            "FICHIER GUITAR PRO v5.00" => Some(FormatVersion::V500),
            "FICHIER GUITAR PRO v5.10" => Some(FormatVersion::V510),
            _ => None,
        }
    }

    /// True for revisions carrying the RSE master effect, hide-tempo flags
    /// and RSE effect strings
    pub fn is_510(&self) -> bool {
        matches!(self, FormatVersion::V510)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LyricLine {
    /// 1-based measure the line starts on
    pub starting_measure: i32,
    pub text: String,
}

impl Default for LyricLine {
    fn default() -> Self {
        Self {
            starting_measure: 1,
            text: String::new(),
        }
    }
}

pub const LYRIC_LINES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Lyrics {
    /// Track the lyrics are attached to
    pub track_choice: i32,
    pub lines: [LyricLine; LYRIC_LINES],
}

impl Lyrics {
    /// Non-empty lines joined with newlines
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .filter(|l| !l.text.is_empty())
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Split text over the five lines; anything past the fourth newline stays on the last line
    pub fn set_text(&mut self, text: &str) {
        let mut parts = text.splitn(LYRIC_LINES, '\n');
        for line in self.lines.iter_mut() {
            line.text = parts.next().unwrap_or_default().to_string();
        }
    }
}

/// Realistic Sound Engine master settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterEffect {
    pub volume: i32,
    pub reverb: i32,
    /// Ten bands plus gain
    pub equalizer: [i8; 11],
}

impl Default for MasterEffect {
    fn default() -> Self {
        Self {
            volume: 100,
            reverb: 0,
            equalizer: [0; 11],
        }
    }
}

/// Header/footer visibility bits in `PageSetup::header_footer`
pub mod header_footer {
    pub const TITLE: i16 = 0x001;
    pub const SUBTITLE: i16 = 0x002;
    pub const ARTIST: i16 = 0x004;
    pub const ALBUM: i16 = 0x008;
    pub const WORDS: i16 = 0x010;
    pub const MUSIC: i16 = 0x020;
    pub const WORDS_AND_MUSIC: i16 = 0x040;
    pub const COPYRIGHT: i16 = 0x080;
    pub const PAGE_NUMBER: i16 = 0x100;
    pub const ALL: i16 = 0x1FF;
}

/// Print layout. Sizes are in millimetres; the text fields are templates
/// where `%TITLE%`-style placeholders are substituted by the printing tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSetup {
    pub width: i32,
    pub height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
    /// Percent
    pub score_size_proportion: i32,
    pub header_footer: i16,
    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub album: String,
    pub words: String,
    pub music: String,
    pub words_and_music: String,
    pub copyright: [String; 2],
    pub page_number: String,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: 210,
            height: 297,
            margin_left: 10,
            margin_right: 10,
            margin_top: 15,
            margin_bottom: 10,
            score_size_proportion: 100,
            header_footer: header_footer::ALL,
            title: "%title%".into(),
            subtitle: "%subtitle%".into(),
            artist: "%artist%".into(),
            album: "%album%".into(),
            words: "Words by %words%".into(),
            music: "Music by %music%".into(),
            words_and_music: "Words & Music by %WORDSMUSIC%".into(),
            copyright: [
                "Copyright %copyright%".into(),
                "All Rights Reserved - International Copyright Secured".into(),
            ],
            page_number: "Page %N%/%P%".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub version: FormatVersion,

    pub title: String,
    pub subtitle: String,
    pub artist: String,
    pub album: String,
    pub words: String,
    pub music: String,
    pub copyright: String,
    pub tab: String,
    pub instructions: String,
    pub notice: Vec<String>,

    pub lyrics: Lyrics,
    pub master_effect: MasterEffect,
    pub page_setup: PageSetup,

    pub tempo_name: String,
    /// Song-global tempo in BPM
    pub tempo: i32,
    pub hide_tempo: bool,
    pub key: i8,

    pub measure_headers: Vec<MeasureHeader>,
    pub tracks: Vec<Track>,
    /// Rebuilt from header repeat flags, see [`Song::rebuild_repeat_groups`]
    pub repeat_groups: Vec<RepeatGroup>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            version: FormatVersion::default(),
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
            lyrics: Lyrics::default(),
            master_effect: MasterEffect::default(),
            page_setup: PageSetup::default(),
            tempo_name: "Moderate".into(),
            tempo: DEFAULT_TEMPO,
            hide_tempo: false,
            key: 0,
            measure_headers: Vec::new(),
            tracks: Vec::new(),
            repeat_groups: Vec::new(),
        }
    }
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure_count(&self) -> usize {
        self.measure_headers.len()
    }

    /// Append a header and a matching empty measure to every track
    pub fn add_measure_header(&mut self, header: MeasureHeader) -> Result<usize, ValidationError> {
        if self.measure_headers.len() >= MAX_MEASURE_HEADERS {
            return Err(ValidationError::new(format!(
                "song already has the maximum of {} measures",
                MAX_MEASURE_HEADERS
            )));
        }
        self.measure_headers.push(header);
        for track in &mut self.tracks {
            track.measures.push(Measure::new());
        }
        self.rebuild_repeat_groups();
        Ok(self.measure_headers.len() - 1)
    }

    /// Grow the header list until `index` exists
    ///
    /// New headers carry the time and key signature of the last existing one.
    /// Fails without growing when `index` is past the growth cap.
    pub fn ensure_measure(&mut self, index: usize) -> Result<(), ValidationError> {
        if index >= MAX_MEASURE_HEADERS {
            return Err(ValidationError::new(format!(
                "measure index {} exceeds the maximum of {} measures",
                index, MAX_MEASURE_HEADERS
            )));
        }
        while self.measure_headers.len() <= index {
            let header = match self.measure_headers.last() {
                Some(last) => MeasureHeader {
                    time_signature: last.time_signature,
                    key_signature: last.key_signature,
                    ..Default::default()
                },
                None => MeasureHeader::default(),
            };
            self.add_measure_header(header)?;
        }
        Ok(())
    }

    /// Append a track, padding or trimming its measures to the header count
    pub fn add_track(&mut self, mut track: Track) -> usize {
        let count = self.measure_headers.len();
        if track.measures.len() > count {
            log::warn!(
                "track '{}' has {} measures for {} headers, dropping the extra ones",
                track.name,
                track.measures.len(),
                count
            );
        }
        track.measures.resize_with(count, Measure::new);
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// True when every track has one measure per header
    pub fn is_consistent(&self) -> bool {
        let count = self.measure_headers.len();
        self.tracks.iter().all(|t| t.measures.len() == count)
    }

    pub fn rebuild_repeat_groups(&mut self) {
        self.repeat_groups = build_repeat_groups(&mut self.measure_headers);
    }

    /// Tempo in effect at the start of each measure
    ///
    /// Starts from the song tempo and follows mix-table tempo changes found
    /// in any track; a change applies from its own measure onward.
    pub fn measure_tempos(&self) -> Vec<i32> {
        let mut tempos = Vec::with_capacity(self.measure_headers.len());
        let mut current = self.tempo;
        for index in 0..self.measure_headers.len() {
            for track in &self.tracks {
                let Some(measure) = track.measures.get(index) else {
                    continue;
                };
                for beat in measure.beats() {
                    if let Some(tempo) = beat.mix_table.as_ref().and_then(|m| m.tempo) {
                        if tempo.value > 0 {
                            current = tempo.value;
                        }
                    }
                }
            }
            tempos.push(current);
        }
        tempos
    }

    /// Channel pair for a new track: the first pair no other track uses,
    /// never touching the percussion channel unless asked for it
    pub fn next_free_channel(&self, percussion: bool) -> (u8, u8) {
        if percussion {
            return (super::track::PERCUSSION_CHANNEL, super::track::PERCUSSION_CHANNEL);
        }
        let used: Vec<u8> = self
            .tracks
            .iter()
            .flat_map(|t| [t.channel.channel, t.channel.effect_channel])
            .collect();
        let mut channel = 0u8;
        while channel < 63 {
            let effect = channel + 1;
            let clash = used.contains(&channel) || used.contains(&effect);
            let drums = channel % 16 == super::track::PERCUSSION_CHANNEL
                || effect % 16 == super::track::PERCUSSION_CHANNEL;
            if !clash && !drums {
                return (channel, effect);
            }
            channel += 1;
        }
        (0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Beat, Duration, MixTableChange, MixTableItem, Note};

    #[test]
    fn test_add_header_keeps_tracks_in_step() {
        let mut song = Song::new();
        song.add_track(Track::new("Guitar"));
        song.add_measure_header(MeasureHeader::default()).unwrap();
        song.add_track(Track::new("Bass"));
        song.add_measure_header(MeasureHeader::default()).unwrap();

        assert_eq!(song.measure_count(), 2);
        assert!(song.is_consistent());
        assert_eq!(song.tracks[1].measures.len(), 2);
    }

    #[test]
    fn test_ensure_measure_copies_signature() {
        let mut song = Song::new();
        song.add_track(Track::new("Guitar"));
        let mut header = MeasureHeader::default();
        header.time_signature.numerator = 3;
        song.add_measure_header(header).unwrap();

        song.ensure_measure(3).unwrap();
        assert_eq!(song.measure_count(), 4);
        assert_eq!(song.measure_headers[3].time_signature.numerator, 3);
        assert!(song.is_consistent());

        assert!(song.ensure_measure(MAX_MEASURE_HEADERS).is_err());
        assert_eq!(song.measure_count(), 4);
    }

    #[test]
    fn test_lyrics_text() {
        let mut lyrics = Lyrics::default();
        lyrics.set_text("one\ntwo");
        assert_eq!(lyrics.lines[0].text, "one");
        assert_eq!(lyrics.lines[1].text, "two");
        assert_eq!(lyrics.lines[2].text, "");
        assert_eq!(lyrics.text(), "one\ntwo");
    }

    #[test]
    fn test_measure_tempos_follow_mix_tables() {
        let mut song = Song::new();
        song.add_track(Track::new("Guitar"));
        for _ in 0..3 {
            song.add_measure_header(MeasureHeader::default()).unwrap();
        }
        let mut beat = Beat::new(Duration::new(1));
        beat.set_note(Note::new(1, 0));
        beat.mix_table = Some(MixTableChange {
            tempo: Some(MixTableItem::new(90)),
            ..Default::default()
        });
        song.tracks[0].measures[1].voices[0].beats.push(beat);

        assert_eq!(song.measure_tempos(), vec![120, 90, 90]);
    }

    #[test]
    fn test_next_free_channel_skips_drums() {
        let mut song = Song::new();
        for i in 0..5 {
            let (channel, effect) = song.next_free_channel(false);
            let mut track = Track::new(format!("Track {}", i));
            track.channel.channel = channel;
            track.channel.effect_channel = effect;
            song.add_track(track);
        }
        let channels: Vec<u8> = song.tracks.iter().map(|t| t.channel.channel).collect();
        assert_eq!(channels, vec![0, 2, 4, 6, 10]);
        assert_eq!(song.next_free_channel(true), (9, 9));
    }
}
