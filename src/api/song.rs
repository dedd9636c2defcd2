//! Song-level operations

use super::helpers::{field_text, validate_range};
use super::types::{
    AdvancedMetadata, PageSetupInfo, SongInfo, SongProperties, SongStatistics, TrackStatistics,
};
use super::TabEditor;
use crate::converters::gp5::storable_text;
use crate::error::{invalid, Result};
use crate::models::{MeasureHeader, Song, Track, DEFAULT_TEMPO};

pub(crate) const TEMPO_RANGE: std::ops::RangeInclusive<i32> = 1..=999;

impl TabEditor {
    /// Start a new song with one standard guitar track and one 4/4 measure
    pub fn create_song(&mut self, title: &str, artist: &str) {
        let mut song = Song::new();
        song.title = field_text(title);
        song.artist = field_text(artist);
        song.tempo = DEFAULT_TEMPO;
        song.measure_headers.push(MeasureHeader::default());

        let mut track = Track::new("Guitar");
        let (channel, effect_channel) = song.next_free_channel(false);
        track.channel.channel = channel;
        track.channel.effect_channel = effect_channel;
        song.add_track(track);
        song.rebuild_repeat_groups();

        log::debug!("created song '{}' by '{}'", title, artist);
        self.set_song(song);
    }

    pub fn set_song_properties(&mut self, properties: SongProperties) -> Result<()> {
        let song = self.loaded_mut()?;
        if let Some(tempo) = properties.tempo {
            validate_range(tempo, TEMPO_RANGE, "tempo")?;
        }
        if let Some(title) = properties.title {
            song.title = field_text(&title);
        }
        if let Some(artist) = properties.artist {
            song.artist = field_text(&artist);
        }
        if let Some(album) = properties.album {
            song.album = field_text(&album);
        }
        if let Some(tempo) = properties.tempo {
            song.tempo = tempo;
        }
        Ok(())
    }

    pub fn get_song_info(&self) -> Option<SongInfo> {
        let song = self.song()?;
        Some(SongInfo {
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            copyright: song.copyright.clone(),
            subtitle: song.subtitle.clone(),
            notice: song.notice.clone(),
            tempo: song.tempo,
            track_count: song.tracks.len(),
            measure_count: song.measure_count(),
        })
    }

    pub fn get_song_statistics(&self) -> Option<SongStatistics> {
        let song = self.song()?;
        let tracks: Vec<TrackStatistics> = song
            .tracks
            .iter()
            .map(|track| {
                let beats = track.measures.iter().flat_map(|m| m.beats());
                let (beat_count, note_count) =
                    beats.fold((0, 0), |(b, n), beat| (b + 1, n + beat.notes.len()));
                TrackStatistics {
                    name: track.name.clone(),
                    string_count: track.strings.len(),
                    measure_count: track.measures.len(),
                    note_count,
                    beat_count,
                }
            })
            .collect();
        Some(SongStatistics {
            title: song.title.clone(),
            track_count: song.tracks.len(),
            measure_count: song.measure_count(),
            total_notes: tracks.iter().map(|t| t.note_count).sum(),
            total_beats: tracks.iter().map(|t| t.beat_count).sum(),
            tracks,
        })
    }

    // ------------------------------------------------------------------
    // Lyrics
    // ------------------------------------------------------------------

    /// Set the lyrics text; up to five newline-separated lines
    pub fn set_lyrics(&mut self, text: &str) -> Result<()> {
        self.loaded_mut()?
            .lyrics
            .set_text(&storable_text(text, usize::MAX));
        Ok(())
    }

    pub fn get_lyrics(&self) -> String {
        self.song().map(|s| s.lyrics.text()).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Page setup
    // ------------------------------------------------------------------

    pub fn set_page_setup(&mut self, info: PageSetupInfo) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_range(info.width, 1..=10_000, "page width")?;
        validate_range(info.height, 1..=10_000, "page height")?;
        for margin in [info.margin_left, info.margin_right, info.margin_top, info.margin_bottom] {
            validate_range(margin, 0..=1_000, "page margin")?;
        }
        validate_range(info.score_size_proportion, 1..=1_000, "score size proportion")?;
        if info.copyright.len() > 2 {
            return invalid(format!(
                "copyright template has {} lines, at most 2 allowed",
                info.copyright.len()
            ));
        }

        let setup = &mut song.page_setup;
        setup.width = info.width;
        setup.height = info.height;
        setup.margin_left = info.margin_left;
        setup.margin_right = info.margin_right;
        setup.margin_top = info.margin_top;
        setup.margin_bottom = info.margin_bottom;
        setup.score_size_proportion = info.score_size_proportion;
        setup.header_footer = info.header_footer;
        setup.title = field_text(&info.title);
        setup.subtitle = field_text(&info.subtitle);
        setup.artist = field_text(&info.artist);
        setup.album = field_text(&info.album);
        setup.words = field_text(&info.words);
        setup.music = field_text(&info.music);
        setup.words_and_music = field_text(&info.words_and_music);
        let mut copyright = info.copyright.into_iter();
        setup.copyright = [
            field_text(&copyright.next().unwrap_or_default()),
            field_text(&copyright.next().unwrap_or_default()),
        ];
        setup.page_number = field_text(&info.page_number);
        Ok(())
    }

    pub fn get_page_setup(&self) -> Option<PageSetupInfo> {
        let setup = &self.song()?.page_setup;
        Some(PageSetupInfo {
            width: setup.width,
            height: setup.height,
            margin_left: setup.margin_left,
            margin_right: setup.margin_right,
            margin_top: setup.margin_top,
            margin_bottom: setup.margin_bottom,
            score_size_proportion: setup.score_size_proportion,
            header_footer: setup.header_footer,
            title: setup.title.clone(),
            subtitle: setup.subtitle.clone(),
            artist: setup.artist.clone(),
            album: setup.album.clone(),
            words: setup.words.clone(),
            music: setup.music.clone(),
            words_and_music: setup.words_and_music.clone(),
            copyright: setup.copyright.to_vec(),
            page_number: setup.page_number.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Advanced metadata
    // ------------------------------------------------------------------

    pub fn set_advanced_metadata(&mut self, metadata: AdvancedMetadata) -> Result<()> {
        let song = self.loaded_mut()?;
        song.subtitle = field_text(&metadata.subtitle);
        song.words = field_text(&metadata.words);
        song.music = field_text(&metadata.music);
        song.tab = field_text(&metadata.tab);
        song.instructions = field_text(&metadata.instructions);
        song.notice = metadata.notice.iter().map(|line| field_text(line)).collect();
        Ok(())
    }

    pub fn get_advanced_metadata(&self) -> Option<AdvancedMetadata> {
        let song = self.song()?;
        Some(AdvancedMetadata {
            subtitle: song.subtitle.clone(),
            words: song.words.clone(),
            music: song.music.clone(),
            tab: song.tab.clone(),
            instructions: song.instructions.clone(),
            notice: song.notice.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BeatRef;

    #[test]
    fn test_create_song_shape() {
        let mut editor = TabEditor::new();
        editor.create_song("Test", "Someone");
        let song = editor.song().unwrap();
        assert_eq!(song.tracks.len(), 1);
        assert_eq!(song.tracks[0].name, "Guitar");
        assert_eq!(song.measure_count(), 1);
        assert!(song.is_consistent());
        assert_eq!(song.tempo, 120);
    }

    #[test]
    fn test_set_song_properties_validates_first() {
        let mut editor = TabEditor::new();
        editor.create_song("Old", "");
        let err = editor
            .set_song_properties(SongProperties {
                title: Some("New".into()),
                tempo: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(editor.song().unwrap().title, "Old");

        editor
            .set_song_properties(SongProperties {
                album: Some("Album".into()),
                tempo: Some(90),
                ..Default::default()
            })
            .unwrap();
        let info = editor.get_song_info().unwrap();
        assert_eq!(info.album, "Album");
        assert_eq!(info.tempo, 90);
    }

    #[test]
    fn test_statistics() {
        let mut editor = TabEditor::new();
        editor.create_song("Stats", "");
        editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 0, 4).unwrap();
        editor.add_note(BeatRef::new(0, 0, 0, 0), 2, 1, 4).unwrap();
        editor.add_note(BeatRef::new(0, 0, 0, 1), 3, 2, 4).unwrap();
        let stats = editor.get_song_statistics().unwrap();
        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.total_beats, 2);
        assert_eq!(stats.tracks[0].string_count, 6);
    }

    #[test]
    fn test_lyrics_and_metadata() {
        let mut editor = TabEditor::new();
        assert_eq!(editor.get_lyrics(), "");
        assert!(editor.set_lyrics("la").unwrap_err().is_state());

        editor.create_song("Words", "");
        editor.set_lyrics("first\nsecond").unwrap();
        assert_eq!(editor.get_lyrics(), "first\nsecond");

        editor
            .set_advanced_metadata(AdvancedMetadata {
                tab: "Me".into(),
                notice: vec!["one".into(), "two".into()],
                ..Default::default()
            })
            .unwrap();
        let meta = editor.get_advanced_metadata().unwrap();
        assert_eq!(meta.tab, "Me");
        assert_eq!(meta.notice.len(), 2);
    }

    #[test]
    fn test_page_setup_round_trip() {
        let mut editor = TabEditor::new();
        assert!(editor.get_page_setup().is_none());
        editor.create_song("Page", "");

        let mut setup = editor.get_page_setup().unwrap();
        assert_eq!(setup.width, 210);
        setup.width = 216;
        setup.height = 279;
        editor.set_page_setup(setup.clone()).unwrap();
        assert_eq!(editor.get_page_setup().unwrap(), setup);

        setup.score_size_proportion = 0;
        assert!(editor.set_page_setup(setup).unwrap_err().is_validation());
        assert_eq!(editor.get_page_setup().unwrap().score_size_proportion, 100);
    }
}
