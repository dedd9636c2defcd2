//! Song structure: repeats, sections and navigation signs
//!
//! Repeat groups are never edited directly. Operations set flags on the
//! measure headers and the groups are rebuilt from those flags.

use super::helpers::{field_text, validate_index, validate_range};
use super::types::{RepeatGroupInfo, SectionInfo, SongStructure, StructureMark, StructureMarkKind};
use super::TabEditor;
use crate::error::{invalid, Result};
use crate::models::{Color, DirectionSign, Marker, Song};

/// Beat texts containing one of these words start a section
const SECTION_KEYWORDS: [&str; 7] = ["intro", "verse", "chorus", "bridge", "solo", "outro", "coda"];

impl TabEditor {
    /// Repeat measures `start..=end` `repeat_count` times
    ///
    /// `endings` lists the alternative ending numbers (1..=8) carried by the
    /// last measure of the range; pass an empty slice for a plain repeat.
    pub fn add_repeat_group(
        &mut self,
        start: usize,
        end: usize,
        repeat_count: u8,
        endings: &[u8],
    ) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_index(end, song.measure_count(), "measure")?;
        if start > end {
            return invalid(format!("repeat starts at {} after its end {}", start, end));
        }
        validate_range(repeat_count, 1..=127, "repeat count")?;
        for &ending in endings {
            validate_range(ending, 1..=8, "alternative ending")?;
        }

        song.measure_headers[start].repeat_open = true;
        let last = &mut song.measure_headers[end];
        last.repeat_close = repeat_count;
        last.repeat_alternative = endings.iter().fold(0, |mask, n| mask | 1 << (n - 1));
        song.rebuild_repeat_groups();
        log::debug!(
            "repeat over measures {}..={} x{} ({} group(s) now)",
            start,
            end,
            repeat_count,
            song.repeat_groups.len()
        );
        Ok(())
    }

    /// Groups that carry a repeat sign, in song order
    pub fn get_repeat_groups(&self) -> Vec<RepeatGroupInfo> {
        self.song().map(repeat_groups).unwrap_or_default()
    }

    /// Mark `measure` as the start of a section named `name`
    ///
    /// Extra `text` goes on the marker's second line.
    pub fn add_section(
        &mut self,
        measure: usize,
        name: &str,
        text: Option<&str>,
        color: Option<Color>,
    ) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_index(measure, song.measure_count(), "measure")?;
        if name.trim().is_empty() {
            return invalid("section name is empty");
        }
        let mut marker = Marker::new(field_text(&match text {
            Some(text) if !text.is_empty() => format!("{}\n{}", name, text),
            _ => name.to_string(),
        }));
        if let Some(color) = color {
            marker.color = color;
        }
        song.measure_headers[measure].marker = Some(marker);
        Ok(())
    }

    pub fn get_sections(&self) -> Vec<SectionInfo> {
        self.song().map(sections).unwrap_or_default()
    }

    /// Anchor the coda sign on `measure`, moving it off any other measure
    pub fn add_coda(&mut self, measure: usize) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_index(measure, song.measure_count(), "measure")?;
        for header in &mut song.measure_headers {
            header.directions.retain(|&d| d != DirectionSign::Coda);
        }
        let directions = &mut song.measure_headers[measure].directions;
        let pos = directions
            .iter()
            .position(|d| d.index() > DirectionSign::Coda.index())
            .unwrap_or(directions.len());
        directions.insert(pos, DirectionSign::Coda);
        Ok(())
    }

    pub fn add_double_bar(&mut self, measure: usize) -> Result<()> {
        let song = self.loaded_mut()?;
        validate_index(measure, song.measure_count(), "measure")?;
        song.measure_headers[measure].double_bar = true;
        Ok(())
    }

    pub fn get_song_structure(&self) -> Option<SongStructure> {
        let song = self.song()?;
        Some(SongStructure {
            sections: sections(song),
            repeat_groups: repeat_groups(song),
            markers: marks(song),
        })
    }
}

fn repeat_groups(song: &Song) -> Vec<RepeatGroupInfo> {
    song.repeat_groups
        .iter()
        .filter(|group| group.has_repeat(&song.measure_headers))
        .map(|group| {
            let headers = group.headers.iter().filter_map(|&i| song.measure_headers.get(i));
            let mut repeat_count = 0;
            let mut mask = 0u8;
            for header in headers {
                repeat_count = repeat_count.max(header.repeat_close);
                mask |= header.repeat_alternative;
            }
            RepeatGroupInfo {
                repeat_count,
                endings: (0..8u8).filter(|bit| mask & (1 << bit) != 0).map(|bit| bit + 1).collect(),
                measures: group.headers.clone(),
                is_closed: group.closed,
            }
        })
        .collect()
}

/// Section name starting at a measure, if any
///
/// A beat text naming a section wins over the measure's marker.
fn section_start(song: &Song, measure: usize) -> Option<String> {
    let keyword_text = song
        .tracks
        .iter()
        .filter_map(|track| track.measures.get(measure))
        .flat_map(|m| m.beats())
        .filter_map(|beat| beat.text.as_deref())
        .find(|text| {
            let lower = text.to_lowercase();
            SECTION_KEYWORDS.iter().any(|k| lower.contains(k))
        });
    if let Some(text) = keyword_text {
        return Some(text.trim().to_string());
    }
    song.measure_headers[measure]
        .marker
        .as_ref()
        .and_then(|m| m.title.lines().next())
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

fn sections(song: &Song) -> Vec<SectionInfo> {
    let count = song.measure_count();
    let starts: Vec<(usize, String)> = (0..count)
        .filter_map(|i| section_start(song, i).map(|name| (i, name)))
        .collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, (start, name))| SectionInfo {
            name: name.clone(),
            start_measure: *start,
            end_measure: starts.get(n + 1).map_or(count - 1, |(next, _)| next - 1),
        })
        .collect()
}

fn marks(song: &Song) -> Vec<StructureMark> {
    let mut marks = Vec::new();
    for (measure, header) in song.measure_headers.iter().enumerate() {
        let mark = |kind, text: Option<String>| StructureMark {
            kind,
            measure,
            text,
            track: None,
            beat: None,
        };
        if let Some(marker) = &header.marker {
            marks.push(mark(StructureMarkKind::Marker, Some(marker.title.clone())));
        }
        if header.double_bar {
            marks.push(mark(StructureMarkKind::DoubleBar, None));
        }
        for direction in &header.directions {
            marks.push(mark(StructureMarkKind::Direction, Some(direction.label().to_string())));
        }
        for (track_index, track) in song.tracks.iter().enumerate() {
            let Some(content) = track.measures.get(measure) else {
                continue;
            };
            for voice in &content.voices {
                for (beat_index, beat) in voice.beats.iter().enumerate() {
                    if let Some(text) = &beat.text {
                        marks.push(StructureMark {
                            kind: StructureMarkKind::Text,
                            measure,
                            text: Some(text.clone()),
                            track: Some(track_index),
                            beat: Some(beat_index),
                        });
                    }
                }
            }
        }
    }
    marks
}
