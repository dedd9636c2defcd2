//! Song to timed note events
//!
//! Flattens each melodic track into note-on/note-off pairs with absolute
//! pitches and tick offsets. Percussion tracks are skipped.
//!
//! Each track keeps one running cursor from tick 0. Measures, voices and
//! beats are walked in document order and the cursor advances once per beat,
//! whether or not the beat sounds.

use std::collections::HashMap;

use crate::models::{Beat, MeasureHeader, NoteType, Song, Track};

use super::defaults::port_channel;

/// A sounding note on the projected timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    pub on_tick: u64,
    pub off_tick: u64,
}

/// Projected events of one track, sorted by onset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvents {
    /// Index of the track in the song
    pub track_index: usize,
    pub name: String,
    /// MIDI channel 0..16
    pub channel: u8,
    pub program: u8,
    pub events: Vec<NoteEvent>,
}

fn beat_ticks(beat: &Beat, tpq: u16) -> u64 {
    beat.duration.ticks(u32::from(tpq))
}

fn header_ticks(header: &MeasureHeader, tpq: u16) -> u64 {
    let length = header.length();
    let ticks = i64::from(*length.numer()) * 4 * i64::from(tpq) / i64::from(*length.denom());
    ticks.max(0) as u64
}

fn is_projected(track: &Track) -> bool {
    !track.is_percussion && !track.channel.is_percussion()
}

/// Start tick of every measure, plus the end tick of the last one
///
/// Follows the cursor of the first melodic track. A measure that track leaves
/// empty, or every measure when there is no melodic track, takes its time
/// signature length. Used to place the tempo and time-signature map.
pub fn measure_start_ticks(song: &Song, tpq: u16) -> Vec<u64> {
    let lead = song.tracks.iter().find(|t| is_projected(t));
    let mut starts = Vec::with_capacity(song.measure_count() + 1);
    let mut tick = 0u64;
    starts.push(tick);
    for (index, header) in song.measure_headers.iter().enumerate() {
        let played: u64 = lead
            .and_then(|t| t.measures.get(index))
            .map(|m| {
                m.voices
                    .iter()
                    .flat_map(|v| v.beats.iter())
                    .map(|b| beat_ticks(b, tpq))
                    .sum()
            })
            .unwrap_or(0);
        tick += if played > 0 { played } else { header_ticks(header, tpq) };
        starts.push(tick);
    }
    starts
}

/// Project every melodic track of `song`
pub fn project_events(song: &Song, tpq: u16) -> Vec<TrackEvents> {
    song.tracks
        .iter()
        .enumerate()
        .filter(|(_, track)| is_projected(track))
        .map(|(index, track)| project_track(index, track, tpq))
        .collect()
}

fn project_track(index: usize, track: &Track, tpq: u16) -> TrackEvents {
    let mut events: Vec<NoteEvent> = Vec::new();
    // (voice, string) -> event the next tie on that string extends
    let mut sounding: HashMap<(usize, u8), usize> = HashMap::new();
    let mut cursor = 0u64;

    for (m, measure) in track.measures.iter().enumerate() {
        for (v, voice) in measure.voices.iter().enumerate() {
            for beat in &voice.beats {
                let end = cursor + beat_ticks(beat, tpq);
                for note in &beat.notes {
                    if note.kind == NoteType::Rest {
                        continue;
                    }
                    if note.is_tied() {
                        if let Some(&anchor) = sounding.get(&(v, note.string)) {
                            events[anchor].off_tick = end;
                            continue;
                        }
                    }
                    let Some(pitch) = track.pitch_of(note) else {
                        log::warn!(
                            "track '{}' measure {}: note on missing string {} not projected",
                            track.name,
                            m,
                            note.string
                        );
                        continue;
                    };
                    sounding.insert((v, note.string), events.len());
                    events.push(NoteEvent {
                        pitch: pitch.clamp(0, 127) as u8,
                        velocity: note.velocity.clamp(1, 127),
                        on_tick: cursor,
                        off_tick: end,
                    });
                }
                cursor = end;
            }
        }
    }

    events.sort_by_key(|e| e.on_tick);
    log::debug!("projected {} event(s) for track '{}'", events.len(), track.name);

    TrackEvents {
        track_index: index,
        name: track.name.clone(),
        channel: port_channel(track.channel.channel),
        program: track.channel.instrument.clamp(0, 127) as u8,
        events,
    }
}
