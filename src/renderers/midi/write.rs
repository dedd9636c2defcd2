use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

use crate::error::{Result, TabError};
use crate::models::Song;

use super::converter::{measure_start_ticks, project_events, TrackEvents};
use super::defaults::tempo_to_micros;

/// Largest delta a variable-length quantity can hold
const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// Project `song` and write it as a Standard MIDI File
pub fn song_to_smf(song: &Song, tpq: u16) -> Result<Vec<u8>> {
    let tracks = project_events(song, tpq);
    let mut out = Vec::new();
    write_smf(song, &tracks, tpq, &mut out)?;
    Ok(out)
}

/// Write projected tracks to SMF format 1: a conductor track with the tempo
/// and time-signature map, then one track per projection
pub fn write_smf(song: &Song, tracks: &[TrackEvents], tpq: u16, out: &mut Vec<u8>) -> Result<()> {
    let mut smf_tracks = Vec::with_capacity(tracks.len() + 1);
    smf_tracks.push(build_conductor_track(song, tpq));
    for track in tracks {
        smf_tracks.push(build_part_track(track));
    }

    let smf = Smf {
        header: Header {
            format: Format::Parallel,
            timing: Timing::Metrical(u15::new(tpq)),
        },
        tracks: smf_tracks,
    };

    smf.write(out)
        .map_err(|e| TabError::Midi(format!("failed to write MIDI: {}", e)))?;
    Ok(())
}

/// Events at absolute ticks; `order` breaks ties so note-offs precede note-ons
struct Timed<'a> {
    tick: u64,
    order: u8,
    kind: TrackEventKind<'a>,
}

fn build_conductor_track(song: &Song, tpq: u16) -> Track<'_> {
    let starts = measure_start_ticks(song, tpq);
    let tempos = song.measure_tempos();
    let mut events = vec![Timed {
        tick: 0,
        order: 0,
        kind: TrackEventKind::Meta(MetaMessage::TrackName(song.title.as_bytes())),
    }];

    if tempos.is_empty() {
        events.push(Timed {
            tick: 0,
            order: 1,
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_to_micros(song.tempo)))),
        });
    }
    let mut last_tempo = None;
    for (index, &tempo) in tempos.iter().enumerate() {
        if last_tempo != Some(tempo) {
            events.push(Timed {
                tick: starts[index],
                order: 1,
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_to_micros(tempo)))),
            });
            last_tempo = Some(tempo);
        }
    }

    let mut last_signature = None;
    for (index, header) in song.measure_headers.iter().enumerate() {
        let signature = header.time_signature;
        if last_signature != Some((signature.numerator, signature.denominator)) {
            events.push(Timed {
                tick: starts[index],
                order: 1,
                kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
                    signature.numerator,
                    signature.denominator.max(1).trailing_zeros() as u8,
                    24, // MIDI clocks per metronome click
                    8,  // 32nd notes per quarter note
                )),
            });
            last_signature = Some((signature.numerator, signature.denominator));
        }
    }

    finish_track(events)
}

fn build_part_track(track: &TrackEvents) -> Track<'_> {
    let channel = u4::new(track.channel);
    let mut events = vec![
        Timed {
            tick: 0,
            order: 0,
            kind: TrackEventKind::Meta(MetaMessage::TrackName(track.name.as_bytes())),
        },
        Timed {
            tick: 0,
            order: 0,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(track.program),
                },
            },
        },
    ];

    for note in &track.events {
        events.push(Timed {
            tick: note.on_tick,
            order: 2,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: u7::new(note.pitch),
                    vel: u7::new(note.velocity),
                },
            },
        });
        events.push(Timed {
            tick: note.off_tick,
            order: 1,
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: u7::new(note.pitch),
                    vel: u7::new(0),
                },
            },
        });
    }

    finish_track(events)
}

/// Sort by absolute tick, convert to deltas and close the track
fn finish_track(mut events: Vec<Timed<'_>>) -> Track<'_> {
    events.sort_by_key(|e| (e.tick, e.order));
    let mut track = Vec::with_capacity(events.len() + 1);
    let mut prev_tick = 0u64;
    for event in events {
        let delta = (event.tick - prev_tick).min(MAX_DELTA) as u32;
        prev_tick = event.tick;
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: event.kind,
        });
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}
