//! Interchange tree codec
//!
//! Converts a [`Song`] to and from a nested key/value tree that serializes as
//! JSON or YAML. The tree is a lossy, human-editable view: effects collapse to
//! on/off switches and binary-only details (RSE, page setup, display flags)
//! are left out.
//!
//! Measure headers live on the first track only. Its measures create the
//! song's headers, in order; every later track's measures attach to those
//! headers by position, are padded with empty measures when short and lose
//! their extra measures when long.

pub mod types;

pub use types::*;

use crate::error::InterchangeError;
use crate::models::{
    slide, strings_are_contiguous, standard_strings, Barre, Beat, Bend, Chord, Color, DirectionSign,
    Duration, GuitarString, Harmonic, KeySignature, LyricLine, Marker, Measure, MeasureHeader,
    MidiChannel, Note, NoteType, Song, TimeSignature, Track, Tuplet, MAX_BARRES, MAX_FRET,
    MAX_MEASURE_HEADERS, MAX_STRINGS, LYRIC_LINES, VOICES_PER_MEASURE,
};

pub type InterchangeResult<T> = std::result::Result<T, InterchangeError>;

// ----------------------------------------------------------------------------
// Song -> tree
// ----------------------------------------------------------------------------

pub fn to_tree(song: &Song) -> SongTree {
    SongTree {
        metadata: metadata_to_tree(song),
        tracks: song
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| track_to_tree(song, index, track))
            .collect(),
    }
}

fn metadata_to_tree(song: &Song) -> MetadataTree {
    MetadataTree {
        title: song.title.clone(),
        subtitle: song.subtitle.clone(),
        artist: song.artist.clone(),
        album: song.album.clone(),
        words: song.words.clone(),
        music: song.music.clone(),
        copyright: song.copyright.clone(),
        tab: song.tab.clone(),
        instructions: song.instructions.clone(),
        notice: song.notice.clone(),
        tempo: song.tempo,
        tempo_name: song.tempo_name.clone(),
        key: song.key,
        lyrics: LyricsTree {
            track: song.lyrics.track_choice,
            lines: song
                .lyrics
                .lines
                .iter()
                .map(|line| LyricLineTree {
                    starting_measure: line.starting_measure,
                    text: line.text.clone(),
                })
                .collect(),
        },
    }
}

fn track_to_tree(song: &Song, index: usize, track: &Track) -> TrackTree {
    let channel = &track.channel;
    TrackTree {
        name: track.name.clone(),
        index,
        is_percussion: track.is_percussion,
        channel: ChannelTree {
            channel: Some(channel.channel),
            effect_channel: Some(channel.effect_channel),
            instrument: channel.instrument,
            volume: channel.volume,
            balance: channel.balance,
            chorus: channel.chorus,
            reverb: channel.reverb,
            phaser: channel.phaser,
            tremolo: channel.tremolo,
        },
        strings: track
            .strings
            .iter()
            .map(|s| StringTree {
                number: s.number,
                value: s.value,
            })
            .collect(),
        fret_count: track.fret_count,
        offset: track.offset,
        measures: track
            .measures
            .iter()
            .enumerate()
            .map(|(m, measure)| MeasureTree {
                index: Some(m),
                header: if index == 0 {
                    song.measure_headers.get(m).map(header_to_tree)
                } else {
                    None
                },
                voices: measure
                    .voices
                    .iter()
                    .enumerate()
                    .map(|(v, voice)| VoiceTree {
                        index: v,
                        beats: voice
                            .beats
                            .iter()
                            .enumerate()
                            .map(|(b, beat)| beat_to_tree(b, beat))
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn header_to_tree(header: &MeasureHeader) -> HeaderTree {
    HeaderTree {
        numerator: header.time_signature.numerator,
        denominator: header.time_signature.denominator,
        key: header.key_signature.key,
        minor: header.key_signature.minor,
        repeat_open: header.repeat_open,
        repeat_close: header.repeat_close,
        repeat_alternative: header.repeat_alternative,
        marker: header.marker.as_ref().map(|m| MarkerTree {
            title: m.title.clone(),
            color: [m.color.r, m.color.g, m.color.b],
        }),
        double_bar: header.double_bar,
        triplet_feel: header.triplet_feel,
        directions: header
            .directions
            .iter()
            .map(|d| d.label().to_string())
            .collect(),
    }
}

fn beat_to_tree(index: usize, beat: &Beat) -> BeatTree {
    BeatTree {
        index,
        duration: DurationTree {
            value: u32::from(beat.duration.value),
            is_dotted: beat.duration.dotted,
            is_rest: beat.is_rest(),
            tuplet_enters: beat.duration.tuplet.enters,
            tuplet_times: beat.duration.tuplet.times,
        },
        text: beat.text.clone(),
        chord: beat.chord.as_ref().map(chord_to_tree),
        notes: beat.notes.iter().map(note_to_tree).collect(),
    }
}

fn note_to_tree(note: &Note) -> NoteTree {
    let effect = &note.effect;
    NoteTree {
        string: note.string,
        value: i32::from(note.fret),
        velocity: note.velocity,
        is_tied: note.is_tied(),
        is_dead: note.is_dead(),
        effect: NoteEffectTree {
            bend: effect.bend.is_some(),
            harmonic: effect.harmonic.is_some(),
            ghost: effect.ghost,
            slide: effect.is_slide(),
            vibrato: effect.vibrato,
            hammer: effect.hammer,
            let_ring: effect.let_ring,
            palm_mute: effect.palm_mute,
            staccato: effect.staccato,
            accentuated: effect.accentuated,
            heavy_accentuated: effect.heavy_accentuated,
        },
    }
}

pub fn chord_to_tree(chord: &Chord) -> ChordTree {
    ChordTree {
        name: chord.name.clone(),
        root: chord.root,
        kind: chord.kind,
        extension: chord.extension,
        bass: chord.bass,
        tonality: chord.tonality,
        fifth: chord.fifth,
        ninth: chord.ninth,
        eleventh: chord.eleventh,
        first_fret: chord.first_fret,
        strings: chord.strings.clone(),
        barres: chord
            .barres
            .iter()
            .map(|b| BarreTree {
                fret: b.fret,
                start: b.start,
                end: b.end,
            })
            .collect(),
        fingerings: chord.fingerings[..chord.strings.len().min(7)].to_vec(),
        show: chord.show,
    }
}

// ----------------------------------------------------------------------------
// tree -> Song
// ----------------------------------------------------------------------------

/// Build a song from a tree, normalizing whatever does not fit the model
pub fn from_tree(tree: SongTree) -> Song {
    let mut song = Song::new();
    apply_metadata(&mut song, tree.metadata);

    for (index, track_tree) in tree.tracks.into_iter().enumerate() {
        let mut track = track_from_tree(&song, &track_tree);
        if index == 0 {
            headers_from_measures(&mut song, &track_tree.measures);
        }
        let count = song.measure_headers.len();
        let mut measures = vec![Measure::new(); count];
        for (position, measure_tree) in track_tree.measures.iter().enumerate() {
            // the first track's measures define the headers in list order
            let slot = if index == 0 {
                position
            } else {
                measure_tree.index.unwrap_or(position)
            };
            if slot >= count {
                log::warn!(
                    "track '{}': measure {} has no header among {}, dropping it",
                    track.name,
                    slot,
                    count
                );
                continue;
            }
            measures[slot] = measure_from_tree(&track, slot, measure_tree);
        }
        track.measures = measures;
        song.add_track(track);
    }

    song.rebuild_repeat_groups();
    song
}

fn apply_metadata(song: &mut Song, meta: MetadataTree) {
    song.title = meta.title;
    song.subtitle = meta.subtitle;
    song.artist = meta.artist;
    song.album = meta.album;
    song.words = meta.words;
    song.music = meta.music;
    song.copyright = meta.copyright;
    song.tab = meta.tab;
    song.instructions = meta.instructions;
    song.notice = meta.notice;
    song.tempo_name = meta.tempo_name;
    song.key = meta.key;
    if meta.tempo > 0 {
        song.tempo = meta.tempo;
    } else {
        log::warn!("ignoring non-positive tempo {}", meta.tempo);
    }

    song.lyrics.track_choice = meta.lyrics.track;
    if meta.lyrics.lines.len() > LYRIC_LINES {
        log::warn!(
            "{} lyric lines given, keeping the first {}",
            meta.lyrics.lines.len(),
            LYRIC_LINES
        );
    }
    for (slot, line) in song.lyrics.lines.iter_mut().zip(meta.lyrics.lines) {
        *slot = LyricLine {
            starting_measure: line.starting_measure,
            text: line.text,
        };
    }
}

fn track_from_tree(song: &Song, tree: &TrackTree) -> Track {
    let mut track = Track::new(tree.name.clone());
    track.is_percussion = tree.is_percussion;
    track.strings = strings_from_tree(&tree.name, &tree.strings);
    track.fret_count = tree.fret_count;
    track.offset = tree.offset;

    let (free, free_effect) = song.next_free_channel(tree.is_percussion);
    let c = &tree.channel;
    track.channel = MidiChannel {
        channel: c.channel.filter(|&ch| ch < 64).unwrap_or(free),
        effect_channel: c.effect_channel.filter(|&ch| ch < 64).unwrap_or(free_effect),
        instrument: c.instrument.clamp(0, 127),
        volume: c.volume.min(127),
        balance: c.balance.min(127),
        chorus: c.chorus.min(127),
        reverb: c.reverb.min(127),
        phaser: c.phaser.min(127),
        tremolo: c.tremolo.min(127),
        ..MidiChannel::default()
    };
    track
}

fn strings_from_tree(track_name: &str, tree: &[StringTree]) -> Vec<GuitarString> {
    if tree.is_empty() {
        return standard_strings();
    }
    let mut strings: Vec<GuitarString> = tree
        .iter()
        .map(|s| GuitarString {
            number: s.number,
            value: s.value.min(127),
        })
        .collect();
    strings.sort_by_key(|s| s.number);
    if strings.len() > MAX_STRINGS {
        log::warn!(
            "track '{}' has {} strings, keeping the first {}",
            track_name,
            strings.len(),
            MAX_STRINGS
        );
        strings.truncate(MAX_STRINGS);
    }
    if !strings_are_contiguous(&strings) {
        log::warn!("track '{}' string numbers are not 1..n, renumbering", track_name);
        for (i, s) in strings.iter_mut().enumerate() {
            s.number = (i + 1) as u8;
        }
    }
    strings
}

fn headers_from_measures(song: &mut Song, measures: &[MeasureTree]) {
    if measures.len() > MAX_MEASURE_HEADERS {
        log::warn!(
            "{} measures given, keeping the first {}",
            measures.len(),
            MAX_MEASURE_HEADERS
        );
    }
    for measure in measures.iter().take(MAX_MEASURE_HEADERS) {
        let header = match &measure.header {
            Some(tree) => header_from_tree(tree),
            None => match song.measure_headers.last() {
                Some(last) => MeasureHeader {
                    time_signature: last.time_signature,
                    key_signature: last.key_signature,
                    ..Default::default()
                },
                None => MeasureHeader::default(),
            },
        };
        song.measure_headers.push(header);
    }
}

fn header_from_tree(tree: &HeaderTree) -> MeasureHeader {
    let numerator = if tree.numerator >= 1 {
        tree.numerator
    } else {
        log::warn!("time signature numerator 0 replaced with 4");
        4
    };
    let denominator = if Duration::is_valid_value(u32::from(tree.denominator)) {
        tree.denominator
    } else {
        log::warn!("time signature denominator {} replaced with 4", tree.denominator);
        4
    };

    let mut directions: Vec<DirectionSign> = tree
        .directions
        .iter()
        .filter_map(|label| {
            let sign = DirectionSign::from_label(label);
            if sign.is_none() {
                log::warn!("unknown direction sign '{}' dropped", label);
            }
            sign
        })
        .collect();
    directions.sort_by_key(|d| d.index());
    directions.dedup();

    MeasureHeader {
        time_signature: TimeSignature::new(numerator, denominator),
        key_signature: KeySignature {
            key: tree.key.clamp(-7, 7),
            minor: tree.minor,
        },
        repeat_open: tree.repeat_open,
        repeat_close: tree.repeat_close,
        repeat_alternative: tree.repeat_alternative,
        marker: tree.marker.as_ref().map(|m| Marker {
            title: m.title.clone(),
            color: Color {
                r: m.color[0],
                g: m.color[1],
                b: m.color[2],
            },
        }),
        double_bar: tree.double_bar,
        triplet_feel: tree.triplet_feel,
        directions,
        repeat_group: None,
    }
}

fn measure_from_tree(track: &Track, slot: usize, tree: &MeasureTree) -> Measure {
    let mut measure = Measure::new();
    if tree.voices.len() > VOICES_PER_MEASURE {
        log::warn!(
            "measure {} of track '{}' has {} voices, keeping {}",
            slot,
            track.name,
            tree.voices.len(),
            VOICES_PER_MEASURE
        );
    }
    for (voice, voice_tree) in measure.voices.iter_mut().zip(&tree.voices) {
        voice.beats = voice_tree
            .beats
            .iter()
            .map(|b| beat_from_tree(track, b))
            .collect();
    }
    measure
}

fn duration_from_tree(tree: &DurationTree) -> Duration {
    let value = if Duration::is_valid_value(tree.value) {
        tree.value as u8
    } else {
        log::warn!("duration value {} replaced with a quarter", tree.value);
        4
    };
    let tuplet = match Tuplet::from_enters(i32::from(tree.tuplet_enters)) {
        Some(t) if t.times == tree.tuplet_times => t,
        Some(t) => {
            log::warn!(
                "tuplet {}:{} normalized to {}:{}",
                tree.tuplet_enters,
                tree.tuplet_times,
                t.enters,
                t.times
            );
            t
        }
        None => {
            log::warn!("unsupported tuplet {} dropped", tree.tuplet_enters);
            Tuplet::NONE
        }
    };
    Duration {
        value,
        dotted: tree.is_dotted,
        tuplet,
    }
}

fn beat_from_tree(track: &Track, tree: &BeatTree) -> Beat {
    let duration = duration_from_tree(&tree.duration);
    let mut beat = if tree.duration.is_rest {
        if !tree.notes.is_empty() {
            log::warn!("rest beat with {} note(s), notes dropped", tree.notes.len());
        }
        Beat::rest(duration)
    } else {
        let mut beat = Beat::new(duration);
        for note in &tree.notes {
            if track.string(note.string).is_none() {
                log::warn!(
                    "note on string {} dropped: track '{}' has {} strings",
                    note.string,
                    track.name,
                    track.strings.len()
                );
                continue;
            }
            beat.set_note(note_from_tree(note));
        }
        beat
    };
    beat.text = tree.text.clone();
    beat.chord = tree
        .chord
        .as_ref()
        .map(|c| chord_from_tree(c, track.strings.len()));
    beat
}

fn note_from_tree(tree: &NoteTree) -> Note {
    if !(0..=i32::from(MAX_FRET)).contains(&tree.value) {
        log::warn!("fret {} clamped to 0..={}", tree.value, MAX_FRET);
    }
    let mut note = Note::new(tree.string, tree.value.clamp(0, i32::from(MAX_FRET)) as u8);
    note.velocity = tree.velocity.min(127);
    note.kind = if tree.is_dead {
        NoteType::Dead
    } else if tree.is_tied {
        NoteType::Tie
    } else {
        NoteType::Normal
    };

    let e = &tree.effect;
    let effect = &mut note.effect;
    effect.bend = e.bend.then(Bend::full_step);
    effect.harmonic = e.harmonic.then_some(Harmonic::Natural);
    effect.slide = if e.slide { slide::SHIFT_SLIDE_TO } else { 0 };
    effect.ghost = e.ghost;
    effect.vibrato = e.vibrato;
    effect.hammer = e.hammer;
    effect.let_ring = e.let_ring;
    effect.palm_mute = e.palm_mute;
    effect.staccato = e.staccato;
    effect.accentuated = e.accentuated;
    effect.heavy_accentuated = e.heavy_accentuated;
    note
}

/// Build a chord diagram sized for a track with `string_count` strings
pub fn chord_from_tree(tree: &ChordTree, string_count: usize) -> Chord {
    let count = string_count.min(MAX_STRINGS);
    let mut chord = Chord::new(tree.name.clone(), count);
    chord.root = tree.root % 12;
    chord.kind = tree.kind;
    chord.extension = tree.extension;
    chord.bass = tree.bass;
    chord.tonality = tree.tonality;
    chord.fifth = tree.fifth;
    chord.ninth = tree.ninth;
    chord.eleventh = tree.eleventh;
    chord.first_fret = tree.first_fret;
    chord.show = tree.show;

    if tree.strings.len() > count {
        log::warn!(
            "chord '{}' lists {} strings, keeping {}",
            tree.name,
            tree.strings.len(),
            count
        );
    }
    for (slot, &fret) in chord.strings.iter_mut().zip(&tree.strings) {
        *slot = fret.clamp(-1, i32::from(MAX_FRET));
    }
    for (slot, &finger) in chord.fingerings.iter_mut().zip(&tree.fingerings) {
        *slot = finger;
    }

    if tree.barres.len() > MAX_BARRES {
        log::warn!("chord '{}' has {} barres, keeping {}", tree.name, tree.barres.len(), MAX_BARRES);
    }
    chord.barres = tree
        .barres
        .iter()
        .take(MAX_BARRES)
        .map(|b| Barre {
            fret: b.fret,
            start: b.start,
            end: b.end,
        })
        .collect();
    chord
}

// ----------------------------------------------------------------------------
// Generic trees and text
// ----------------------------------------------------------------------------

/// The song as a generic JSON value tree
pub fn to_value(song: &Song) -> InterchangeResult<serde_json::Value> {
    Ok(serde_json::to_value(to_tree(song))?)
}

/// Read a generic value tree; the root must be a mapping
pub fn from_value(value: serde_json::Value) -> InterchangeResult<Song> {
    if !value.is_object() {
        return Err(InterchangeError::NotAMapping);
    }
    let tree: SongTree = serde_json::from_value(value)?;
    Ok(from_tree(tree))
}

pub fn to_json_string(song: &Song) -> InterchangeResult<String> {
    Ok(serde_json::to_string_pretty(&to_tree(song))?)
}

pub fn from_json_str(text: &str) -> InterchangeResult<Song> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    from_value(value)
}

pub fn to_yaml_string(song: &Song) -> InterchangeResult<String> {
    Ok(serde_yaml::to_string(&to_tree(song))?)
}

pub fn from_yaml_str(text: &str) -> InterchangeResult<Song> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if !value.is_mapping() {
        return Err(InterchangeError::NotAMapping);
    }
    let tree: SongTree = serde_yaml::from_value(value)?;
    Ok(from_tree(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chord;

    fn sample_song() -> Song {
        let mut song = Song::new();
        song.title = "Sample".into();
        song.tempo = 96;
        song.add_track(Track::new("Lead"));
        song.add_track(Track::new("Rhythm"));
        let mut header = MeasureHeader::new(TimeSignature::new(3, 4));
        header.marker = Some(Marker::new("Intro"));
        header.directions.push(DirectionSign::Coda);
        song.add_measure_header(header).unwrap();
        song.add_measure_header(MeasureHeader::default()).unwrap();

        let mut beat = Beat::new(Duration::new(4));
        let mut note = Note::new(2, 3);
        note.effect.hammer = true;
        beat.set_note(note);
        beat.set_note(Note::new(1, 0));
        song.tracks[0].measures[0].voices[0].beats.push(beat);
        song.tracks[1].measures[1].voices[0]
            .beats
            .push(Beat::rest(Duration::new(2)));
        song
    }

    #[test]
    fn test_tree_round_trip_keeps_structure() {
        let song = sample_song();
        let back = from_tree(to_tree(&song));

        assert_eq!(back.title, "Sample");
        assert_eq!(back.tempo, 96);
        assert_eq!(back.tracks.len(), 2);
        assert_eq!(back.measure_count(), 2);
        assert!(back.is_consistent());
        assert_eq!(back.measure_headers[0].time_signature.numerator, 3);
        assert_eq!(back.measure_headers[0].directions, vec![DirectionSign::Coda]);
        assert_eq!(back.measure_headers[0].marker.as_ref().unwrap().title, "Intro");

        let beat = &back.tracks[0].measures[0].voices[0].beats[0];
        assert_eq!(beat.notes.len(), 2);
        assert_eq!(beat.notes[0].string, 1);
        assert!(beat.notes[1].effect.hammer);
        assert!(back.tracks[1].measures[1].voices[0].beats[0].is_rest());
    }

    #[test]
    fn test_headers_only_on_first_track() {
        let tree = to_tree(&sample_song());
        assert!(tree.tracks[0].measures.iter().all(|m| m.header.is_some()));
        assert!(tree.tracks[1].measures.iter().all(|m| m.header.is_none()));
    }

    #[test]
    fn test_later_track_is_padded_and_trimmed() {
        let mut tree = to_tree(&sample_song());
        tree.tracks[1].measures.truncate(1);
        let song = from_tree(tree.clone());
        assert_eq!(song.tracks[1].measures.len(), 2);

        tree.tracks[1].measures = vec![MeasureTree::default(); 5];
        let song = from_tree(tree);
        assert_eq!(song.tracks[1].measures.len(), 2);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let song = from_json_str(r#"{"tracks": [{"name": "G", "measures": [{"voices": [{"beats": [{"notes": [{"string": 3, "value": 5}]}]}]}]}]}"#).unwrap();
        assert_eq!(song.tempo, 120);
        let track = &song.tracks[0];
        assert_eq!(track.strings.len(), 6);
        let note = &track.measures[0].voices[0].beats[0].notes[0];
        assert_eq!(note.velocity, 95);
        assert_eq!(note.fret, 5);
        assert_eq!(track.measures[0].voices[0].beats[0].duration.value, 4);
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        assert!(matches!(
            from_value(serde_json::json!([1, 2, 3])),
            Err(InterchangeError::NotAMapping)
        ));
        assert!(matches!(from_yaml_str("- a\n- b\n"), Err(InterchangeError::NotAMapping)));
    }

    #[test]
    fn test_notes_on_missing_strings_are_dropped() {
        let json = r#"{"tracks": [{"strings": [{"number": 1, "value": 43}, {"number": 2, "value": 38}],
            "measures": [{"voices": [{"beats": [{"notes": [{"string": 2, "value": 1}, {"string": 5, "value": 1}]}]}]}]}]}"#;
        let song = from_json_str(json).unwrap();
        let beat = &song.tracks[0].measures[0].voices[0].beats[0];
        assert_eq!(beat.notes.len(), 1);
        assert_eq!(beat.notes[0].string, 2);
    }

    #[test]
    fn test_chord_strings_fit_track() {
        let mut chord = Chord::new("E", 6);
        chord.strings = vec![0, 0, 1, 2, 2, 0];
        let tree = chord_to_tree(&chord);
        let back = chord_from_tree(&tree, 4);
        assert_eq!(back.strings, vec![0, 0, 1, 2]);
        let back = chord_from_tree(&tree, 7);
        assert_eq!(back.strings, vec![0, 0, 1, 2, 2, 0, -1]);
    }

    #[test]
    fn test_yaml_text_round_trip() {
        let text = to_yaml_string(&sample_song()).unwrap();
        let song = from_yaml_str(&text).unwrap();
        assert_eq!(song.title, "Sample");
        assert_eq!(song.measure_count(), 2);
    }
}
