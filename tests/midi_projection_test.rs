// Note-event projection and Standard MIDI File export from edited songs

use gp_editor::{BeatRef, NoteEffects, TabEditor};
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

const TPQ: u16 = 480;

fn two_measure_song() -> TabEditor {
    let mut editor = TabEditor::new();
    editor.create_song("Events", "");
    editor.add_measure_header().unwrap();
    editor
}

#[test]
fn test_chord_beats_advance_cursor_once() {
    let mut editor = two_measure_song();
    // E minor shape on the first beat, then a single note
    editor.add_note(BeatRef::new(0, 0, 0, 0), 6, 0, 4).unwrap();
    editor.add_note(BeatRef::new(0, 0, 0, 0), 5, 2, 4).unwrap();
    editor.add_note(BeatRef::new(0, 0, 0, 0), 4, 2, 4).unwrap();
    editor.add_note(BeatRef::new(0, 0, 0, 1), 1, 0, 4).unwrap();

    let tracks = editor.project_events(TPQ);
    assert_eq!(tracks.len(), 1);
    let events = &tracks[0].events;
    assert_eq!(events.len(), 4);
    assert!(events[..3].iter().all(|e| e.on_tick == 0 && e.off_tick == 480));
    assert_eq!(events[3].on_tick, 480);
    assert_eq!(events[3].pitch, 64);

    let pitches: Vec<u8> = events[..3].iter().map(|e| e.pitch).collect();
    assert!(pitches.contains(&40) && pitches.contains(&47) && pitches.contains(&52));
}

#[test]
fn test_each_track_keeps_its_own_cursor() {
    let mut editor = two_measure_song();
    editor.add_track("Second").unwrap();
    // Track 0 writes a half note then a quarter; track 1 a single whole note
    editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 0, 2).unwrap();
    editor.add_note(BeatRef::new(1, 0, 0, 0), 1, 0, 1).unwrap();
    editor.add_note(BeatRef::new(0, 1, 0, 0), 1, 1, 4).unwrap();

    let tracks = editor.project_events(TPQ);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].events[1].on_tick, 2 * 480);
    assert_eq!(tracks[1].events[0].off_tick, 4 * 480);
}

#[test]
fn test_empty_first_measure_does_not_delay_onset() {
    let mut editor = two_measure_song();
    editor.add_note(BeatRef::new(0, 1, 0, 0), 1, 0, 4).unwrap();
    let events = &editor.project_events(TPQ)[0].events;
    assert_eq!(events[0].on_tick, 0);
}

#[test]
fn test_second_voice_follows_first() {
    let mut editor = two_measure_song();
    editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 0, 4).unwrap();
    editor.add_note(BeatRef::new(0, 0, 1, 0), 2, 0, 4).unwrap();
    let onsets: Vec<u64> = editor.project_events(TPQ)[0]
        .events
        .iter()
        .map(|e| e.on_tick)
        .collect();
    assert_eq!(onsets, vec![0, 480]);
}

#[test]
fn test_ties_extend_and_velocity_carries() {
    let mut editor = two_measure_song();
    editor
        .add_note_with_effects(
            BeatRef::new(0, 0, 0, 0),
            2,
            1,
            2,
            &NoteEffects {
                velocity: Some(127),
                ..Default::default()
            },
        )
        .unwrap();
    let tie = NoteEffects {
        tied: true,
        ..Default::default()
    };
    editor.add_note_with_effects(BeatRef::new(0, 0, 0, 1), 2, 1, 2, &tie).unwrap();
    editor.add_note_with_effects(BeatRef::new(0, 1, 0, 0), 2, 1, 4, &tie).unwrap();

    let events = &editor.project_events(TPQ)[0].events;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].pitch, 60);
    assert_eq!(events[0].velocity, 127);
    assert_eq!(events[0].on_tick, 0);
    assert_eq!(events[0].off_tick, 5 * 480);
}

#[test]
fn test_projection_is_repeatable() {
    let mut editor = two_measure_song();
    for beat in 0..4 {
        editor
            .add_note(BeatRef::new(0, 0, 0, beat), 1 + beat as u8, 3, 8)
            .unwrap();
    }
    editor.add_note(BeatRef::new(0, 1, 1, 0), 3, 7, 16).unwrap();
    assert_eq!(editor.project_events(TPQ), editor.project_events(TPQ));
    assert_eq!(editor.export_midi(TPQ).unwrap(), editor.export_midi(TPQ).unwrap());
}

#[test]
fn test_exported_file_structure() {
    let mut editor = two_measure_song();
    editor.add_track("Bass").unwrap();
    editor.set_tempo(0, 150).unwrap();
    editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 0, 4).unwrap();
    editor.add_note(BeatRef::new(1, 1, 0, 0), 6, 0, 1).unwrap();

    let bytes = editor.export_midi(TPQ).expect("export should succeed");
    let smf = Smf::parse(&bytes).expect("file should parse");
    assert_eq!(smf.tracks.len(), 3);

    let tempo = smf.tracks[0].iter().find_map(|e| match e.kind {
        TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
        _ => None,
    });
    assert_eq!(tempo, Some(400_000));

    let name = smf.tracks[2].iter().find_map(|e| match e.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(name)) => Some(name.to_vec()),
        _ => None,
    });
    assert_eq!(name.as_deref(), Some(&b"Bass"[..]));

    let bass_on = smf.tracks[2].iter().find_map(|e| match e.kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. },
            ..
        } => Some((e.delta.as_int(), key.as_int())),
        _ => None,
    });
    // The bass track's cursor starts at 0 and its empty first measure takes no time
    assert_eq!(bass_on, Some((0, 40)));
}

#[test]
fn test_export_midi_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mid");
    let mut editor = two_measure_song();
    editor.add_note(BeatRef::new(0, 0, 0, 0), 1, 0, 4).unwrap();
    editor.export_midi_file(&path, TPQ).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..4], b"MThd");
}
