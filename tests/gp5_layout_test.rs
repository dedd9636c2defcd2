// Fixed byte positions of a bare one-track, one-measure GP5 file in both
// revisions, checked against the documented section sizes rather than the
// reader

use gp_editor::converters::gp5::{decode, encode};
use gp_editor::models::{Beat, Duration, FormatVersion, MeasureHeader, PageSetup, Song, Track};

/// Offsets that differ between the two revisions
struct Layout {
    tempo: usize,
    channels: usize,
    measure_count: usize,
    track_start: usize,
    track_end: usize,
    padding: usize,
    len: usize,
}

const V500: Layout = Layout {
    tempo: 209,
    channels: 218,
    measure_count: 1028,
    track_start: 1047,
    track_end: 1190,
    padding: 2,
    len: 1206,
};

const V510: Layout = Layout {
    tempo: 228,
    channels: 238,
    measure_count: 1048,
    track_start: 1067,
    track_end: 1225,
    padding: 1,
    len: 1240,
};

fn bare_song(version: FormatVersion) -> Song {
    let mut song = Song {
        version,
        tempo_name: String::new(),
        tempo: 133,
        page_setup: PageSetup {
            title: String::new(),
            subtitle: String::new(),
            artist: String::new(),
            album: String::new(),
            words: String::new(),
            music: String::new(),
            words_and_music: String::new(),
            copyright: [String::new(), String::new()],
            page_number: String::new(),
            ..PageSetup::default()
        },
        ..Song::default()
    };
    let mut track = Track::new("Lead");
    track.channel.channel = 0;
    track.channel.effect_channel = 1;
    track.channel.instrument = 25;
    track.channel.volume = 104;
    song.add_track(track);
    song.add_measure_header(MeasureHeader::default()).unwrap();
    song.tracks[0].measures[0].voices[0]
        .beats
        .push(Beat::new(Duration::new(4)));
    song
}

fn int_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn short_at(bytes: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

fn assert_layout(version: FormatVersion, layout: &Layout) {
    let song = bare_song(version);
    let bytes = encode(&song);
    assert_eq!(bytes.len(), layout.len);

    assert_eq!(bytes[0], 24);
    assert_eq!(&bytes[1..25], version.version_string().as_bytes());
    assert_eq!(int_at(&bytes, layout.tempo), 133);

    // 64 slots of instrument int, six mixer bytes and two padding bytes
    let slot = |index: usize| layout.channels + index * 12;
    assert_eq!(int_at(&bytes, slot(0)), 25);
    assert_eq!(bytes[slot(0) + 4], 13);
    assert_eq!(bytes[slot(0) + 5], 8);
    assert_eq!(int_at(&bytes, slot(1)), 25);
    assert_eq!(int_at(&bytes, slot(2)), 24);
    assert_eq!(int_at(&bytes, slot(9)), -1);
    assert_eq!(int_at(&bytes, slot(63)), 24);
    // first direction slot follows the table
    assert_eq!(short_at(&bytes, slot(64)), -1);

    assert_eq!(int_at(&bytes, layout.measure_count), 1);
    assert_eq!(int_at(&bytes, layout.measure_count + 4), 1);
    // first header: all of time signature, key and beams present
    assert_eq!(bytes[layout.measure_count + 8], 0x43);

    let track = layout.track_start;
    assert_eq!(bytes[track + 2], 4);
    assert_eq!(&bytes[track + 3..track + 7], b"Lead");
    assert_eq!(int_at(&bytes, track + 43), 6);
    assert_eq!(int_at(&bytes, track + 47), 64);
    assert_eq!(int_at(&bytes, track + 79), 1);
    assert_eq!(int_at(&bytes, track + 83), 2);

    let measure = layout.track_end + layout.padding;
    assert!(bytes[layout.track_end..measure].iter().all(|&b| b == 0));
    assert_eq!(int_at(&bytes, measure), 1);
    // beat flags, quarter duration code, empty string mask, display flags
    assert_eq!(&bytes[measure + 4..measure + 9], &[0, 0, 0, 0, 0]);
    assert_eq!(int_at(&bytes, measure + 9), 0);
    assert_eq!(bytes[measure + 13], 0);

    assert_eq!(decode(&bytes).unwrap(), song);
}

#[test]
fn test_v500_layout() {
    assert_layout(FormatVersion::V500, &V500);
}

#[test]
fn test_v510_layout() {
    assert_layout(FormatVersion::V510, &V510);
}

#[test]
fn test_revisions_differ_only_where_expected() {
    let old = encode(&bare_song(FormatVersion::V500));
    let new = encode(&bare_song(FormatVersion::V510));
    // master effect (19) + hide tempo (1) + per-track RSE tail (4 + 4 + 10 - 3)
    // - one padding byte after the tracks
    assert_eq!(new.len() - old.len(), 19 + 1 + 15 - 1);
}
