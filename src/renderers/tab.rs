//! ASCII tablature
//!
//! One row per string, highest string on top, four measures per system.
//! Only the first voice is drawn. Dead notes show as `x`, tied notes as `~`.

use crate::models::{Beat, Measure, Note, Track};
use crate::utils::pitch_utils::{note_name, tuning_names};

pub const MEASURES_PER_LINE: usize = 4;

fn note_label(note: &Note) -> String {
    if note.is_dead() {
        "x".into()
    } else if note.is_tied() {
        "~".into()
    } else {
        note.fret.to_string()
    }
}

/// Append one beat column to every row; rows are ordered like `numbers`
fn push_beat(rows: &mut [String], numbers: &[u8], beat: &Beat) {
    let labels: Vec<Option<String>> = numbers
        .iter()
        .map(|&n| beat.note_on_string(n).map(note_label))
        .collect();
    let width = labels
        .iter()
        .flatten()
        .map(String::len)
        .max()
        .unwrap_or(1);
    for (row, label) in rows.iter_mut().zip(labels) {
        let cell = label.unwrap_or_default();
        row.push_str(&cell);
        row.push_str(&"-".repeat(width - cell.len() + 1));
    }
}

fn push_measure(rows: &mut [String], numbers: &[u8], measure: &Measure) {
    let beats = measure.voices.first().map(|v| v.beats.as_slice()).unwrap_or(&[]);
    for row in rows.iter_mut() {
        row.push_str(if beats.is_empty() { "---" } else { "-" });
    }
    for beat in beats {
        push_beat(rows, numbers, beat);
    }
    for row in rows.iter_mut() {
        row.push('|');
    }
}

pub fn render_track_tab(track: &Track) -> String {
    let mut strings = track.strings.clone();
    strings.sort_by_key(|s| s.number);
    let numbers: Vec<u8> = strings.iter().map(|s| s.number).collect();
    let values: Vec<u8> = strings.iter().map(|s| s.value).collect();

    let mut lines = vec![
        format!("Track: {}", track.name),
        format!("Tuning: {}", tuning_names(&values).join(" ")),
    ];
    if strings.is_empty() {
        return lines.join("\n");
    }

    let labels: Vec<String> = values.iter().map(|&v| note_name(i32::from(v))).collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    for system in track.measures.chunks(MEASURES_PER_LINE) {
        let mut rows: Vec<String> = labels
            .iter()
            .map(|l| format!("{:<width$}|", l, width = label_width))
            .collect();
        for measure in system {
            push_measure(&mut rows, &numbers, measure);
        }
        lines.push(String::new());
        lines.extend(rows);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Duration, NoteType};

    fn track_with_measures(count: usize) -> Track {
        let mut track = Track::new("Guitar");
        track.measures = (0..count).map(|_| Measure::new()).collect();
        track
    }

    #[test]
    fn test_single_note() {
        let mut track = track_with_measures(2);
        let mut beat = Beat::new(Duration::new(4));
        beat.set_note(Note::new(1, 3));
        track.measures[0].voices[0].beats.push(beat);

        let tab = render_track_tab(&track);
        let lines: Vec<&str> = tab.lines().collect();
        assert_eq!(lines[0], "Track: Guitar");
        assert_eq!(lines[1], "Tuning: E4 B3 G3 D3 A2 E2");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "E4|-3-|---|");
        assert_eq!(lines[4], "B3|---|---|");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_wide_frets_keep_columns_aligned() {
        let mut track = track_with_measures(1);
        let mut beat = Beat::new(Duration::new(4));
        beat.set_note(Note::new(1, 12));
        let mut dead = Note::new(3, 0);
        dead.kind = NoteType::Dead;
        beat.set_note(dead);
        track.measures[0].voices[0].beats.push(beat);

        let tab = render_track_tab(&track);
        let rows: Vec<&str> = tab.lines().skip(3).collect();
        assert_eq!(rows[0], "E4|-12-|");
        assert_eq!(rows[2], "G3|-x--|");
        assert!(rows.iter().all(|r| r.len() == rows[0].len()));
    }

    #[test]
    fn test_systems_of_four_measures() {
        let tab = render_track_tab(&track_with_measures(5));
        let systems = tab.split("\n\n").count();
        // heading plus two systems
        assert_eq!(systems, 3);
    }
}
