//! Pitch naming helpers shared by the tab renderer and the query operations

use crate::models::PITCH_CLASS_NAMES;

/// Pitch class name of a MIDI note value, sharps only
pub fn pitch_class_name(value: i32) -> &'static str {
    PITCH_CLASS_NAMES[value.rem_euclid(12) as usize]
}

/// Scientific pitch name of a MIDI note value: 60 is "C4", 40 is "E2"
pub fn note_name(value: i32) -> String {
    format!("{}{}", pitch_class_name(value), value.div_euclid(12) - 1)
}

/// Names of a tuning, string 1 first
pub fn tuning_names(values: &[u8]) -> Vec<String> {
    values.iter().map(|&v| note_name(i32::from(v))).collect()
}
