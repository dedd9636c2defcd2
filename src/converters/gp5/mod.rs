//! Guitar Pro 5 binary codec
//!
//! Bit-exact reader and writer for `.gp5` files, versions 5.00 and 5.10.
//! [`decode`] turns bytes into a [`crate::models::Song`], [`encode`] writes a
//! song back in the revision recorded on `Song::version`.

pub mod reader;
pub mod writer;
mod read;
mod write;

pub use read::decode;
pub use write::encode;

use crate::models::DEFAULT_INSTRUMENT;

pub(crate) const VERSION_FIELD: usize = 30;
pub const TRACK_NAME_FIELD: usize = 40;
pub const CHORD_NAME_FIELD: usize = 22;
pub(crate) const CHANNEL_SLOTS: usize = 64;
pub(crate) const DIRECTION_SLOTS: usize = 19;
/// Longest text a length-byte string can carry
pub const TEXT_FIELD: usize = 255;

/// Mixer values of one of the file's 64 channel slots
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChannelSlot {
    pub instrument: i32,
    pub volume: u8,
    pub balance: u8,
    pub chorus: u8,
    pub reverb: u8,
    pub phaser: u8,
    pub tremolo: u8,
}

impl Default for ChannelSlot {
    fn default() -> Self {
        Self {
            instrument: DEFAULT_INSTRUMENT,
            volume: 104,
            balance: 64,
            chorus: 0,
            reverb: 0,
            phaser: 0,
            tremolo: 0,
        }
    }
}

/// Channel bytes are stored in steps of 8 on the MIDI scale
pub(crate) fn channel_value_from_byte(byte: i8) -> u8 {
    (byte.clamp(0, 16) as u8) * 8
}

pub(crate) fn channel_byte_from_value(value: u8) -> i8 {
    (value.min(128) / 8) as i8
}

/// Dynamic levels 1..=8 map to velocities 15, 31, .. 127
pub(crate) fn velocity_from_dynamic(dynamic: i8) -> u8 {
    (16 * i32::from(dynamic) - 1).clamp(0, 127) as u8
}

pub(crate) fn dynamic_from_velocity(velocity: u8) -> i8 {
    ((i32::from(velocity) + 1) / 16).clamp(0, 8) as i8
}

/// Nearest velocity a note's dynamic byte can hold, never silent
pub fn storable_velocity(velocity: u8) -> u8 {
    velocity_from_dynamic(dynamic_from_velocity(velocity).max(1))
}

/// Nearest value a channel byte can hold
pub fn storable_channel_value(value: u8) -> u8 {
    channel_value_from_byte(channel_byte_from_value(value))
}

/// `text` as it reads back from a field of at most `max` Latin-1 bytes
pub fn storable_text(text: &str, max: usize) -> String {
    text.chars()
        .map(|c| if u32::from(c) <= 0xFF { c } else { '?' })
        .take(max)
        .collect()
}
