//! Default values for MIDI export

/// Default ticks per quarter note (MIDI resolution)
pub const DEFAULT_TPQ: u16 = 480;

/// Channel of the General MIDI drum kit
pub const DRUM_CHANNEL: u8 = 9;

/// Fold a file channel (0..64, four ports of sixteen) onto a single MIDI port
pub fn port_channel(channel: u8) -> u8 {
    channel % 16
}

/// Microseconds per quarter note for a tempo in beats per minute
pub fn tempo_to_micros(bpm: i32) -> u32 {
    (60_000_000 / bpm.max(1)) as u32
}
