//! Little-endian byte sink for GP5 output
//!
//! Writing never fails: text longer than its field is truncated and
//! characters outside Latin-1 become `?`.

use byteorder::{ByteOrder, LittleEndian};

use crate::models::Color;

#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn placeholder(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_i16(&mut self, value: i16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_i16(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_i32(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_f64(&mut self, value: f64) {
        let mut bytes = [0u8; 8];
        LittleEndian::write_f64(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    /// Length byte then exactly `size` bytes, zero padded
    pub fn write_byte_size_string(&mut self, text: &str, size: usize) {
        let mut bytes = encode_latin1(text);
        bytes.truncate(size.min(255));
        self.write_u8(bytes.len() as u8);
        self.buf.extend_from_slice(&bytes);
        self.placeholder(size - bytes.len());
    }

    pub fn write_int_size_string(&mut self, text: &str) {
        let bytes = encode_latin1(text);
        self.write_i32(bytes.len() as i32);
        self.buf.extend_from_slice(&bytes);
    }

    /// i32 of `len + 1`, length byte, bytes
    pub fn write_int_byte_size_string(&mut self, text: &str) {
        let mut bytes = encode_latin1(text);
        bytes.truncate(255);
        self.write_i32(bytes.len() as i32 + 1);
        self.write_u8(bytes.len() as u8);
        self.buf.extend_from_slice(&bytes);
    }

    pub fn write_color(&mut self, color: Color) {
        self.buf.extend_from_slice(&[color.r, color.g, color.b, 0]);
    }
}

fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
