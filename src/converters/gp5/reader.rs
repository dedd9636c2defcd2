//! Little-endian cursor over a GP5 byte stream

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;

pub type ReadResult<T> = std::result::Result<T, FormatError>;

pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, count: usize) -> ReadResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: count - self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    pub fn skip(&mut self, count: usize) -> ReadResult<()> {
        self.take(count).map(|_| ())
    }

    /// Error for a value read just before the cursor
    pub fn invalid(&self, field: &'static str, value: impl Into<i64>, width: usize) -> FormatError {
        FormatError::InvalidValue {
            offset: self.pos.saturating_sub(width),
            field,
            value: value.into(),
        }
    }

    pub fn read_u8(&mut self) -> ReadResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> ReadResult<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> ReadResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> ReadResult<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> ReadResult<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> ReadResult<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    /// Non-negative i32 count
    pub fn read_count(&mut self, field: &'static str) -> ReadResult<usize> {
        let value = self.read_i32()?;
        if value < 0 {
            return Err(self.invalid(field, value, 4));
        }
        Ok(value as usize)
    }

    /// Length byte followed by a fixed `size`-byte field
    pub fn read_byte_size_string(&mut self, size: usize) -> ReadResult<String> {
        let length = usize::from(self.read_u8()?);
        let bytes = self.take(size)?;
        Ok(decode_latin1(&bytes[..length.min(size)]))
    }

    /// i32 length then the bytes
    pub fn read_int_size_string(&mut self) -> ReadResult<String> {
        let length = self.read_count("string length")?;
        let bytes = self.take(length)?;
        Ok(decode_latin1(bytes))
    }

    /// i32 field size, then a length byte and the bytes
    pub fn read_int_byte_size_string(&mut self) -> ReadResult<String> {
        let size = self.read_i32()?;
        if size < 1 {
            return Err(self.invalid("string size", size, 4));
        }
        self.read_byte_size_string((size - 1) as usize)
    }

    pub fn read_color(&mut self) -> ReadResult<crate::models::Color> {
        let bytes = self.take(4)?;
        Ok(crate::models::Color {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
        })
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_ints() {
        let data = [0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x34, 0x12];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.read_i8().unwrap(), 2);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert_eq!(reader.read_i16().unwrap(), 0x1234);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_reports_offset() {
        let data = [0x00, 0x01];
        let mut reader = Reader::new(&data);
        reader.read_u8().unwrap();
        let err = reader.read_i32().unwrap_err();
        assert_eq!(err, FormatError::Truncated { offset: 1, needed: 3 });
    }

    #[test]
    fn test_strings() {
        let mut data = vec![3u8, b'a', b'b', b'c', 0, 0];
        data.extend_from_slice(&[4, 0, 0, 0, 3, b'x', b'y', 0xE9]);
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_byte_size_string(5).unwrap(), "abc");
        assert_eq!(reader.read_int_byte_size_string().unwrap(), "xy\u{e9}");
    }

    #[test]
    fn test_negative_count_is_invalid() {
        let data = (-2i32).to_le_bytes();
        let mut reader = Reader::new(&data);
        let err = reader.read_count("beat count").unwrap_err();
        assert!(matches!(err, FormatError::InvalidValue { offset: 0, value: -2, .. }));
    }
}
