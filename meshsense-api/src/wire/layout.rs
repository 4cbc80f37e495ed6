use alloc::vec;
use alloc::vec::Vec;

use super::error::{CodecError, Result};

/// Writes a fixed-size little-endian record, field by field.
///
/// Text fields are NUL padded to their capacity and always keep room for the
/// terminator, matching a `char[N]` member holding a C string.
pub struct FrameWriter {
    buffer: Vec<u8>,
    offset: usize,
}

impl FrameWriter {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0; size],
            offset: 0,
        }
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.put_bytes(&value.to_le_bytes());
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_bytes(&[value as u8]);
        self
    }

    pub fn put_label(&mut self, text: &str, capacity: usize) -> Result<&mut Self> {
        if text.len() >= capacity {
            return Err(CodecError::LabelTooLong { capacity });
        }

        let start = self.offset;
        self.buffer[start..start + text.len()].copy_from_slice(text.as_bytes());
        self.offset += capacity;
        Ok(self)
    }

    pub fn pad(&mut self, count: usize) -> &mut Self {
        self.offset += count;
        self
    }

    pub fn finish(self) -> Vec<u8> {
        debug_assert_eq!(self.offset, self.buffer.len(), "layout not fully written");
        self.buffer
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        let start = self.offset;
        self.buffer[start..start + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
    }
}

/// Reads a fixed-size record produced by [`FrameWriter`].
pub struct FrameReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FrameReader<'a> {
    /// Fails unless `data` is exactly `expected` bytes long.
    pub fn new(data: &'a [u8], expected: usize) -> Result<Self> {
        if data.len() != expected {
            return Err(CodecError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { data, offset: 0 })
    }

    pub fn i32(&mut self) -> i32 {
        let bytes = self.take(4);
        i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn bool(&mut self) -> bool {
        self.take(1)[0] != 0
    }

    /// Text up to the first NUL. Bytes that are not UTF-8 read as an empty label.
    pub fn label(&mut self, capacity: usize) -> &'a str {
        let field = self.take(capacity);
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        core::str::from_utf8(&field[..end]).unwrap_or("")
    }

    pub fn skip(&mut self, count: usize) {
        self.take(count);
    }

    fn take(&mut self, count: usize) -> &'a [u8] {
        let start = self.offset;
        self.offset += count;
        &self.data[start..self.offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_layout() {
        let mut writer = FrameWriter::new(12);
        writer.put_i32(-2);
        writer.put_label("ab", 6).unwrap();
        writer.put_bool(true).pad(1);
        let bytes = writer.finish();

        assert_eq!(&bytes[..4], &(-2i32).to_le_bytes());
        assert_eq!(&bytes[4..10], b"ab\0\0\0\0");
        assert_eq!(bytes[10], 1);
        assert_eq!(bytes[11], 0);
    }

    #[test]
    fn test_label_must_leave_room_for_terminator() {
        let mut writer = FrameWriter::new(8);
        assert_eq!(
            writer.put_label("abcd", 4).err(),
            Some(CodecError::LabelTooLong { capacity: 4 })
        );
        assert!(writer.put_label("abc", 4).is_ok());
    }

    #[test]
    fn test_reader_rejects_wrong_length() {
        assert_eq!(
            FrameReader::new(&[0u8; 5], 4).err(),
            Some(CodecError::LengthMismatch {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn test_reader_tolerates_unterminated_and_invalid_text() {
        let mut data = [b'x'; 8];
        data[4] = 0xff;
        let mut reader = FrameReader::new(&data, 8).unwrap();
        assert_eq!(reader.label(4), "xxxx");
        assert_eq!(reader.label(4), "");
    }
}
