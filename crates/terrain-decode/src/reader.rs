//! Bounds-checked little-endian cursor.

use crate::error::{DecodeError, DecodeResult};

/// Sequential reader over a byte slice.
///
/// Every read either advances the cursor by exactly the requested width or
/// fails with [`DecodeError::BufferOverrun`] and leaves the cursor untouched.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::BufferOverrun {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> DecodeResult<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Read an `i32` length prefix followed by that many bytes.
    ///
    /// A negative prefix is reported as an overrun, the same as one that
    /// points past the end of the buffer.
    pub fn read_sized(&mut self) -> DecodeResult<&'a [u8]> {
        let start = self.pos;
        let len = self.read_i32()?;
        let Ok(len) = usize::try_from(len) else {
            self.pos = start;
            return Err(DecodeError::BufferOverrun {
                offset: start,
                needed: 0,
                available: self.remaining(),
            });
        };
        match self.read_bytes(len) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                self.pos = start;
                Err(err)
            }
        }
    }

    /// Read `count` consecutive `u32` words.
    pub fn read_u32_array(&mut self, count: usize) -> DecodeResult<Vec<u32>> {
        let bytes = self.read_bytes(count.saturating_mul(4))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect())
    }

    /// Read `count` consecutive `f32` words.
    pub fn read_f32_array(&mut self, count: usize) -> DecodeResult<Vec<f32>> {
        let bytes = self.read_bytes(count.saturating_mul(4))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|w| f32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_words() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0x00, 0x00, 0x80, 0x3F];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.read_u16().unwrap(), 0xFFFF);
        assert_eq!(reader.read_u16().unwrap(), 0);
        assert_eq!(reader.read_u16().unwrap(), 0x3F80);
        assert!(reader.is_empty());
    }

    #[test]
    fn overrun_leaves_cursor_in_place() {
        let data = [1, 2, 3];
        let mut reader = ByteReader::new(&data);
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BufferOverrun {
                offset: 0,
                needed: 4,
                available: 3
            }
        ));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u8().unwrap(), 1);
    }

    #[test]
    fn sized_read_rejects_prefix_past_end() {
        let mut data = 10i32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 4]);
        let mut reader = ByteReader::new(&data);
        assert!(matches!(
            reader.read_sized(),
            Err(DecodeError::BufferOverrun { .. })
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn sized_read_rejects_negative_prefix() {
        let data = (-1i32).to_le_bytes();
        let mut reader = ByteReader::new(&data);
        assert!(matches!(
            reader.read_sized(),
            Err(DecodeError::BufferOverrun { .. })
        ));
    }

    #[test]
    fn sized_read_returns_payload() {
        let mut data = 3i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abcz");
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_sized().unwrap(), b"abc");
        assert_eq!(reader.remaining(), 1);
    }
}
