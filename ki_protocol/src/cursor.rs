//! Positional little-endian reader over an immutable byte buffer.
//!
//! A [`ByteCursor`] borrows its buffer for the lifetime of a single decode
//! call and is never retained past it (spec §3 "Ownership & lifecycle").

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::DecodeError;

/// Borrowed, positional reader over a byte slice. All multi-byte values are
/// little-endian.
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
    len: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(buf),
            len: buf.len(),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.len - self.inner.position() as usize
    }

    fn require(&self, n: usize) -> Result<(), DecodeError> {
        let remaining = self.remaining();
        if remaining < n {
            Err(DecodeError::Truncated {
                expected: n,
                available: remaining,
            })
        } else {
            Ok(())
        }
    }

    pub fn peek_u16(&self) -> Result<u16, DecodeError> {
        self.require(2)?;
        let pos = self.inner.position() as usize;
        let buf = self.inner.get_ref();
        Ok(u16::from_le_bytes([buf[pos], buf[pos + 1]]))
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.require(n)?;
        self.inner.set_position(self.inner.position() + n as u64);
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        self.require(n)?;
        let mut buf = vec![0u8; n];
        self.inner
            .read_exact(&mut buf)
            .map_err(|_| DecodeError::Truncated {
                expected: n,
                available: self.remaining(),
            })?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.require(1)?;
        Ok(self.inner.read_u8().expect("checked by require"))
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        self.require(1)?;
        Ok(self.inner.read_i8().expect("checked by require"))
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.require(2)?;
        Ok(self
            .inner
            .read_u16::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        self.require(2)?;
        Ok(self
            .inner
            .read_i16::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.require(4)?;
        Ok(self
            .inner
            .read_u32::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.require(4)?;
        Ok(self
            .inner
            .read_i32::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.require(8)?;
        Ok(self
            .inner
            .read_u64::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        self.require(8)?;
        Ok(self
            .inner
            .read_i64::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.require(4)?;
        Ok(self
            .inner
            .read_f32::<LittleEndian>()
            .expect("checked by require"))
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        self.require(8)?;
        Ok(self
            .inner
            .read_f64::<LittleEndian>()
            .expect("checked by require"))
    }

    /// `STR`: a u16 length prefix followed by that many raw bytes. The wire
    /// does not carry an encoding, so this stays as bytes.
    pub fn read_str(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len)
    }

    /// `WSTR`: a u16 length prefix counting UTF-16 code units, followed by
    /// `2 * len` bytes of UTF-16-LE.
    pub fn read_wstr(&mut self) -> Result<String, DecodeError> {
        let char_count = self.read_u16()? as usize;
        let byte_count = char_count * 2;
        let raw = self.read_bytes(byte_count)?;

        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| DecodeError::MalformedString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_primitives_little_endian() {
        let mut data = Vec::new();
        data.push(0xFFu8); // i8 == -1
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&42u64.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_i8().unwrap(), -1);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i32().unwrap(), -1);
        assert_eq!(cursor.read_u64().unwrap(), 42);
        assert_eq!(cursor.read_f32().unwrap(), 1.5f32);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn truncated_read_reports_expected_and_available() {
        let data = [0x01u8];
        let mut cursor = ByteCursor::new(&data);
        let err = cursor.read_u32().unwrap_err();
        match err {
            DecodeError::Truncated {
                expected,
                available,
            } => {
                assert_eq!(expected, 4);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wstr_roundtrips_utf16() {
        let text = "hi";
        let mut data = Vec::new();
        data.extend_from_slice(&(text.chars().count() as u16).to_le_bytes());
        for unit in text.encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_wstr().unwrap(), "hi");
    }

    #[test]
    fn wstr_with_invalid_code_unit_is_malformed() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_le_bytes());
        // Lone high surrogate: invalid on its own.
        data.extend_from_slice(&0xD800u16.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_wstr().unwrap_err(),
            DecodeError::MalformedString
        ));
    }

    #[test]
    fn peek_u16_does_not_advance() {
        let data = [0x34, 0x12, 0xAA];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.peek_u16().unwrap(), 0x1234);
        assert_eq!(cursor.remaining(), 3);
        cursor.skip(2).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0xAA);
    }
}
