//! Positioned byte buffers for reading and writing .puz data.
//!
//! [`PuzzleBuffer`] walks a borrowed byte slice with a cursor and fails with
//! [`PuzError::Truncated`] instead of silently returning short reads.
//! [`PuzzleWriter`] appends to an owned buffer. Both carry the text encoding
//! selected for the document so string fields are decoded and encoded the
//! same way in both directions.

use std::borrow::Cow;
use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use encoding_rs::{Encoding, WINDOWS_1252};

use crate::puz::types::error::{PuzError, Result};
use crate::puz::utils;

/// Read cursor over the raw bytes of a puzzle file.
#[derive(Debug)]
pub struct PuzzleBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    encoding: &'static Encoding,
}

impl<'a> PuzzleBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            encoding: WINDOWS_1252,
        }
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn can_read(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    /// Bytes before the current position.
    pub fn consumed(&self) -> &'a [u8] {
        &self.data[..self.pos]
    }

    /// Looks at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        if !self.can_read(n) {
            return Err(PuzError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read(2)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read(8)?))
    }

    pub fn read_to_end(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    /// Reads raw bytes up to the next NUL and consumes the terminator.
    ///
    /// The returned slice excludes the NUL.
    pub fn read_zstring_bytes(&mut self) -> Result<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let len = rest.iter().position(|&b| b == 0).ok_or(PuzError::Truncated {
            offset: self.pos,
            needed: rest.len() + 1,
            available: rest.len(),
        })?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    /// Reads a NUL-terminated string in the buffer's encoding.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_zstring_bytes()?;
        utils::decode_text(bytes, self.encoding)
    }

    /// Reads exactly `n` bytes and decodes them as text.
    pub fn read_text(&mut self, n: usize) -> Result<String> {
        let bytes = self.read(n)?;
        utils::decode_text(bytes, self.encoding)
    }

    /// Moves to `offset` bytes from the next occurrence of `marker`.
    ///
    /// The search starts at the current position. On failure the position is
    /// left unchanged.
    pub fn seek_to(&mut self, marker: &[u8], offset: isize) -> Result<()> {
        if marker.is_empty() {
            return Err(PuzError::MarkerNotFound);
        }
        let found = self.data[self.pos..]
            .windows(marker.len())
            .position(|window| window == marker)
            .ok_or(PuzError::MarkerNotFound)?;
        let target = (self.pos + found)
            .checked_add_signed(offset)
            .filter(|&target| target <= self.data.len())
            .ok_or_else(|| {
                PuzError::InvalidFormat(format!(
                    "marker at offset {} leaves no room for {} leading bytes",
                    self.pos + found,
                    -offset
                ))
            })?;
        self.pos = target;
        Ok(())
    }
}

/// Append-only output buffer for serializing a puzzle.
#[derive(Debug)]
pub struct PuzzleWriter {
    data: Vec<u8>,
    encoding: &'static Encoding,
}

impl PuzzleWriter {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            data: Vec::new(),
            encoding,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        WriteBytesExt::write_u8(&mut self.data, value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.data.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.data.write_u64::<LittleEndian>(value)?;
        Ok(())
    }

    /// Encodes `text` and writes it without a terminator.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let bytes: Cow<[u8]> = utils::encode_text(text, self.encoding)?;
        self.write(&bytes)
    }

    /// Encodes `text` and writes it followed by a NUL.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.write_text(text)?;
        self.write_u8(0)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_fails_on_truncation() {
        let mut buf = PuzzleBuffer::new(b"abc");
        assert_eq!(buf.read(2).unwrap(), b"ab");
        assert!(matches!(
            buf.read(2),
            Err(PuzError::Truncated { offset: 2, needed: 2, available: 1 })
        ));
        assert_eq!(buf.pos(), 2);
    }

    #[test]
    fn read_string_consumes_terminator() {
        let mut buf = PuzzleBuffer::new(b"Title\0\0rest");
        assert_eq!(buf.read_string().unwrap(), "Title");
        assert_eq!(buf.read_string().unwrap(), "");
        assert!(buf.read_string().is_err());
        assert_eq!(buf.read_to_end(), b"rest");
    }

    #[test]
    fn legacy_strings_decode_high_bytes() {
        let mut buf = PuzzleBuffer::new(b"Caf\xe9\0");
        assert_eq!(buf.read_string().unwrap(), "Café");
    }

    #[test]
    fn seek_to_marker_with_offset() {
        let mut buf = PuzzleBuffer::new(b"junk\x12\x34ACROSS&DOWN\0");
        buf.seek_to(b"ACROSS&DOWN", -2).unwrap();
        assert_eq!(buf.pos(), 4);
        assert_eq!(buf.consumed(), b"junk");
        assert_eq!(buf.read_u16().unwrap(), 0x3412);
    }

    #[test]
    fn seek_to_missing_marker_fails() {
        let mut buf = PuzzleBuffer::new(b"nothing to see");
        assert!(matches!(buf.seek_to(b"ACROSS&DOWN", -2), Err(PuzError::MarkerNotFound)));
        assert_eq!(buf.pos(), 0);
    }

    #[test]
    fn writer_emits_little_endian() {
        let mut out = PuzzleWriter::new(WINDOWS_1252);
        out.write_u16(0x0102).unwrap();
        out.write_string("é").unwrap();
        assert_eq!(out.into_bytes(), vec![0x02, 0x01, 0xe9, 0x00]);
    }
}
