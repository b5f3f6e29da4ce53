//! Fixed 52-byte .puz header.
//!
//! # Header Structure (little-endian)
//! ```text
//! [2 bytes]  Global checksum
//! [12 bytes] "ACROSS&DOWN\0"
//! [2 bytes]  Header checksum
//! [8 bytes]  Magic checksum
//! [4 bytes]  File version, e.g. "1.3\0"
//! [2 bytes]  Reserved
//! [2 bytes]  Scrambled-solution checksum
//! [12 bytes] Reserved
//! [1 byte]   Width
//! [1 byte]   Height
//! [2 bytes]  Clue count
//! [2 bytes]  Puzzle type
//! [2 bytes]  Solution state
//! ```

use log::{debug, trace};

use crate::puz::codec::buffer::{PuzzleBuffer, PuzzleWriter};
use crate::puz::types::error::{PuzError, Result};

/// File magic that anchors the header.
pub const ACROSS_DOWN: &[u8; 11] = b"ACROSS&DOWN";
/// The global checksum sits this many bytes before the file magic.
pub const MAGIC_OFFSET: isize = -2;
pub const HEADER_LEN: usize = 52;

/// Raw header fields as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub global_cksum: u16,
    pub header_cksum: u16,
    pub magic_cksum: u64,
    pub file_version: [u8; 4],
    pub reserved_1c: [u8; 2],
    pub scrambled_cksum: u16,
    pub reserved_20: [u8; 12],
    pub width: u8,
    pub height: u8,
    pub clue_count: u16,
    pub puzzle_type: u16,
    pub solution_state: u16,
}

impl Header {
    /// Reads the header at the buffer's position, which must point at the
    /// global checksum.
    pub fn unpack(buf: &mut PuzzleBuffer) -> Result<Self> {
        let start = buf.pos();
        // Check the full length up front so a short header reports where it began.
        buf.peek(HEADER_LEN)?;

        let global_cksum = buf.read_u16()?;
        if buf.read(ACROSS_DOWN.len())? != ACROSS_DOWN {
            return Err(PuzError::MarkerNotFound);
        }
        // NUL terminating the magic string
        buf.read_u8()?;
        let header = Self {
            global_cksum,
            header_cksum: buf.read_u16()?,
            magic_cksum: buf.read_u64()?,
            file_version: buf.read_array()?,
            reserved_1c: buf.read_array()?,
            scrambled_cksum: buf.read_u16()?,
            reserved_20: buf.read_array()?,
            width: buf.read_u8()?,
            height: buf.read_u8()?,
            clue_count: buf.read_u16()?,
            puzzle_type: buf.read_u16()?,
            solution_state: buf.read_u16()?,
        };

        trace!("Header read from offset {} to {}", start, buf.pos());
        debug!(
            "Header: {}x{}, {} clues, type={:#06x}, state={:#06x}, version={:?}",
            header.width,
            header.height,
            header.clue_count,
            header.puzzle_type,
            header.solution_state,
            String::from_utf8_lossy(&header.file_version)
        );
        Ok(header)
    }

    /// Writes the header in the on-disk layout.
    pub fn pack(&self, out: &mut PuzzleWriter) -> Result<()> {
        out.write_u16(self.global_cksum)?;
        out.write(ACROSS_DOWN)?;
        out.write_u8(0)?;
        out.write_u16(self.header_cksum)?;
        out.write_u64(self.magic_cksum)?;
        out.write(&self.file_version)?;
        out.write(&self.reserved_1c)?;
        out.write_u16(self.scrambled_cksum)?;
        out.write(&self.reserved_20)?;
        out.write_u8(self.width)?;
        out.write_u8(self.height)?;
        out.write_u16(self.clue_count)?;
        out.write_u16(self.puzzle_type)?;
        out.write_u16(self.solution_state)
    }
}
