//! Extension blocks that trail the puzzle body.
//!
//! # Block Structure
//! ```text
//! [4 bytes]  Code, e.g. "GRBS"
//! [2 bytes]  Payload length (little-endian)
//! [2 bytes]  Payload checksum (little-endian)
//! [n bytes]  Payload
//! [1 byte]   NUL
//! ```
//!
//! Blocks are read while the remaining bytes match this shape, including the
//! trailing NUL. Whatever follows the last well-formed block is not an
//! extension and is left for the caller to keep as postscript.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::puz::codec::buffer::{PuzzleBuffer, PuzzleWriter};
use crate::puz::codec::checksum::data_cksum;
use crate::puz::types::error::{PuzError, Result};
use crate::puz::types::models::ExtensionCode;

const BLOCK_HEADER_LEN: usize = 8;

/// One extension block as stored, with the checksum read from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtension {
    pub code: ExtensionCode,
    pub stored_cksum: u16,
    pub data: Vec<u8>,
}

impl RawExtension {
    /// Checksum recomputed over the payload.
    pub fn actual_cksum(&self) -> u16 {
        data_cksum(&self.data, 0)
    }
}

/// Reads the next block if the buffer holds one in full.
///
/// Returns `Ok(None)` without consuming anything when the remaining bytes do
/// not have the shape of a block.
pub fn read_block(buf: &mut PuzzleBuffer) -> Result<Option<RawExtension>> {
    let Ok(head) = buf.peek(BLOCK_HEADER_LEN) else {
        return Ok(None);
    };
    let len = LittleEndian::read_u16(&head[4..6]) as usize;
    let Ok(block) = buf.peek(BLOCK_HEADER_LEN + len + 1) else {
        return Ok(None);
    };
    if block[BLOCK_HEADER_LEN + len] != 0 {
        return Ok(None);
    }

    let code = ExtensionCode(buf.read_array()?);
    let _len = buf.read_u16()?;
    let stored_cksum = buf.read_u16()?;
    let data = buf.read(len)?.to_vec();
    buf.read_u8()?;

    trace!("Extension {}: {} bytes, stored checksum {:#06x}", code, len, stored_cksum);
    Ok(Some(RawExtension {
        code,
        stored_cksum,
        data,
    }))
}

/// Reads blocks until the data no longer matches the block shape.
pub fn read_blocks(buf: &mut PuzzleBuffer) -> Result<Vec<RawExtension>> {
    let mut blocks = Vec::new();
    while let Some(block) = read_block(buf)? {
        blocks.push(block);
    }
    Ok(blocks)
}

/// Writes one block with a freshly computed checksum.
pub fn write_block(out: &mut PuzzleWriter, code: ExtensionCode, data: &[u8]) -> Result<()> {
    let len = u16::try_from(data.len()).map_err(|_| {
        PuzError::InvalidFormat(format!(
            "Extension {} payload of {} bytes exceeds {} bytes",
            code,
            data.len(),
            u16::MAX
        ))
    })?;
    out.write(&code.0)?;
    out.write_u16(len)?;
    out.write_u16(data_cksum(data, 0))?;
    out.write(data)?;
    out.write_u8(0)
}
