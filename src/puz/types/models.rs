//! Core data structures for .puz format components.
//!
//! This module defines the small value types shared by the codec, the
//! document model and the grid:
//! - Puzzle type and solution state flags
//! - Extension block codes
//! - File version and the text encoding it implies
//! - Per-cell markup flags

use std::fmt;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use super::error::{PuzError, Result};

/// Block marker for ordinary puzzles.
pub const BLOCK: char = '.';
/// Block marker for diagramless puzzles.
pub const DIAGRAMLESS_BLOCK: char = ':';
/// Fill character of an empty cell.
pub const BLANK: char = '-';

/// Returns `true` if `c` marks a non-playable cell.
pub fn is_block(c: char) -> bool {
    c == BLOCK || c == DIAGRAMLESS_BLOCK
}

/// Puzzle type flag from the header.
///
/// Values other than the two known ones are kept verbatim so that the
/// header round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleType {
    Normal,
    Diagramless,
    Other(u16),
}

impl From<u16> for PuzzleType {
    fn from(value: u16) -> Self {
        match value {
            0x0001 => Self::Normal,
            0x0401 => Self::Diagramless,
            other => Self::Other(other),
        }
    }
}

impl From<PuzzleType> for u16 {
    fn from(value: PuzzleType) -> Self {
        match value {
            PuzzleType::Normal => 0x0001,
            PuzzleType::Diagramless => 0x0401,
            PuzzleType::Other(other) => other,
        }
    }
}

/// Solution state flag from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionState {
    /// Solution is available in plaintext.
    Unlocked,
    /// Solution is scrambled with a four-digit key.
    Locked,
    Other(u16),
}

impl From<u16> for SolutionState {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::Unlocked,
            0x0004 => Self::Locked,
            other => Self::Other(other),
        }
    }
}

impl From<SolutionState> for u16 {
    fn from(value: SolutionState) -> Self {
        match value {
            SolutionState::Unlocked => 0x0000,
            SolutionState::Locked => 0x0004,
            SolutionState::Other(other) => other,
        }
    }
}

/// Four-byte code identifying an extension block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionCode(pub [u8; 4]);

impl ExtensionCode {
    /// Grid of rebus indices: 0 for non-rebus, i+1 for key i of the solution table.
    pub const REBUS: Self = Self(*b"GRBS");
    /// Rebus solution table, e.g. `0:HEART;1:DIAMOND;`.
    pub const REBUS_SOLUTIONS: Self = Self(*b"RTBL");
    /// The solver's rebus entries, same table format.
    pub const REBUS_FILL: Self = Self(*b"RUSR");
    /// Timer state: `elapsed,running`.
    pub const TIMER: Self = Self(*b"LTIM");
    /// Per-cell markup bitmask.
    pub const MARKUP: Self = Self(*b"GEXT");
}

impl fmt::Display for ExtensionCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// The 4-byte file version field, e.g. `1.3\0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileVersion {
    raw: [u8; 4],
    major: u8,
    minor: u8,
}

impl FileVersion {
    pub const DEFAULT: [u8; 4] = *b"1.3\0";

    /// Parses the raw header field. Only the first three bytes carry the version.
    pub fn parse(raw: [u8; 4]) -> Result<Self> {
        let text = String::from_utf8_lossy(&raw[..3]);
        let (major, minor) = text
            .split_once('.')
            .and_then(|(major, minor)| Some((major.parse().ok()?, minor.parse().ok()?)))
            .ok_or_else(|| PuzError::InvalidVersion(String::from_utf8_lossy(&raw).into_owned()))?;
        Ok(Self { raw, major, minor })
    }

    pub fn raw(&self) -> [u8; 4] {
        self.raw
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Version 2.0 and later store text as UTF-8.
    pub fn text_encoding(&self) -> &'static Encoding {
        if self.major >= 2 {
            UTF_8
        } else {
            WINDOWS_1252
        }
    }

    /// The notes field joins the text checksum starting with version 1.3.
    pub fn checksums_notes(&self) -> bool {
        (self.major, self.minor) >= (1, 3)
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Markup flags of a single cell.
///
/// Stored on disk as one byte per cell in the `GEXT` extension:
/// - `0x10`: corrected (was marked wrong, since cleared)
/// - `0x20`: currently marked wrong
/// - `0x40`: revealed
/// - `0x80`: circled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellMarkup {
    pub corrected: bool,
    pub marked_wrong: bool,
    pub revealed: bool,
    pub circled: bool,
}

impl CellMarkup {
    const CORRECTED: u8 = 0x10;
    const MARKED_WRONG: u8 = 0x20;
    const REVEALED: u8 = 0x40;
    const CIRCLED: u8 = 0x80;
    /// Bits that map to a named flag. The low four bits are kept as found.
    pub const FLAG_BITS: u8 = 0xF0;

    pub fn from_byte(byte: u8) -> Self {
        Self {
            corrected: byte & Self::CORRECTED != 0,
            marked_wrong: byte & Self::MARKED_WRONG != 0,
            revealed: byte & Self::REVEALED != 0,
            circled: byte & Self::CIRCLED != 0,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0;
        if self.corrected {
            byte |= Self::CORRECTED;
        }
        if self.marked_wrong {
            byte |= Self::MARKED_WRONG;
        }
        if self.revealed {
            byte |= Self::REVEALED;
        }
        if self.circled {
            byte |= Self::CIRCLED;
        }
        byte
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_selects_encoding() {
        let v13 = FileVersion::parse(*b"1.3\0").unwrap();
        assert_eq!(v13.text_encoding(), WINDOWS_1252);
        assert!(v13.checksums_notes());

        let v12 = FileVersion::parse(*b"1.2c").unwrap();
        assert_eq!((v12.major(), v12.minor()), (1, 2));
        assert!(!v12.checksums_notes());

        let v20 = FileVersion::parse(*b"2.0\0").unwrap();
        assert_eq!(v20.text_encoding(), UTF_8);
    }

    #[test]
    fn garbage_version_is_rejected() {
        assert!(matches!(
            FileVersion::parse(*b"abc\0"),
            Err(PuzError::InvalidVersion(_))
        ));
    }

    #[test]
    fn markup_byte_conversion() {
        let markup = CellMarkup::from_byte(0xA0);
        assert!(markup.marked_wrong && markup.circled);
        assert!(!markup.corrected && !markup.revealed);
        assert_eq!(markup.to_byte(), 0xA0);
        assert!(CellMarkup::from_byte(0x0F).is_empty());
    }

    #[test]
    fn unknown_header_flags_round_trip() {
        assert_eq!(u16::from(PuzzleType::from(0x0201)), 0x0201);
        assert_eq!(SolutionState::from(0x0004), SolutionState::Locked);
    }
}
