//! Custom error types for the puz-solver crate.

use std::fmt;

use thiserror::Error;

use super::models::ExtensionCode;

/// Which of the stored checksums failed to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Global,
    Header,
    Magic,
    Extension(ExtensionCode),
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChecksumKind::Global => write!(f, "global"),
            ChecksumKind::Header => write!(f, "header"),
            ChecksumKind::Magic => write!(f, "magic"),
            ChecksumKind::Extension(code) => write!(f, "extension {}", code),
        }
    }
}

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum PuzError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The buffer ended before a field could be read in full.
    #[error("Truncated data at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The `ACROSS&DOWN` file magic was not found anywhere in the data.
    #[error("Data does not appear to represent a puzzle: ACROSS&DOWN marker not found")]
    MarkerNotFound,

    /// A stored checksum does not match the one recomputed from the data.
    #[error("{kind} checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        kind: ChecksumKind,
        expected: u64,
        actual: u64,
    },

    /// Text could not be decoded from, or encoded to, the puzzle's encoding.
    #[error("Text encoding error: {0}")]
    Encoding(String),

    /// The 4-byte file version string is not of the form `major.minor`.
    #[error("Invalid file version: {0:?}")]
    InvalidVersion(String),

    /// The file is structurally invalid.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The grid demands more clues than the file stores.
    #[error("Clue count mismatch: grid needs at least {expected} clues, but found {found}")]
    ClueCountMismatch { expected: usize, found: usize },

    /// Scrambling keys are four-digit numbers.
    #[error("Invalid scramble key {0}: must be between 1000 and 9999")]
    InvalidKey(u16),

    /// The scrambling cipher only operates on the letters A-Z.
    #[error("Cannot scramble solution containing {0:?}")]
    Unscramblable(char),

    /// The key did not reproduce the stored scrambled checksum.
    #[error("Incorrect key: solution remains locked")]
    IncorrectKey,
}

impl PuzError {
    /// Returns `true` for failures that mean the bytes are not a valid puzzle file.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PuzError::Truncated { .. }
                | PuzError::MarkerNotFound
                | PuzError::ChecksumMismatch { .. }
                | PuzError::Encoding(_)
                | PuzError::InvalidVersion(_)
                | PuzError::InvalidFormat(_)
        )
    }
}

/// A convenience `Result` type alias using the crate's `PuzError` type.
pub type Result<T> = std::result::Result<T, PuzError>;
