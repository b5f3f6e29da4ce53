//! Across Lite `.puz` file support.
//!
//! # Module Organization
//! - `types`: error type and small value types shared by everything else
//! - `codec`: byte buffers, checksums and the solution cipher
//! - `format`: header and extension block layouts
//! - `puzzle`: the [`Puzzle`] document that loads, validates and saves files
//! - `extensions`: raw extension payloads and their typed views
//! - `numbering`: clue numbering derived from the block layout

pub mod codec;
pub mod extensions;
pub mod format;
pub mod numbering;
pub mod puzzle;
pub mod types;
pub mod utils;

pub use extensions::{Extensions, Rebus, TimerState};
pub use numbering::{ClueNumbering, NumberedClue};
pub use puzzle::Puzzle;
pub use types::error::{ChecksumKind, PuzError, Result};
pub use types::models::{CellMarkup, ExtensionCode, FileVersion, PuzzleType, SolutionState};
