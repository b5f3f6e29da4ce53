//! # puz-solver
//!
//! Reader, writer and solving model for Across Lite `.puz` crossword files.
//!
//! - [`Puzzle`] loads a file, validates its checksums and saves it back byte
//!   for byte, and locks or unlocks the scrambled solution.
//! - [`Grid`] splits the solution into numbered across and down words and
//!   tracks the solver's entries.
//! - [`Cursor`] moves through the grid the way a solving interface does.
pub mod cursor;
pub mod grid;
pub mod puz;

// Re-export the main types for convenience
pub use cursor::Cursor;
pub use grid::{Cell, Direction, Grid, Position, Word};
pub use puz::{
    CellMarkup, ChecksumKind, ClueNumbering, ExtensionCode, NumberedClue, PuzError, Puzzle,
    PuzzleType, Rebus, Result, SolutionState, TimerState,
};
