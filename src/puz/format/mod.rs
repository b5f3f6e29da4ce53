//! On-disk structures of the .puz file.
//!
//! # Module Organization
//! - `header`: the fixed 52-byte header that follows the `ACROSS&DOWN` marker
//! - `extension`: the tagged, checksummed blocks after the notes field

pub mod extension;
pub mod header;
