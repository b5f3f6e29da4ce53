//! Codec layer: byte buffers, checksums and the solution cipher.
//!
//! # Submodules
//!
//! - [`buffer`][]: Positioned reader and append-only writer
//! - [`checksum`][]: Rolling 16-bit checksum and the 64-bit magic checksum
//! - [`cipher`][]: Key-based scrambling of the solution grid

pub mod buffer;
pub mod checksum;
pub mod cipher;
