//! Checksum primitives of the .puz format.
//!
//! Every checksum in the file is built from [`data_cksum`], a 16-bit
//! rotate-right-and-add sum that can be chained by passing the previous
//! result as the seed. The header, text and global checksums are chains over
//! specific fields; the magic checksum folds four of them into 64 bits masked
//! with the string `ICHEATED`.

use log::trace;

/// Mask string XORed into the magic checksum.
pub const MASK_STRING: &[u8; 8] = b"ICHEATED";

/// Rolling 16-bit checksum over `data`, continuing from `seed`.
///
/// # Algorithm
/// For each byte:
/// 1. Rotate the accumulator right by one bit (bit 0 re-enters at bit 15)
/// 2. Add the byte, discarding any carry past 16 bits
pub fn data_cksum(data: &[u8], seed: u16) -> u16 {
    data.iter()
        .fold(seed, |cksum, &byte| cksum.rotate_right(1).wrapping_add(u16::from(byte)))
}

/// Checksum over the packed `width, height, clue_count, puzzle_type,
/// solution_state` block of the header.
pub fn header_cksum(
    width: u8,
    height: u8,
    clue_count: u16,
    puzzle_type: u16,
    solution_state: u16,
    seed: u16,
) -> u16 {
    let mut packed = [0u8; 8];
    packed[0] = width;
    packed[1] = height;
    packed[2..4].copy_from_slice(&clue_count.to_le_bytes());
    packed[4..6].copy_from_slice(&puzzle_type.to_le_bytes());
    packed[6..8].copy_from_slice(&solution_state.to_le_bytes());
    data_cksum(&packed, seed)
}

/// Folds the header, solution, fill and text checksums into the 64-bit
/// magic checksum.
///
/// # Layout
/// The sub-checksums are consumed last-to-first. For each, the accumulator
/// shifts left by one byte, then the low byte XOR `MASK_STRING[i]` lands in
/// the low lane and the high byte XOR `MASK_STRING[i + 4]` lands 32 bits
/// higher, where `i` is the sub-checksum's position in the input.
pub fn magic_cksum(cksums: [u16; 4]) -> u64 {
    let magic = cksums
        .iter()
        .enumerate()
        .rev()
        .fold(0u64, |magic, (i, &cksum)| {
            let low = u64::from(MASK_STRING[i] ^ (cksum & 0x00ff) as u8);
            let high = u64::from(MASK_STRING[i + 4] ^ (cksum >> 8) as u8);
            (magic << 8) | low | (high << 32)
        });
    trace!("Magic checksum of {:04x?}: {:#018x}", cksums, magic);
    magic
}
