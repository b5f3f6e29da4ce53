//! Solution scrambling used to lock a puzzle behind a four-digit key.
//!
//! This is obfuscation, not encryption: it keeps answers out of plain view in
//! the file. The solution is read column by column with blocks removed, then
//! for each key digit `k` in turn:
//! 1. Every letter is Caesar-shifted by the key digit at its position (cycling
//!    through all four digits)
//! 2. The text is rotated left by `k`, or left as is when it has `k` or
//!    fewer letters
//! 3. The two halves are interleaved, second half first; an odd trailing
//!    character stays at the end
//!
//! Unscrambling undoes the three steps in reverse digit order. Blocks are put
//! back where they were and the text is transposed back to row-major order.

use encoding_rs::Encoding;
use log::trace;

use super::checksum::data_cksum;
use crate::puz::types::error::{PuzError, Result};
use crate::puz::types::models::is_block;
use crate::puz::utils;

const ALPHABET_LEN: u8 = 26;

/// Splits a key in `1000..=9999` into its four decimal digits.
pub fn key_digits(key: u16) -> Result<[u8; 4]> {
    if !(1000..=9999).contains(&key) {
        return Err(PuzError::InvalidKey(key));
    }
    Ok([
        (key / 1000) as u8,
        (key / 100 % 10) as u8,
        (key / 10 % 10) as u8,
        (key % 10) as u8,
    ])
}

/// Scrambles a row-major `width` x `height` solution. Blocks stay in place.
pub fn scramble_solution(solution: &str, width: usize, height: usize, key: u16) -> Result<String> {
    let digits = key_digits(key)?;
    let columns = transpose(&solution.chars().collect::<Vec<_>>(), width, height);
    let letters = strip_blocks(&columns);
    let scrambled = scramble_letters(&letters, digits)?;
    Ok(transpose(&restore(&columns, &scrambled), height, width)
        .into_iter()
        .collect())
}

/// Inverse of [`scramble_solution`] for the same key.
///
/// A wrong key still produces letters; callers detect it with
/// [`scrambled_cksum`].
pub fn unscramble_solution(scrambled: &str, width: usize, height: usize, key: u16) -> Result<String> {
    let digits = key_digits(key)?;
    let columns = transpose(&scrambled.chars().collect::<Vec<_>>(), width, height);
    let letters = strip_blocks(&columns);
    let plain = unscramble_letters(&letters, digits)?;
    Ok(transpose(&restore(&columns, &plain), height, width)
        .into_iter()
        .collect())
}

/// Checksum stored at lock time: the plain solution in column-major order,
/// blocks removed, encoded in the document's encoding.
pub fn scrambled_cksum(
    solution: &str,
    width: usize,
    height: usize,
    encoding: &'static Encoding,
) -> Result<u16> {
    let columns = transpose(&solution.chars().collect::<Vec<_>>(), width, height);
    let letters: String = strip_blocks(&columns).into_iter().collect();
    let bytes = utils::encode_text(&letters, encoding)?;
    Ok(data_cksum(&bytes, 0))
}

/// Scrambles block-free, column-major letters.
pub fn scramble_letters(letters: &[char], digits: [u8; 4]) -> Result<Vec<char>> {
    let mut text = letters.to_vec();
    for &k in &digits {
        shift(&mut text, digits, true)?;
        let len = text.len();
        text.rotate_left(rotation(k, len));
        text = shuffle(&text);
        trace!("After key digit {}: {}", k, text.iter().collect::<String>());
    }
    Ok(text)
}

/// Reverses [`scramble_letters`].
pub fn unscramble_letters(letters: &[char], digits: [u8; 4]) -> Result<Vec<char>> {
    let mut text = letters.to_vec();
    for &k in digits.iter().rev() {
        text = unshuffle(&text);
        let len = text.len();
        text.rotate_right(rotation(k, len));
        shift(&mut text, digits, false)?;
    }
    Ok(text)
}

/// Texts no longer than the key digit are not rotated.
fn rotation(k: u8, len: usize) -> usize {
    let k = usize::from(k);
    if k < len {
        k
    } else {
        0
    }
}

/// Reads a row-major grid of the given width and height column by column.
fn transpose(cells: &[char], width: usize, height: usize) -> Vec<char> {
    (0..width)
        .flat_map(|col| (0..height).map(move |row| (row, col)))
        .filter_map(|(row, col)| cells.get(row * width + col).copied())
        .collect()
}

fn strip_blocks(cells: &[char]) -> Vec<char> {
    cells.iter().copied().filter(|&c| !is_block(c)).collect()
}

/// Replaces each non-block cell of `source` with the next char of `letters`.
fn restore(source: &[char], letters: &[char]) -> Vec<char> {
    let mut letters = letters.iter();
    source
        .iter()
        .map(|&c| {
            if is_block(c) {
                c
            } else {
                letters.next().copied().unwrap_or(c)
            }
        })
        .collect()
}

fn shift(text: &mut [char], digits: [u8; 4], forward: bool) -> Result<()> {
    for (i, c) in text.iter_mut().enumerate() {
        if !c.is_ascii_uppercase() {
            return Err(PuzError::Unscramblable(*c));
        }
        let amount = digits[i % digits.len()];
        let amount = if forward { amount } else { ALPHABET_LEN - amount };
        let offset = (*c as u8 - b'A' + amount) % ALPHABET_LEN;
        *c = char::from(b'A' + offset);
    }
    Ok(())
}

fn shuffle(text: &[char]) -> Vec<char> {
    let mid = text.len() / 2;
    let mut out = Vec::with_capacity(text.len());
    for i in 0..mid {
        out.push(text[mid + i]);
        out.push(text[i]);
    }
    if text.len() % 2 == 1 {
        out.push(text[text.len() - 1]);
    }
    out
}

fn unshuffle(text: &[char]) -> Vec<char> {
    let odd = text.iter().skip(1).step_by(2);
    let even = text.iter().step_by(2);
    odd.chain(even).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn key_must_have_four_digits() {
        assert_eq!(key_digits(1234).unwrap(), [1, 2, 3, 4]);
        assert_eq!(key_digits(9000).unwrap(), [9, 0, 0, 0]);
        assert!(matches!(key_digits(999), Err(PuzError::InvalidKey(999))));
        assert!(matches!(key_digits(10000), Err(PuzError::InvalidKey(10000))));
    }

    #[test]
    fn transpose_reads_columns() {
        // C A T
        // . . A
        // . . R
        let grid = chars("CAT..A..R");
        assert_eq!(transpose(&grid, 3, 3), chars("C..A..TAR"));
        assert_eq!(strip_blocks(&transpose(&grid, 3, 3)), chars("CATAR"));
        assert_eq!(transpose(&transpose(&grid, 3, 3), 3, 3), grid);
    }

    #[test]
    fn transpose_non_square() {
        let grid = chars("ABCDEF");
        let columns = transpose(&grid, 3, 2);
        assert_eq!(columns, chars("ADBECF"));
        assert_eq!(transpose(&columns, 2, 3), grid);
    }

    #[test]
    fn restore_skips_blocks() {
        assert_eq!(restore(&chars("ABC.DEF"), &chars("XYZABC")), chars("XYZ.ABC"));
    }

    #[test]
    fn shuffle_interleaves_halves() {
        assert_eq!(shuffle(&chars("ABCDEF")), chars("DAEBFC"));
        assert_eq!(shuffle(&chars("ABCDEFG")), chars("DAEBFCG"));
        assert_eq!(unshuffle(&chars("DAEBFC")), chars("ABCDEF"));
        assert_eq!(unshuffle(&chars("DAEBFCG")), chars("ABCDEFG"));
        assert!(shuffle(&[]).is_empty());
    }

    #[test]
    fn shift_wraps_alphabet() {
        let mut text = chars("XYZA");
        shift(&mut text, [1, 2, 3, 4], true).unwrap();
        assert_eq!(text, chars("YACE"));
        shift(&mut text, [1, 2, 3, 4], false).unwrap();
        assert_eq!(text, chars("XYZA"));
    }

    #[test]
    fn shift_rejects_non_letters() {
        let mut text = chars("AB1");
        assert!(matches!(
            shift(&mut text, [1, 2, 3, 4], true),
            Err(PuzError::Unscramblable('1'))
        ));
    }

    #[test]
    fn letters_round_trip_for_many_keys() {
        let inputs = ["CATAR", "ABCDEFGHIJKLMNOPQRSTUVWXYZ", "Q", "", "ZZZZZZZZZZZZZ"];
        for key in (1000..=9999).step_by(37) {
            let digits = key_digits(key).unwrap();
            for input in inputs {
                let scrambled = scramble_letters(&chars(input), digits).unwrap();
                assert_eq!(scrambled.len(), input.len());
                let plain = unscramble_letters(&scrambled, digits).unwrap();
                assert_eq!(plain, chars(input), "key {} input {}", key, input);
            }
        }
    }

    #[test]
    fn solution_round_trip_keeps_blocks() {
        let solution = "CAT..A..R";
        let scrambled = scramble_solution(solution, 3, 3, 1234).unwrap();
        assert_eq!(scrambled.len(), solution.len());
        for (a, b) in scrambled.chars().zip(solution.chars()) {
            assert_eq!(is_block(a), is_block(b));
        }
        assert_ne!(scrambled, solution);
        assert_eq!(unscramble_solution(&scrambled, 3, 3, 1234).unwrap(), solution);
    }

    #[test]
    fn short_text_is_not_rotated() {
        assert_eq!(rotation(9, 2), 0);
        assert_eq!(rotation(2, 2), 0);
        assert_eq!(rotation(1, 2), 1);
        assert_eq!(scramble_solution("AB.......", 3, 3, 1999).unwrap(), "DM.......");
        assert_eq!(unscramble_solution("DM.......", 3, 3, 1999).unwrap(), "AB.......");
    }

    #[test]
    fn wrong_key_changes_checksum() {
        let solution = "HELLOWORLDABCDEFGHIJKLMNO";
        let scrambled = scramble_solution(solution, 5, 5, 4321).unwrap();
        let expected = scrambled_cksum(solution, 5, 5, encoding_rs::WINDOWS_1252).unwrap();
        let wrong = unscramble_solution(&scrambled, 5, 5, 4322).unwrap();
        assert_ne!(wrong, solution);
        assert_ne!(
            scrambled_cksum(&wrong, 5, 5, encoding_rs::WINDOWS_1252).unwrap(),
            expected
        );
    }
}
