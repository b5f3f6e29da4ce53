//! Extension payloads and the typed views over them.
//!
//! [`Extensions`] keeps raw payloads in file order so an unmodified document
//! writes them back exactly as read. The typed views parse on demand:
//! - [`Rebus`]: `GRBS` cell table with the `RTBL` solutions and `RUSR` fill
//! - Markup: `GEXT`, one [`CellMarkup`] per cell
//! - [`TimerState`]: `LTIM`, elapsed seconds and a running flag

use std::collections::BTreeMap;

use encoding_rs::Encoding;
use log::debug;

use super::types::error::{PuzError, Result};
use super::types::models::{CellMarkup, ExtensionCode};
use super::utils;

/// Raw extension payloads in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    blocks: Vec<(ExtensionCode, Vec<u8>)>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, code: ExtensionCode) -> bool {
        self.position(code).is_some()
    }

    pub fn get(&self, code: ExtensionCode) -> Option<&[u8]> {
        self.position(code).map(|i| self.blocks[i].1.as_slice())
    }

    /// Stores `data` under `code`.
    ///
    /// A code already present keeps its position and gets the new payload; a
    /// new code is appended. Returns the replaced payload, if any.
    pub fn insert(&mut self, code: ExtensionCode, data: Vec<u8>) -> Option<Vec<u8>> {
        match self.position(code) {
            Some(i) => Some(std::mem::replace(&mut self.blocks[i].1, data)),
            None => {
                self.blocks.push((code, data));
                None
            }
        }
    }

    pub fn remove(&mut self, code: ExtensionCode) -> Option<Vec<u8>> {
        self.position(code).map(|i| self.blocks.remove(i).1)
    }

    /// Payloads in write order.
    pub fn iter(&self) -> impl Iterator<Item = (ExtensionCode, &[u8])> {
        self.blocks.iter().map(|(code, data)| (*code, data.as_slice()))
    }

    pub fn codes(&self) -> impl Iterator<Item = ExtensionCode> + '_ {
        self.blocks.iter().map(|(code, _)| *code)
    }

    fn position(&self, code: ExtensionCode) -> Option<usize> {
        self.blocks.iter().position(|(c, _)| *c == code)
    }
}

/// Multi-character answers attached to individual cells.
///
/// `table[i]` is 0 for an ordinary cell, or `n + 1` where `n` is the key of
/// the cell's answer in `solutions` and of the solver's entry in `fill`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebus {
    table: Vec<u8>,
    solutions: BTreeMap<u8, String>,
    fill: BTreeMap<u8, String>,
}

impl Rebus {
    /// Parses the rebus extensions. Returns `None` when there is no `GRBS` block.
    pub fn from_extensions(extensions: &Extensions, encoding: &'static Encoding) -> Result<Option<Self>> {
        let Some(table) = extensions.get(ExtensionCode::REBUS) else {
            return Ok(None);
        };
        let solutions = Self::parse_table(extensions, ExtensionCode::REBUS_SOLUTIONS, encoding)?;
        let fill = Self::parse_table(extensions, ExtensionCode::REBUS_FILL, encoding)?;
        debug!(
            "Rebus: {} squares, {} solutions, {} fill entries",
            table.iter().filter(|&&b| b != 0).count(),
            solutions.len(),
            fill.len()
        );
        Ok(Some(Self {
            table: table.to_vec(),
            solutions,
            fill,
        }))
    }

    fn parse_table(
        extensions: &Extensions,
        code: ExtensionCode,
        encoding: &'static Encoding,
    ) -> Result<BTreeMap<u8, String>> {
        match extensions.get(code) {
            Some(bytes) => utils::parse_table(&utils::decode_text(bytes, encoding)?),
            None => Ok(BTreeMap::new()),
        }
    }

    fn key(&self, index: usize) -> Option<u8> {
        match self.table.get(index) {
            Some(&b) if b != 0 => Some(b - 1),
            _ => None,
        }
    }

    pub fn is_rebus_square(&self, index: usize) -> bool {
        self.key(index).is_some()
    }

    /// Indices of every rebus cell in row-major order.
    pub fn rebus_squares(&self) -> Vec<usize> {
        (0..self.table.len()).filter(|&i| self.is_rebus_square(i)).collect()
    }

    pub fn solution_at(&self, index: usize) -> Option<&str> {
        self.key(index)
            .and_then(|key| self.solutions.get(&key))
            .map(String::as_str)
    }

    pub fn fill_at(&self, index: usize) -> Option<&str> {
        self.key(index)
            .and_then(|key| self.fill.get(&key))
            .map(String::as_str)
    }

    /// Records the solver's entry for a rebus cell. Returns `false` for an
    /// ordinary cell.
    pub fn set_fill(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.key(index) {
            Some(key) => {
                self.fill.insert(key, value.into());
                true
            }
            None => false,
        }
    }

    /// Writes the three rebus blocks back. `RUSR` is only written when it has
    /// entries or was already present.
    pub fn store(&self, extensions: &mut Extensions, encoding: &'static Encoding) -> Result<()> {
        extensions.insert(ExtensionCode::REBUS, self.table.clone());
        let solutions = utils::format_table(&self.solutions);
        extensions.insert(
            ExtensionCode::REBUS_SOLUTIONS,
            utils::encode_text(&solutions, encoding)?.into_owned(),
        );
        if !self.fill.is_empty() || extensions.contains(ExtensionCode::REBUS_FILL) {
            let fill = utils::format_table(&self.fill);
            extensions.insert(
                ExtensionCode::REBUS_FILL,
                utils::encode_text(&fill, encoding)?.into_owned(),
            );
        }
        Ok(())
    }
}

/// Decodes a `GEXT` payload into per-cell markup.
pub fn parse_markup(data: &[u8]) -> Vec<CellMarkup> {
    data.iter().map(|&b| CellMarkup::from_byte(b)).collect()
}

/// Encodes per-cell markup as a `GEXT` payload, carrying over the bits
/// outside [`CellMarkup::FLAG_BITS`] from a `previous` payload of the same
/// length.
pub fn pack_markup(markup: &[CellMarkup], previous: Option<&[u8]>) -> Vec<u8> {
    let previous = previous.filter(|old| old.len() == markup.len());
    markup
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let kept = previous.map_or(0, |old| old[i] & !CellMarkup::FLAG_BITS);
            m.to_byte() | kept
        })
        .collect()
}

/// Solving timer saved in `LTIM` as `"elapsed,running"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    pub elapsed_secs: u32,
    pub running: bool,
}

impl TimerState {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| PuzError::InvalidFormat(format!("Timer payload is not ASCII: {}", e)))?;
        let (elapsed, running) = text
            .split_once(',')
            .ok_or_else(|| PuzError::InvalidFormat(format!("Malformed timer {:?}", text)))?;
        let parse = |field: &str| {
            field
                .trim()
                .parse::<u32>()
                .map_err(|e| PuzError::InvalidFormat(format!("Malformed timer {:?}: {}", text, e)))
        };
        Ok(Self {
            elapsed_secs: parse(elapsed)?,
            running: parse(running)? != 0,
        })
    }

    pub fn to_bytes(self) -> Vec<u8> {
        format!("{},{}", self.elapsed_secs, u8::from(self.running)).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    fn code(s: &[u8; 4]) -> ExtensionCode {
        ExtensionCode(*s)
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut ext = Extensions::new();
        ext.insert(code(b"AAAA"), vec![1]);
        ext.insert(code(b"BBBB"), vec![2]);
        assert_eq!(ext.insert(code(b"AAAA"), vec![3]), Some(vec![1]));
        let order: Vec<_> = ext.iter().map(|(c, d)| (c, d.to_vec())).collect();
        assert_eq!(order, vec![(code(b"AAAA"), vec![3]), (code(b"BBBB"), vec![2])]);
        assert_eq!(ext.remove(code(b"AAAA")), Some(vec![3]));
        assert!(!ext.contains(code(b"AAAA")));
        assert_eq!(ext.len(), 1);
    }

    fn rebus_extensions() -> Extensions {
        let mut ext = Extensions::new();
        ext.insert(ExtensionCode::REBUS, vec![0, 1, 0, 2]);
        ext.insert(ExtensionCode::REBUS_SOLUTIONS, b" 0:HEART; 1:STAR;".to_vec());
        ext
    }

    #[test]
    fn rebus_lookup() {
        let rebus = Rebus::from_extensions(&rebus_extensions(), WINDOWS_1252)
            .unwrap()
            .unwrap();
        assert_eq!(rebus.rebus_squares(), vec![1, 3]);
        assert_eq!(rebus.solution_at(1), Some("HEART"));
        assert_eq!(rebus.solution_at(3), Some("STAR"));
        assert_eq!(rebus.solution_at(0), None);
        assert_eq!(rebus.fill_at(1), None);
        assert!(!rebus.is_rebus_square(10));
    }

    #[test]
    fn rebus_fill_is_stored() {
        let mut ext = rebus_extensions();
        let mut rebus = Rebus::from_extensions(&ext, WINDOWS_1252).unwrap().unwrap();
        assert!(rebus.set_fill(3, "STAR"));
        assert!(!rebus.set_fill(0, "X"));
        rebus.store(&mut ext, WINDOWS_1252).unwrap();
        assert_eq!(ext.get(ExtensionCode::REBUS_FILL), Some(&b"1:STAR;"[..]));
        assert_eq!(ext.get(ExtensionCode::REBUS_SOLUTIONS), Some(&b"0:HEART;1:STAR;"[..]));
        let reread = Rebus::from_extensions(&ext, WINDOWS_1252).unwrap().unwrap();
        assert_eq!(reread.fill_at(3), Some("STAR"));
    }

    #[test]
    fn no_rebus_without_table() {
        assert!(Rebus::from_extensions(&Extensions::new(), WINDOWS_1252)
            .unwrap()
            .is_none());
    }

    #[test]
    fn markup_bytes() {
        let markup = parse_markup(&[0x00, 0x80, 0x30]);
        assert!(markup[1].circled);
        assert!(markup[2].corrected && markup[2].marked_wrong);
        assert_eq!(pack_markup(&markup, None), vec![0x00, 0x80, 0x30]);
    }

    #[test]
    fn markup_keeps_unknown_low_bits() {
        let previous = [0x01, 0x8f, 0x00];
        let mut markup = parse_markup(&previous);
        markup[2].revealed = true;
        assert_eq!(pack_markup(&markup, Some(&previous)), vec![0x01, 0x8f, 0x40]);
        assert_eq!(pack_markup(&markup, Some(&[0x0f])), vec![0x00, 0x80, 0x40]);
    }

    #[test]
    fn timer_format() {
        let timer = TimerState::parse(b"125,1").unwrap();
        assert_eq!(timer, TimerState { elapsed_secs: 125, running: true });
        assert_eq!(TimerState { elapsed_secs: 7, running: false }.to_bytes(), b"7,0".to_vec());
        assert!(TimerState::parse(b"abc").is_err());
    }
}
