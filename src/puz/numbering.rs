//! Clue numbering derived from the block layout.
//!
//! # Algorithm
//! Cells are scanned once in row-major order. A playable cell starts an
//! across entry when it sits at the left edge or right of a block and the run
//! of playable cells to its right is longer than one; down entries are found
//! the same way looking up and along the column. Each entry takes the next
//! clue from the stored list, across before down for a cell that starts
//! both. The number advances after every cell that took at least one clue.

use log::debug;

use super::types::error::{PuzError, Result};
use super::types::models::is_block;

/// A numbered entry paired with its stored clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedClue {
    pub number: usize,
    pub clue: String,
    /// Position of the clue in the stored clue list.
    pub clue_index: usize,
    /// Row-major index of the entry's first cell.
    pub cell: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClueNumbering {
    pub across: Vec<NumberedClue>,
    pub down: Vec<NumberedClue>,
}

impl ClueNumbering {
    /// Numbers `grid` (row-major, `width` x `height`) and pairs each entry
    /// with the clue stored for it.
    ///
    /// # Errors
    /// `ClueCountMismatch` when the grid has more entries than `clues`.
    pub fn build(grid: &[char], clues: &[String], width: usize, height: usize) -> Result<Self> {
        let playable = |i: usize| grid.get(i).is_some_and(|&c| !is_block(c));
        let len_across = |i: usize| {
            let col = i % width;
            (0..width - col).take_while(|&k| playable(i + k)).count()
        };
        let len_down = |i: usize| {
            let row = i / width;
            (0..height - row).take_while(|&k| playable(i + k * width)).count()
        };

        let mut numbering = Self::default();
        let mut next_clue = 0;
        let mut number = 1;
        for i in (0..width * height).filter(|&i| playable(i)) {
            let taken = next_clue;
            let entry = |len: usize, clue_index: usize| NumberedClue {
                number,
                clue: clues.get(clue_index).cloned().unwrap_or_default(),
                clue_index,
                cell: i,
                len,
            };

            let starts_across = i % width == 0 || !playable(i - 1);
            if starts_across && len_across(i) > 1 {
                numbering.across.push(entry(len_across(i), next_clue));
                next_clue += 1;
            }
            let starts_down = i < width || !playable(i - width);
            if starts_down && len_down(i) > 1 {
                numbering.down.push(entry(len_down(i), next_clue));
                next_clue += 1;
            }
            if next_clue > taken {
                number += 1;
            }
        }

        if next_clue > clues.len() {
            return Err(PuzError::ClueCountMismatch {
                expected: next_clue,
                found: clues.len(),
            });
        }
        debug!(
            "Numbered {} across and {} down entries from {} clues",
            numbering.across.len(),
            numbering.down.len(),
            clues.len()
        );
        Ok(numbering)
    }

    /// All entries in stored clue order.
    pub fn in_clue_order(&self) -> Vec<&NumberedClue> {
        let mut all: Vec<_> = self.across.iter().chain(&self.down).collect();
        all.sort_by_key(|entry| entry.clue_index);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Vec<char> {
        rows.concat().chars().collect()
    }

    fn clues(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("clue {}", i)).collect()
    }

    fn summary(entries: &[NumberedClue]) -> Vec<(usize, usize, usize)> {
        entries.iter().map(|e| (e.number, e.cell, e.len)).collect()
    }

    #[test]
    fn open_three_by_three() {
        let g = grid(&["ABC", "DEF", "GHI"]);
        let n = ClueNumbering::build(&g, &clues(6), 3, 3).unwrap();
        assert_eq!(summary(&n.across), vec![(1, 0, 3), (4, 3, 3), (5, 6, 3)]);
        assert_eq!(summary(&n.down), vec![(1, 0, 3), (2, 1, 3), (3, 2, 3)]);
        // 1-Across, 1-Down, 2-Down, 3-Down, 4-Across, 5-Across
        let order: Vec<_> = n.in_clue_order().iter().map(|e| e.cell).collect();
        assert_eq!(order, vec![0, 0, 1, 2, 3, 6]);
        assert_eq!(n.down[0].clue, "clue 1");
    }

    #[test]
    fn single_cells_are_not_entries() {
        // C A T
        // . . A
        // . . R
        let g = grid(&["CAT", "..A", "..R"]);
        let n = ClueNumbering::build(&g, &clues(2), 3, 3).unwrap();
        assert_eq!(summary(&n.across), vec![(1, 0, 3)]);
        assert_eq!(summary(&n.down), vec![(2, 2, 3)]);
    }

    #[test]
    fn too_few_clues() {
        let g = grid(&["ABC", "DEF", "GHI"]);
        assert!(matches!(
            ClueNumbering::build(&g, &clues(4), 3, 3),
            Err(PuzError::ClueCountMismatch { expected: 6, found: 4 })
        ));
    }

    #[test]
    fn diagramless_blocks_count_as_blocks() {
        let g = grid(&["AB:", "CD:"]);
        let n = ClueNumbering::build(&g, &clues(4), 3, 2).unwrap();
        assert_eq!(summary(&n.across), vec![(1, 0, 2), (3, 3, 2)]);
        assert_eq!(summary(&n.down), vec![(1, 0, 2), (2, 1, 2)]);
    }
}
