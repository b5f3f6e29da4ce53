use crate::puz::types::models::{is_block, CellMarkup, BLANK};

/// One square of the solving grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub solution: char,
    pub entry: char,
    /// Full answer of a rebus square; `solution` holds its first letter.
    pub rebus: Option<String>,
    pub number: Option<usize>,
    pub markup: CellMarkup,
}

impl Cell {
    /// Creates a cell from its solution and fill characters. Whitespace in
    /// the fill of a playable cell is read as blank.
    pub fn new(solution: char, entry: char) -> Self {
        let entry = if !is_block(solution) && entry.is_whitespace() {
            BLANK
        } else {
            entry
        };
        Self {
            solution,
            entry,
            rebus: None,
            number: None,
            markup: CellMarkup::default(),
        }
    }

    pub fn is_block(&self) -> bool {
        is_block(self.solution)
    }

    pub fn is_playable(&self) -> bool {
        !self.is_block()
    }

    pub fn is_blank(&self) -> bool {
        self.entry == BLANK
    }

    /// Blank, or holding an entry already marked wrong.
    pub fn is_blankish(&self) -> bool {
        self.is_playable() && (self.is_blank() || self.markup.marked_wrong)
    }

    pub fn is_correct(&self) -> bool {
        self.is_block() || self.entry == self.solution
    }

    /// Writes a letter, uppercased. Overwriting a wrong entry marks the cell
    /// corrected.
    pub fn enter(&mut self, ch: char) {
        if self.is_block() {
            return;
        }
        self.entry = ch.to_ascii_uppercase();
        if self.markup.marked_wrong {
            self.markup.marked_wrong = false;
            self.markup.corrected = true;
        }
    }

    /// Empties the cell. Clearing a wrong entry marks the cell corrected.
    pub fn clear(&mut self) {
        if self.is_block() {
            return;
        }
        self.entry = BLANK;
        if self.markup.marked_wrong {
            self.markup.marked_wrong = false;
            self.markup.corrected = true;
        }
    }

    /// Marks a filled, incorrect entry as wrong. Returns whether it was.
    pub fn check(&mut self) -> bool {
        if !self.is_blank() && !self.is_correct() {
            self.markup.marked_wrong = true;
            return true;
        }
        false
    }

    /// Fills in the answer if the cell is blank or wrong. Returns whether it
    /// changed.
    pub fn reveal(&mut self) -> bool {
        if self.is_playable() && (self.is_blankish() || !self.is_correct()) {
            self.entry = self.solution;
            self.markup.revealed = true;
            self.markup.marked_wrong = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clearing_a_wrong_entry_sets_corrected() {
        let mut cell = Cell::new('A', 'B');
        assert!(cell.check());
        assert!(cell.markup.marked_wrong && cell.is_blankish());
        cell.clear();
        assert!(cell.is_blank());
        assert!(!cell.markup.marked_wrong);
        assert!(cell.markup.corrected);
    }

    #[test]
    fn clearing_never_sets_corrected_on_its_own() {
        let mut cell = Cell::new('A', 'B');
        cell.clear();
        assert!(!cell.markup.corrected);
    }

    #[test]
    fn entering_over_wrong_entry() {
        let mut cell = Cell::new('A', 'B');
        cell.check();
        cell.enter('a');
        assert_eq!(cell.entry, 'A');
        assert!(cell.markup.corrected && !cell.markup.marked_wrong);
        assert!(cell.is_correct());
    }

    #[test]
    fn check_ignores_blank_and_correct() {
        assert!(!Cell::new('A', '-').check());
        assert!(!Cell::new('A', 'A').check());
    }

    #[test]
    fn reveal_only_when_needed() {
        let mut correct = Cell::new('A', 'A');
        assert!(!correct.reveal());
        assert!(!correct.markup.revealed);

        let mut blank = Cell::new('A', ' ');
        assert!(blank.is_blank());
        assert!(blank.reveal());
        assert_eq!(blank.entry, 'A');
        assert!(blank.markup.revealed);

        let mut block = Cell::new('.', '.');
        assert!(!block.reveal() && !block.is_blankish());
    }
}
