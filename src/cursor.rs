//! Cursor navigation over a [`Grid`].
//!
//! The cursor is a position plus a direction. Every operation takes the grid
//! it moves over and leaves the cursor on a playable cell. Degenerate grids
//! (no words in a direction, a single playable cell) leave it in place rather
//! than failing.
//!
//! # Word Sequence
//! Moving between words walks one cyclic sequence: the across words in row
//! order followed by the down words in reading order. Stepping past the last
//! across word lands on the first down word and the other way round, which
//! switches the cursor's direction.
//!
//! # Blank Placement
//! With blank placement requested and a blank cell left anywhere in the grid,
//! word moves keep stepping through the sequence until they reach a word with
//! a blank or marked-wrong cell, and land on its earliest such cell. The scan
//! visits each word at most once.

use log::trace;

use crate::grid::{Direction, Grid, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub position: Position,
    pub direction: Direction,
}

impl Cursor {
    pub fn new(position: Position, direction: Direction) -> Self {
        Self { position, direction }
    }

    /// Places a new cursor at the start of the first across word, falling
    /// back to the first down word and then the first playable cell.
    pub fn start(grid: &Grid) -> Option<Self> {
        [Direction::Across, Direction::Down]
            .into_iter()
            .find_map(|direction| {
                grid.words(direction)
                    .first()
                    .map(|word| Self::new(word.cells[0], direction))
            })
            .or_else(|| {
                grid.spaces(Direction::Across)
                    .first()
                    .map(|&pos| Self::new(pos, Direction::Across))
            })
    }

    /// Sets the direction, or toggles it when `to` is `None`.
    pub fn switch_direction(&mut self, to: Option<Direction>) {
        self.direction = to.unwrap_or(self.direction.opposite());
    }

    /// Toggles the direction, unless no word in the new direction passes
    /// through the cursor.
    pub fn toggle_direction(&mut self, grid: &Grid) {
        self.switch_direction(None);
        if grid.word_containing(self.position, self.direction).is_none() {
            self.switch_direction(None);
        }
        trace!("Direction is now {}", self.direction);
    }

    /// Steps to the next playable cell in the current direction, wrapping
    /// from the last cell to the first.
    pub fn advance(&mut self, grid: &Grid) {
        self.step(grid, true);
    }

    /// Steps to the previous playable cell, wrapping from the first to the last.
    pub fn retreat(&mut self, grid: &Grid) {
        self.step(grid, false);
    }

    fn step(&mut self, grid: &Grid, forward: bool) {
        let spaces = grid.spaces(self.direction);
        let Some(i) = spaces.iter().position(|&pos| pos == self.position) else {
            return;
        };
        let len = spaces.len();
        let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
        self.position = spaces[next];
        trace!("Stepped {} to {}", self.direction, self.position);
    }

    /// Steps along the other axis without changing direction.
    pub fn advance_perpendicular(&mut self, grid: &Grid) {
        self.switch_direction(None);
        self.advance(grid);
        self.switch_direction(None);
    }

    pub fn retreat_perpendicular(&mut self, grid: &Grid) {
        self.switch_direction(None);
        self.retreat(grid);
        self.switch_direction(None);
    }

    /// Steps along the other axis, then keeps stepping until the cursor sits
    /// on a blank or marked-wrong cell, if any is left.
    pub fn advance_perpendicular_to_blank(&mut self, grid: &Grid) {
        self.advance_perpendicular(grid);
        self.repeat_to_blank(grid, Self::advance_perpendicular);
    }

    pub fn retreat_perpendicular_to_blank(&mut self, grid: &Grid) {
        self.retreat_perpendicular(grid);
        self.repeat_to_blank(grid, Self::retreat_perpendicular);
    }

    fn repeat_to_blank(&mut self, grid: &Grid, step: fn(&mut Self, &Grid)) {
        if !grid.blank_cells_remaining() {
            return;
        }
        let limit = grid.spaces(self.direction.opposite()).len();
        for _ in 0..limit {
            if grid.is_blankish(self.position) {
                return;
            }
            step(self, grid);
        }
    }

    /// The word through the cursor in its direction, or the cursor's cell
    /// alone when no word passes through it.
    pub fn current_word(&self, grid: &Grid) -> Vec<Position> {
        grid.word_containing(self.position, self.direction)
            .map(|word| word.cells.clone())
            .unwrap_or_else(|| vec![self.position])
    }

    /// First blank or marked-wrong cell of the current word.
    pub fn earliest_blank_in_word(&self, grid: &Grid) -> Option<Position> {
        self.current_word(grid)
            .into_iter()
            .find(|&pos| grid.is_blankish(pos))
    }

    /// Moves forward inside the current word.
    ///
    /// Without `overwrite`, filled cells are skipped. With `wrap`, the search
    /// continues from the start of the word. When no cell qualifies the cursor
    /// moves on to the next word with a blank.
    pub fn advance_within_word(&mut self, grid: &Grid, overwrite: bool, wrap: bool) {
        let word = self.current_word(grid);
        let index = word.iter().position(|&pos| pos == self.position).unwrap_or(0);
        let ahead = word[index + 1..].iter();
        let behind = word[..index].iter().filter(|_| wrap);
        let target = ahead
            .chain(behind)
            .copied()
            .find(|&pos| overwrite || grid.is_blankish(pos));

        match target {
            Some(pos) => {
                self.position = pos;
                trace!("Moved within word to {}", pos);
            }
            None => self.advance_to_next_word(grid, true),
        }
    }

    /// Moves backward inside the current word.
    ///
    /// With `blank_placement`, jumps to the word's earliest blank if the
    /// cursor is past it; otherwise steps back one cell. At the start of the
    /// word, or with no earlier blank, moves to the previous word.
    pub fn retreat_within_word(&mut self, grid: &Grid, end_placement: bool, blank_placement: bool) {
        let word = self.current_word(grid);
        let index = word.iter().position(|&pos| pos == self.position).unwrap_or(0);
        let earliest_blank = self
            .earliest_blank_in_word(grid)
            .and_then(|blank| word.iter().position(|&pos| pos == blank));

        match earliest_blank {
            Some(blank) if blank_placement && index > blank => self.position = word[blank],
            _ if !blank_placement && index > 0 => self.position = word[index - 1],
            _ => self.retreat_to_previous_word(grid, end_placement, blank_placement),
        }
    }

    /// Moves to the first cell of the next word, switching direction past
    /// the end of the current direction's words.
    pub fn advance_to_next_word(&mut self, grid: &Grid, blank_placement: bool) {
        let sequence = word_sequence(grid);
        if sequence.is_empty() {
            return;
        }
        let next = match self.sequence_index(grid, &sequence, false) {
            Some(i) => (i + 1) % sequence.len(),
            None => 0,
        };
        let (direction, word) = sequence[next];
        self.direction = direction;
        self.position = grid.words(direction)[word].cells[0];
        trace!("Advanced to {} word {} at {}", direction, word, self.position);

        if blank_placement {
            let order = (0..sequence.len()).map(|k| sequence[(next + k) % sequence.len()]);
            self.seek_blank(grid, order);
        }
    }

    /// Moves to the previous word, landing on its last cell with
    /// `end_placement` and on its first otherwise.
    pub fn retreat_to_previous_word(&mut self, grid: &Grid, end_placement: bool, blank_placement: bool) {
        let sequence = word_sequence(grid);
        if sequence.is_empty() {
            return;
        }
        let len = sequence.len();
        let previous = match self.sequence_index(grid, &sequence, true) {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        let (direction, word) = sequence[previous];
        let cells = &grid.words(direction)[word].cells;
        self.direction = direction;
        self.position = if end_placement {
            cells[cells.len() - 1]
        } else {
            cells[0]
        };
        trace!("Retreated to {} word {} at {}", direction, word, self.position);

        if blank_placement {
            let order = (0..len).map(|k| sequence[(previous + len - k) % len]);
            self.seek_blank(grid, order);
        }
    }

    /// Lands on the earliest blank of the first word in `order` that has one.
    /// Stays put when no blank is left in the grid or no word holds one.
    fn seek_blank(&mut self, grid: &Grid, mut order: impl Iterator<Item = (Direction, usize)>) {
        if !grid.blank_cells_remaining() {
            return;
        }
        let found = order.find_map(|(direction, word)| {
            grid.words(direction)[word]
                .cells
                .iter()
                .copied()
                .find(|&pos| grid.is_blankish(pos))
                .map(|pos| (direction, pos))
        });
        if let Some((direction, pos)) = found {
            self.direction = direction;
            self.position = pos;
            trace!("Placed on blank {} {}", direction, pos);
        }
    }

    /// Position in the word sequence of the word the cursor is in.
    ///
    /// A cursor outside any word of its direction is first walked through the
    /// direction's cells, backward when moving on to the next word and
    /// forward when moving back, until it enters one. A direction with no
    /// words falls back to the word through the cursor in the other
    /// direction.
    fn sequence_index(&self, grid: &Grid, sequence: &[(Direction, usize)], forward: bool) -> Option<usize> {
        let find = |direction: Direction, pos: Position| {
            grid.word_index(pos, direction)
                .and_then(|word| sequence.iter().position(|&entry| entry == (direction, word)))
        };

        let mut probe = *self;
        for _ in 0..grid.spaces(self.direction).len() {
            if let Some(i) = find(probe.direction, probe.position) {
                return Some(i);
            }
            probe.step(grid, forward);
        }
        find(self.direction.opposite(), self.position)
    }

    /// Moves to the square carrying `number`. Returns `false`, leaving the
    /// cursor in place, when no square has that number.
    pub fn go_to_numbered_square(&mut self, grid: &Grid, number: usize) -> bool {
        match grid.position_of_number(number) {
            Some(pos) => {
                self.position = pos;
                trace!("Jumped to square {} at {}", number, pos);
                true
            }
            None => false,
        }
    }
}

/// Every word as `(direction, index)`: across words, then down words.
fn word_sequence(grid: &Grid) -> Vec<(Direction, usize)> {
    [Direction::Across, Direction::Down]
        .into_iter()
        .flat_map(|direction| (0..grid.words(direction).len()).map(move |i| (direction, i)))
        .collect()
}
