//! The solving grid derived from a [`Puzzle`].
//!
//! Word and number structure is fixed when the grid is built; only cell
//! entries and markup change while solving.
//!
//! # Word Order
//! - Across words are listed row by row, left to right.
//! - Down words are listed in reading order, sorted by their first cell's
//!   row and then column. This is the order of the down clues and of clue
//!   traversal. [`Grid::down_words_by_column`] gives the column-by-column
//!   order in which they are found.

mod cell;

use std::fmt;

use log::debug;

use crate::puz::types::error::{PuzError, Result};
use crate::puz::types::models::{CellMarkup, ExtensionCode, BLANK};
use crate::puz::Puzzle;

pub use cell::Cell;

/// A grid coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A maximal run of two or more playable cells along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub direction: Direction,
    pub number: usize,
    pub clue: String,
    pub cells: Vec<Position>,
}

impl Word {
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    across: Vec<Word>,
    down: Vec<Word>,
    spaces_across: Vec<Position>,
    spaces_down: Vec<Position>,
}

impl Grid {
    /// Builds the grid from row-major solution and fill text.
    ///
    /// Words are numbered but carry no clue text.
    pub fn new(width: usize, height: usize, solution: &str, fill: &str) -> Result<Self> {
        let solution: Vec<char> = solution.chars().collect();
        let fill: Vec<char> = fill.chars().collect();
        let size = width * height;
        if size == 0 || solution.len() != size || fill.len() != size {
            return Err(PuzError::InvalidFormat(format!(
                "{}x{} grid needs {} cells, got {} solution and {} fill",
                width,
                height,
                size,
                solution.len(),
                fill.len()
            )));
        }

        let cells = solution
            .iter()
            .zip(&fill)
            .map(|(&s, &f)| Cell::new(s, f))
            .collect();
        let mut grid = Self {
            width,
            height,
            cells,
            across: Vec::new(),
            down: Vec::new(),
            spaces_across: Vec::new(),
            spaces_down: Vec::new(),
        };

        let rows = (0..height).map(|y| (0..width).map(move |x| Position::new(x, y)).collect::<Vec<_>>());
        let columns = (0..width).map(|x| (0..height).map(move |y| Position::new(x, y)).collect::<Vec<_>>());
        grid.across = rows
            .flat_map(|line| grid.runs(&line, Direction::Across))
            .collect();
        grid.down = columns
            .flat_map(|line| grid.runs(&line, Direction::Down))
            .collect();
        grid.down.sort_by_key(|word| (word.cells[0].y, word.cells[0].x));

        grid.spaces_across = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .filter(|&pos| grid.is_playable(pos))
            .collect();
        grid.spaces_down = (0..width)
            .flat_map(|x| (0..height).map(move |y| Position::new(x, y)))
            .filter(|&pos| grid.is_playable(pos))
            .collect();

        grid.number();
        debug!(
            "Grid {}x{}: {} across words, {} down words",
            width,
            height,
            grid.across.len(),
            grid.down.len()
        );
        Ok(grid)
    }

    /// Builds the grid for a puzzle: cells, words with their clues, markup
    /// from `GEXT` and rebus answers from `GRBS`/`RTBL`.
    pub fn from_puzzle(puzzle: &Puzzle) -> Result<Self> {
        let mut grid = Self::new(puzzle.width(), puzzle.height(), &puzzle.solution, &puzzle.fill)?;

        let numbering = puzzle.clue_numbering()?;
        for (word, entry) in grid.across.iter_mut().zip(&numbering.across) {
            word.clue = entry.clue.clone();
        }
        for (word, entry) in grid.down.iter_mut().zip(&numbering.down) {
            word.clue = entry.clue.clone();
        }

        if puzzle.extensions.contains(ExtensionCode::MARKUP) {
            for (cell, markup) in grid.cells.iter_mut().zip(puzzle.markup()) {
                cell.markup = markup;
            }
        }
        if let Some(rebus) = puzzle.rebus()? {
            for index in rebus.rebus_squares() {
                if let Some(cell) = grid.cells.get_mut(index) {
                    cell.rebus = rebus.solution_at(index).map(str::to_string);
                }
            }
        }
        Ok(grid)
    }

    /// Maximal runs longer than one cell along a row or column.
    fn runs(&self, line: &[Position], direction: Direction) -> Vec<Word> {
        line.split(|&pos| !self.is_playable(pos))
            .filter(|run| run.len() > 1)
            .map(|run| Word {
                direction,
                number: 0,
                clue: String::new(),
                cells: run.to_vec(),
            })
            .collect()
    }

    /// Numbers every word start in reading order.
    fn number(&mut self) {
        let mut starts: Vec<Position> = self
            .across
            .iter()
            .chain(&self.down)
            .map(|word| word.cells[0])
            .collect();
        starts.sort_by_key(|pos| (pos.y, pos.x));
        starts.dedup();

        for (i, &pos) in starts.iter().enumerate() {
            if let Some(cell) = self.cell_mut(pos) {
                cell.number = Some(i + 1);
            }
        }
        for word in self.across.iter_mut().chain(self.down.iter_mut()) {
            let index = word.cells[0].y * self.width + word.cells[0].x;
            word.number = self.cells[index].number.unwrap_or_default();
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height).then(|| pos.y * self.width + pos.x)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Position::new(i % width, i / width), cell))
    }

    pub fn is_playable(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(Cell::is_playable)
    }

    pub fn is_blankish(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(Cell::is_blankish)
    }

    /// Words in traversal order.
    pub fn words(&self, direction: Direction) -> &[Word] {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }

    /// Down words column by column, top to bottom within a column.
    pub fn down_words_by_column(&self) -> Vec<&Word> {
        let mut words: Vec<&Word> = self.down.iter().collect();
        words.sort_by_key(|word| (word.cells[0].x, word.cells[0].y));
        words
    }

    /// Playable cells in the order single steps visit them: row-major for
    /// across, column-major for down.
    pub fn spaces(&self, direction: Direction) -> &[Position] {
        match direction {
            Direction::Across => &self.spaces_across,
            Direction::Down => &self.spaces_down,
        }
    }

    /// Index into [`Grid::words`] of the word through `pos`.
    pub fn word_index(&self, pos: Position, direction: Direction) -> Option<usize> {
        self.words(direction).iter().position(|word| word.contains(pos))
    }

    pub fn word_containing(&self, pos: Position, direction: Direction) -> Option<&Word> {
        self.word_index(pos, direction)
            .map(|i| &self.words(direction)[i])
    }

    pub fn number_at(&self, pos: Position) -> Option<usize> {
        self.cell(pos).and_then(|cell| cell.number)
    }

    pub fn position_of_number(&self, number: usize) -> Option<Position> {
        self.cells()
            .find(|(_, cell)| cell.number == Some(number))
            .map(|(pos, _)| pos)
    }

    /// Writes a letter into a playable cell.
    pub fn enter(&mut self, pos: Position, ch: char) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.enter(ch);
        }
    }

    pub fn clear(&mut self, pos: Position) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.clear();
        }
    }

    /// Marks the cell wrong if it holds an incorrect entry.
    pub fn check_cell(&mut self, pos: Position) -> bool {
        self.cell_mut(pos).is_some_and(Cell::check)
    }

    /// Checks every listed cell and returns how many were marked wrong.
    pub fn check_cells(&mut self, positions: &[Position]) -> usize {
        positions.iter().filter(|&&pos| self.check_cell(pos)).count()
    }

    pub fn check_all(&mut self) -> usize {
        self.cells.iter_mut().map(Cell::check).filter(|&changed| changed).count()
    }

    pub fn reveal_cell(&mut self, pos: Position) -> bool {
        self.cell_mut(pos).is_some_and(Cell::reveal)
    }

    pub fn reveal_cells(&mut self, positions: &[Position]) -> usize {
        positions.iter().filter(|&&pos| self.reveal_cell(pos)).count()
    }

    pub fn reveal_all(&mut self) -> usize {
        self.cells.iter_mut().map(Cell::reveal).filter(|&changed| changed).count()
    }

    /// Clears every entry. Wrong entries become corrected.
    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear);
    }

    /// Clears every entry and drops the corrected and revealed marks.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.is_playable()) {
            cell.clear();
            cell.markup.corrected = false;
            cell.markup.revealed = false;
        }
    }

    pub fn blank_cells_remaining(&self) -> bool {
        self.cells.iter().any(Cell::is_blankish)
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Cell::is_correct)
    }

    /// Row-major fill text with blanks as `-`.
    pub fn fill(&self) -> String {
        self.cells
            .iter()
            .map(|cell| {
                if cell.is_block() {
                    cell.solution
                } else if cell.is_blank() {
                    BLANK
                } else {
                    cell.entry
                }
            })
            .collect()
    }

    pub fn markup(&self) -> Vec<CellMarkup> {
        self.cells.iter().map(|cell| cell.markup).collect()
    }

    /// Copies the fill into `puzzle`, and the markup when any cell has some
    /// or the puzzle already stores it.
    pub fn write_back(&self, puzzle: &mut Puzzle) -> Result<()> {
        puzzle.fill = self.fill();
        let markup = self.markup();
        if markup.iter().any(|m| !m.is_empty()) || puzzle.extensions.contains(ExtensionCode::MARKUP) {
            puzzle.set_markup(&markup)?;
        }
        Ok(())
    }
}
