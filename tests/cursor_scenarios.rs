use pretty_assertions::assert_eq;
use puz_solver::{Cursor, Direction, Grid, Position, Puzzle};

fn p(x: usize, y: usize) -> Position {
    Position::new(x, y)
}

/// C A T
/// O . .
/// W . .
fn l_shaped() -> (Puzzle, Grid) {
    let mut puzzle = Puzzle::new(3, 3, "CATO..W..").unwrap();
    puzzle.clues = vec!["Pet".to_string(), "Farm animal".to_string()];
    let grid = Grid::from_puzzle(&puzzle).unwrap();
    (puzzle, grid)
}

#[test]
fn words_of_the_l_shaped_grid() {
    let (_, grid) = l_shaped();
    assert_eq!(grid.words(Direction::Across)[0].cells, vec![p(0, 0), p(1, 0), p(2, 0)]);
    assert_eq!(grid.words(Direction::Down)[0].cells, vec![p(0, 0), p(0, 1), p(0, 2)]);
}

#[test]
fn start_and_advance() {
    let (_, grid) = l_shaped();
    let mut cursor = Cursor::start(&grid).unwrap();
    assert_eq!(cursor, Cursor::new(p(0, 0), Direction::Across));
    cursor.advance(&grid);
    assert_eq!(cursor.position, p(1, 0));
}

#[test]
fn wrap_within_word() {
    let (_, grid) = l_shaped();
    let mut cursor = Cursor::new(p(2, 0), Direction::Across);
    cursor.advance_within_word(&grid, true, true);
    assert_eq!(cursor.position, p(0, 0));
    assert_eq!(cursor.direction, Direction::Across);
}

#[test]
fn next_word_crosses_into_other_axis() {
    let (_, grid) = l_shaped();
    let mut cursor = Cursor::new(p(0, 0), Direction::Across);
    cursor.advance_to_next_word(&grid, false);
    assert_eq!(cursor, Cursor::new(p(0, 0), Direction::Down));
    assert_eq!(cursor.current_word(&grid), vec![p(0, 0), p(0, 1), p(0, 2)]);
}

#[test]
fn typing_skips_filled_cells() {
    let (_, mut grid) = l_shaped();
    grid.enter(p(0, 0), 'c');
    grid.enter(p(1, 0), 'a');
    let mut cursor = Cursor::new(p(0, 0), Direction::Across);
    cursor.advance_within_word(&grid, false, false);
    assert_eq!(cursor.position, p(2, 0));
}

#[test]
fn solving_session() {
    let (mut puzzle, mut grid) = l_shaped();
    let mut cursor = Cursor::start(&grid).unwrap();

    // Type C, A, T: each letter moves on within the word, then the finished
    // word hands over to the first blank of the down word.
    for ch in ['c', 'a', 't'] {
        let overwrite = !grid.is_blankish(cursor.position);
        grid.enter(cursor.position, ch);
        cursor.advance_within_word(&grid, overwrite, true);
    }
    assert_eq!(cursor, Cursor::new(p(0, 1), Direction::Down));

    grid.enter(cursor.position, 'x');
    cursor.advance_within_word(&grid, false, true);
    assert_eq!(cursor.position, p(0, 2));
    grid.enter(cursor.position, 'w');

    assert_eq!(grid.check_cells(&cursor.current_word(&grid)), 1);
    assert!(grid.blank_cells_remaining());
    cursor.retreat_within_word(&grid, false, true);
    assert_eq!(cursor.position, p(0, 1));

    grid.enter(cursor.position, 'o');
    assert!(grid.is_complete());
    let cell = grid.cell(p(0, 1)).unwrap();
    assert!(cell.markup.corrected && !cell.markup.marked_wrong);

    grid.write_back(&mut puzzle).unwrap();
    assert_eq!(puzzle.fill, "CATO..W..");
    let reloaded = Puzzle::load(&puzzle.to_bytes().unwrap()).unwrap();
    assert!(reloaded.markup()[3].corrected);
    assert!(reloaded.check_answers(&reloaded.fill).unwrap());
}

#[test]
fn go_to_numbered_square() {
    let (_, grid) = l_shaped();
    let mut cursor = Cursor::start(&grid).unwrap();
    assert!(cursor.go_to_numbered_square(&grid, 1));
    assert_eq!(cursor.position, p(0, 0));
    assert!(!cursor.go_to_numbered_square(&grid, 2));
}
