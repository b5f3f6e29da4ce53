use puz_solver::{ChecksumKind, ExtensionCode, Grid, PuzError, Puzzle};

fn valid_bytes() -> Vec<u8> {
    let mut puzzle = Puzzle::new(3, 3, "CAT..A..R").unwrap();
    puzzle.title = "Errors".to_string();
    puzzle.clues = vec!["Pet".to_string(), "Pitch".to_string()];
    puzzle.set_timer(puz_solver::TimerState { elapsed_secs: 3, running: true });
    puzzle.to_bytes().unwrap()
}

fn checksum_kind(bytes: &[u8]) -> ChecksumKind {
    match Puzzle::load(bytes) {
        Err(PuzError::ChecksumMismatch { kind, .. }) => kind,
        other => panic!("expected a checksum mismatch, got {:?}", other),
    }
}

#[test]
fn valid_bytes_load() {
    assert!(Puzzle::load(&valid_bytes()).is_ok());
}

#[test]
fn corrupted_fill_fails_global_checksum() {
    let mut bytes = valid_bytes();
    // First fill cell follows the 52-byte header and 9 solution cells.
    bytes[52 + 9] = b'X';
    assert_eq!(checksum_kind(&bytes), ChecksumKind::Global);
}

#[test]
fn corrupted_header_checksum() {
    let mut bytes = valid_bytes();
    bytes[14] ^= 0xff;
    assert_eq!(checksum_kind(&bytes), ChecksumKind::Header);
}

#[test]
fn corrupted_magic_checksum() {
    let mut bytes = valid_bytes();
    bytes[20] ^= 0x01;
    assert_eq!(checksum_kind(&bytes), ChecksumKind::Magic);
}

#[test]
fn corrupted_extension_payload() {
    let mut bytes = valid_bytes();
    let start = bytes.windows(4).position(|w| w == b"LTIM").unwrap();
    // Payload "3,1" starts after the 8-byte block header.
    bytes[start + 8] = b'4';
    assert_eq!(checksum_kind(&bytes), ChecksumKind::Extension(ExtensionCode::TIMER));
}

#[test]
fn checksum_error_is_a_format_error() {
    let mut bytes = valid_bytes();
    bytes[14] ^= 0xff;
    let err = Puzzle::load(&bytes).unwrap_err();
    assert!(err.is_format_error());
    assert!(err.to_string().contains("header checksum mismatch"), "{}", err);
}

#[test]
fn missing_marker() {
    let err = Puzzle::load(b"this is not a crossword").unwrap_err();
    assert!(matches!(err, PuzError::MarkerNotFound));
    assert!(err.is_format_error());
}

#[test]
fn truncated_header() {
    let bytes = valid_bytes();
    assert!(matches!(Puzzle::load(&bytes[..30]), Err(PuzError::Truncated { .. })));
}

#[test]
fn truncated_body() {
    let bytes = valid_bytes();
    for len in [52, 60, 70] {
        let err = Puzzle::load(&bytes[..len]).unwrap_err();
        assert!(matches!(err, PuzError::Truncated { .. }), "length {}: {:?}", len, err);
    }
}

#[test]
fn zero_dimensions_are_rejected() {
    let mut bytes = valid_bytes();
    bytes[0x2c] = 0;
    assert!(matches!(Puzzle::load(&bytes), Err(PuzError::InvalidFormat(_))));
}

#[test]
fn missing_clues_surface_on_numbering() {
    let mut puzzle = Puzzle::new(3, 3, "CAT..A..R").unwrap();
    puzzle.clues = vec!["Pet".to_string()];
    let loaded = Puzzle::load(&puzzle.to_bytes().unwrap()).unwrap();
    assert!(matches!(
        loaded.clue_numbering(),
        Err(PuzError::ClueCountMismatch { expected: 2, found: 1 })
    ));
    assert!(Grid::from_puzzle(&loaded).is_err());
}

#[test]
fn grid_text_must_match_dimensions() {
    let mut puzzle = Puzzle::new(3, 3, "CAT..A..R").unwrap();
    puzzle.clues = vec!["Pet".to_string(), "Pitch".to_string()];
    puzzle.fill = "CA".to_string();
    assert!(matches!(puzzle.to_bytes(), Err(PuzError::InvalidFormat(_))));

    puzzle.fill = "---..-..-".to_string();
    puzzle.solution.push('X');
    assert!(matches!(puzzle.to_bytes(), Err(PuzError::InvalidFormat(_))));
}
