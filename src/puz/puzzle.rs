use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use log::{debug, info, trace, warn};

use super::codec::buffer::{PuzzleBuffer, PuzzleWriter};
use super::codec::checksum::{data_cksum, header_cksum, magic_cksum};
use super::codec::cipher;
use super::extensions::{self, Extensions, Rebus, TimerState};
use super::format::extension::{self as block, RawExtension};
use super::format::header::{Header, ACROSS_DOWN, MAGIC_OFFSET};
use super::numbering::ClueNumbering;
use super::types::error::{ChecksumKind, PuzError, Result};
use super::types::models::*;
use super::utils;

/// An Across Lite puzzle document.
///
/// Holds every section of the file, including bytes this crate does not
/// interpret, so that an unmodified document serializes back to the bytes it
/// was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    /// Bytes found before the header, kept verbatim.
    pub preamble: Vec<u8>,
    /// Bytes found after the last extension block, kept verbatim.
    pub postscript: Vec<u8>,
    pub title: String,
    pub author: String,
    pub copyright: String,
    pub notes: String,
    /// Row-major answers; `.` (or `:` in diagramless puzzles) marks a block.
    pub solution: String,
    /// Row-major player entries; `-` marks an empty cell.
    pub fill: String,
    /// Clues in stored order: by number, across before down.
    pub clues: Vec<String>,
    pub extensions: Extensions,
    pub puzzle_type: PuzzleType,
    width: u8,
    height: u8,
    version: FileVersion,
    encoding: &'static Encoding,
    solution_state: SolutionState,
    scrambled_cksum: u16,
    reserved_1c: [u8; 2],
    reserved_20: [u8; 12],
}

impl Puzzle {
    /// Creates an unlocked version 1.3 puzzle with an empty fill.
    ///
    /// Block cells of `solution` are copied into the fill; every other cell
    /// starts blank.
    pub fn new(width: u8, height: u8, solution: &str) -> Result<Self> {
        let cells = usize::from(width) * usize::from(height);
        if cells == 0 {
            return Err(PuzError::InvalidFormat(format!(
                "Puzzle dimensions {}x{} must be positive",
                width, height
            )));
        }
        if solution.chars().count() != cells {
            return Err(PuzError::InvalidFormat(format!(
                "Solution has {} cells, expected {}",
                solution.chars().count(),
                cells
            )));
        }
        let fill = solution
            .chars()
            .map(|c| if is_block(c) { c } else { BLANK })
            .collect();
        let version = FileVersion::parse(FileVersion::DEFAULT)?;
        Ok(Self {
            preamble: Vec::new(),
            postscript: Vec::new(),
            title: String::new(),
            author: String::new(),
            copyright: String::new(),
            notes: String::new(),
            solution: solution.to_string(),
            fill,
            clues: Vec::new(),
            extensions: Extensions::new(),
            puzzle_type: PuzzleType::Normal,
            width,
            height,
            encoding: version.text_encoding(),
            version,
            solution_state: SolutionState::Unlocked,
            scrambled_cksum: 0,
            reserved_1c: [0; 2],
            reserved_20: [0; 12],
        })
    }

    /// Reads and parses a puzzle file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening puzzle file: {}", path.display());
        let data = std::fs::read(path)?;
        Self::load(&data)
    }

    /// Serializes the puzzle and writes it to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        std::fs::write(path, &data)?;
        info!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    /// Parses a puzzle, using the text encoding implied by its file version.
    pub fn load(data: &[u8]) -> Result<Self> {
        Self::load_with_encoding(data, None)
    }

    /// Parses a puzzle and validates every stored checksum.
    ///
    /// Priority for determining text encoding (highest → lowest):
    /// 1. `user_encoding`
    /// 2. The file version: UTF-8 from 2.0, Windows-1252 before
    ///
    /// # Errors
    /// Returns an error if:
    /// - The `ACROSS&DOWN` marker is missing
    /// - Any section is truncated
    /// - Text does not decode in the selected encoding
    /// - The global, header, magic or any extension checksum does not match
    pub fn load_with_encoding(data: &[u8], user_encoding: Option<&'static Encoding>) -> Result<Self> {
        info!("Loading puzzle from {} bytes", data.len());
        let mut buf = PuzzleBuffer::new(data);

        buf.seek_to(ACROSS_DOWN, MAGIC_OFFSET)?;
        let preamble = buf.consumed().to_vec();
        if !preamble.is_empty() {
            debug!("Preserving {} bytes of preamble", preamble.len());
        }

        let header = Header::unpack(&mut buf)?;
        let version = FileVersion::parse(header.file_version)?;
        let encoding = match user_encoding {
            Some(encoding) => {
                info!(
                    "Using caller-supplied encoding {} instead of {} for version {}",
                    encoding.name(),
                    version.text_encoding().name(),
                    version
                );
                encoding
            }
            None => version.text_encoding(),
        };
        debug!("File version {}, text encoding {}", version, encoding.name());
        buf.set_encoding(encoding);

        let (width, height) = (header.width, header.height);
        let cells = usize::from(width) * usize::from(height);
        if cells == 0 {
            return Err(PuzError::InvalidFormat(format!(
                "Puzzle dimensions {}x{} must be positive",
                width, height
            )));
        }
        let solution = read_grid(&mut buf, cells, "solution")?;
        let fill = read_grid(&mut buf, cells, "fill")?;

        let title = buf.read_string()?;
        let author = buf.read_string()?;
        let copyright = buf.read_string()?;
        let clues = (0..header.clue_count)
            .map(|_| buf.read_string())
            .collect::<Result<Vec<_>>>()?;
        let notes = buf.read_string()?;
        debug!("Read {:?} by {:?} with {} clues", title, author, clues.len());

        let blocks = block::read_blocks(&mut buf)?;
        let mut extensions = Extensions::new();
        for RawExtension { code, data, .. } in blocks.iter().cloned() {
            debug!("Extension {}: {} bytes", code, data.len());
            if extensions.insert(code, data).is_some() {
                warn!("Duplicate extension {}; keeping the last payload", code);
            }
        }

        let postscript = buf.read_to_end().to_vec();
        if !postscript.is_empty() {
            warn!("Preserving {} bytes after the last extension block", postscript.len());
        }

        let puzzle = Self {
            preamble,
            postscript,
            title,
            author,
            copyright,
            notes,
            solution,
            fill,
            clues,
            extensions,
            puzzle_type: PuzzleType::from(header.puzzle_type),
            width,
            height,
            version,
            encoding,
            solution_state: SolutionState::from(header.solution_state),
            scrambled_cksum: header.scrambled_cksum,
            reserved_1c: header.reserved_1c,
            reserved_20: header.reserved_20,
        };

        verify(ChecksumKind::Global, header.global_cksum.into(), puzzle.global_cksum()?.into())?;
        verify(ChecksumKind::Header, header.header_cksum.into(), puzzle.header_cksum(0)?.into())?;
        verify(ChecksumKind::Magic, header.magic_cksum, puzzle.magic_cksum()?)?;
        for raw in &blocks {
            verify(
                ChecksumKind::Extension(raw.code),
                raw.stored_cksum.into(),
                raw.actual_cksum().into(),
            )?;
        }

        info!(
            "Loaded {}x{} puzzle with {} extensions",
            width,
            height,
            puzzle.extensions.len()
        );
        Ok(puzzle)
    }

    /// Serializes every section with freshly computed checksums.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.check_grid_text("Solution", &self.solution)?;
        self.check_grid_text("Fill", &self.fill)?;
        let mut out = PuzzleWriter::new(self.encoding);
        out.write(&self.preamble)?;

        let header = Header {
            global_cksum: self.global_cksum()?,
            header_cksum: self.header_cksum(0)?,
            magic_cksum: self.magic_cksum()?,
            file_version: self.version.raw(),
            reserved_1c: self.reserved_1c,
            scrambled_cksum: self.scrambled_cksum,
            reserved_20: self.reserved_20,
            width: self.width,
            height: self.height,
            clue_count: self.clue_count()?,
            puzzle_type: self.puzzle_type.into(),
            solution_state: self.solution_state.into(),
        };
        header.pack(&mut out)?;

        out.write_text(&self.solution)?;
        out.write_text(&self.fill)?;
        out.write_string(&self.title)?;
        out.write_string(&self.author)?;
        out.write_string(&self.copyright)?;
        for clue in &self.clues {
            out.write_string(clue)?;
        }
        out.write_string(&self.notes)?;

        for (code, data) in self.extensions.iter() {
            block::write_block(&mut out, code, data)?;
        }
        out.write(&self.postscript)?;

        debug!("Serialized puzzle to {} bytes", out.len());
        Ok(out.into_bytes())
    }

    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    pub fn height(&self) -> usize {
        usize::from(self.height)
    }

    pub fn version(&self) -> FileVersion {
        self.version
    }

    /// Changes the file version and switches to the text encoding it implies.
    pub fn set_version(&mut self, version: FileVersion) {
        debug!("File version {} -> {}", self.version, version);
        self.version = version;
        self.encoding = version.text_encoding();
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn solution_state(&self) -> SolutionState {
        self.solution_state
    }

    pub fn scrambled_cksum(&self) -> u16 {
        self.scrambled_cksum
    }

    pub fn is_solution_locked(&self) -> bool {
        self.solution_state != SolutionState::Unlocked
    }

    /// The block character used by this puzzle's grids.
    pub fn block_char(&self) -> char {
        if self.puzzle_type == PuzzleType::Diagramless {
            DIAGRAMLESS_BLOCK
        } else {
            BLOCK
        }
    }

    fn clue_count(&self) -> Result<u16> {
        u16::try_from(self.clues.len()).map_err(|_| {
            PuzError::InvalidFormat(format!("{} clues do not fit the header", self.clues.len()))
        })
    }

    fn encode<'a>(&self, text: &'a str) -> Result<Cow<'a, [u8]>> {
        utils::encode_text(text, self.encoding)
    }

    /// Checksum of the width, height, clue count, type and state fields.
    pub fn header_cksum(&self, seed: u16) -> Result<u16> {
        Ok(header_cksum(
            self.width,
            self.height,
            self.clue_count()?,
            self.puzzle_type.into(),
            self.solution_state.into(),
            seed,
        ))
    }

    /// Checksum of the text fields.
    ///
    /// Title, author and copyright count with their NUL only when non-empty;
    /// clues count without a NUL and only when non-empty; notes count from
    /// version 1.3 on, with their NUL, only when non-empty.
    pub fn text_cksum(&self, seed: u16) -> Result<u16> {
        let mut cksum = seed;
        for field in [&self.title, &self.author, &self.copyright] {
            if !field.is_empty() {
                cksum = data_cksum(&self.encode(field)?, cksum);
                cksum = data_cksum(&[0], cksum);
            }
        }
        for clue in self.clues.iter().filter(|clue| !clue.is_empty()) {
            cksum = data_cksum(&self.encode(clue)?, cksum);
        }
        if self.version.checksums_notes() && !self.notes.is_empty() {
            cksum = data_cksum(&self.encode(&self.notes)?, cksum);
            cksum = data_cksum(&[0], cksum);
        }
        Ok(cksum)
    }

    pub fn global_cksum(&self) -> Result<u16> {
        let mut cksum = self.header_cksum(0)?;
        cksum = data_cksum(&self.encode(&self.solution)?, cksum);
        cksum = data_cksum(&self.encode(&self.fill)?, cksum);
        self.text_cksum(cksum)
    }

    pub fn magic_cksum(&self) -> Result<u64> {
        Ok(magic_cksum([
            self.header_cksum(0)?,
            data_cksum(&self.encode(&self.solution)?, 0),
            data_cksum(&self.encode(&self.fill)?, 0),
            self.text_cksum(0)?,
        ]))
    }

    /// Scrambles the solution behind `key`. Does nothing if already locked.
    ///
    /// # Errors
    /// `InvalidKey` for a key outside `1000..=9999`, `Unscramblable` when the
    /// solution holds anything but blocks and the letters A-Z. The puzzle is
    /// unchanged on error.
    pub fn lock_solution(&mut self, key: u16) -> Result<()> {
        if self.is_solution_locked() {
            debug!("Solution already locked");
            return Ok(());
        }
        let (w, h) = (self.width(), self.height());
        let cksum = cipher::scrambled_cksum(&self.solution, w, h, self.encoding)?;
        let scrambled = cipher::scramble_solution(&self.solution, w, h, key)?;
        self.solution = scrambled;
        self.scrambled_cksum = cksum;
        self.solution_state = SolutionState::Locked;
        debug!("Locked solution, scrambled checksum {:#06x}", cksum);
        Ok(())
    }

    /// Restores the solution locked behind `key`. Does nothing if unlocked.
    ///
    /// # Errors
    /// `IncorrectKey` when the unscrambled text does not reproduce the stored
    /// checksum. The scrambled solution is left untouched and the caller may
    /// retry.
    pub fn unlock_solution(&mut self, key: u16) -> Result<()> {
        if !self.is_solution_locked() {
            debug!("Solution already unlocked");
            return Ok(());
        }
        let unscrambled = cipher::unscramble_solution(&self.solution, self.width(), self.height(), key)?;
        if !self.check_answers(&unscrambled)? {
            debug!("Key {} does not unlock the solution", key);
            return Err(PuzError::IncorrectKey);
        }
        self.solution = unscrambled;
        self.scrambled_cksum = 0;
        self.solution_state = SolutionState::Unlocked;
        debug!("Unlocked solution");
        Ok(())
    }

    /// Compares a full candidate grid with the answers.
    ///
    /// A locked puzzle can only compare checksums, so `candidate` must be
    /// complete for the comparison to be meaningful.
    pub fn check_answers(&self, candidate: &str) -> Result<bool> {
        if self.is_solution_locked() {
            let cksum = cipher::scrambled_cksum(candidate, self.width(), self.height(), self.encoding)?;
            trace!("Scrambled checksum: stored {:#06x}, candidate {:#06x}", self.scrambled_cksum, cksum);
            Ok(cksum == self.scrambled_cksum)
        } else {
            Ok(candidate == self.solution)
        }
    }

    /// Numbers the grid and pairs each entry with its stored clue.
    pub fn clue_numbering(&self) -> Result<ClueNumbering> {
        let grid: Vec<char> = self.solution.chars().collect();
        ClueNumbering::build(&grid, &self.clues, self.width(), self.height())
    }

    pub fn has_rebus(&self) -> bool {
        self.extensions.contains(ExtensionCode::REBUS)
    }

    pub fn rebus(&self) -> Result<Option<Rebus>> {
        Rebus::from_extensions(&self.extensions, self.encoding)
    }

    pub fn set_rebus(&mut self, rebus: &Rebus) -> Result<()> {
        rebus.store(&mut self.extensions, self.encoding)
    }

    /// Per-cell markup; all clear when there is no `GEXT` block.
    fn check_grid_text(&self, name: &str, text: &str) -> Result<()> {
        let cells = self.width() * self.height();
        let found = text.chars().count();
        if found != cells {
            return Err(PuzError::InvalidFormat(format!(
                "{} has {} cells, expected {}",
                name, found, cells
            )));
        }
        Ok(())
    }

    pub fn markup(&self) -> Vec<CellMarkup> {
        match self.extensions.get(ExtensionCode::MARKUP) {
            Some(data) => extensions::parse_markup(data),
            None => vec![CellMarkup::default(); self.width() * self.height()],
        }
    }

    pub fn has_markup(&self) -> bool {
        self.markup().iter().any(|m| !m.is_empty())
    }

    /// Stores per-cell markup, one entry per cell. Unknown bits of an existing
    /// `GEXT` block are kept.
    pub fn set_markup(&mut self, markup: &[CellMarkup]) -> Result<()> {
        let cells = self.width() * self.height();
        if markup.len() != cells {
            return Err(PuzError::InvalidFormat(format!(
                "Markup has {} cells, expected {}",
                markup.len(),
                cells
            )));
        }
        let data = extensions::pack_markup(markup, self.extensions.get(ExtensionCode::MARKUP));
        self.extensions.insert(ExtensionCode::MARKUP, data);
        Ok(())
    }

    pub fn timer(&self) -> Result<Option<TimerState>> {
        self.extensions
            .get(ExtensionCode::TIMER)
            .map(TimerState::parse)
            .transpose()
    }

    pub fn set_timer(&mut self, timer: TimerState) {
        self.extensions.insert(ExtensionCode::TIMER, timer.to_bytes());
    }
}

/// Reads a grid of exactly `cells` characters.
fn read_grid(buf: &mut PuzzleBuffer, cells: usize, name: &str) -> Result<String> {
    let grid = buf.read_text(cells)?;
    let count = grid.chars().count();
    if count != cells {
        return Err(PuzError::InvalidFormat(format!(
            "{} grid decodes to {} cells, expected {}",
            name, count, cells
        )));
    }
    Ok(grid)
}

fn verify(kind: ChecksumKind, expected: u64, actual: u64) -> Result<()> {
    trace!("{} checksum: stored {:#x}, computed {:#x}", kind, expected, actual);
    if expected != actual {
        return Err(PuzError::ChecksumMismatch {
            kind,
            expected,
            actual,
        });
    }
    Ok(())
}
