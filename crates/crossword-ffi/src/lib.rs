use crossword_core::{
    Arrow, ClueEntry, DocumentError, Engine, FormatError, Position, Puzzle, PuzzleDocument, Session,
    SessionSnapshot,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

uniffi::setup_scaffolding!();

/// Why a puzzle could not be opened
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CrosswordError {
    /// The `.puz` buffer is malformed; `reason` is `bad_magic`, `bad_dimensions` or `truncated`
    #[error("invalid .puz data ({reason}): {message}")]
    Format { reason: String, message: String },
    /// The structured document is unusable
    #[error("invalid puzzle: {message}")]
    Document { message: String },
}

impl From<FormatError> for CrosswordError {
    fn from(e: FormatError) -> Self {
        CrosswordError::Format {
            reason: e.reason().to_string(),
            message: e.to_string(),
        }
    }
}

impl From<DocumentError> for CrosswordError {
    fn from(e: DocumentError) -> Self {
        CrosswordError::Document { message: e.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ClueDirection {
    Across,
    Down,
}

impl From<crossword_core::Direction> for ClueDirection {
    fn from(d: crossword_core::Direction) -> Self {
        match d {
            crossword_core::Direction::Across => ClueDirection::Across,
            crossword_core::Direction::Down => ClueDirection::Down,
        }
    }
}

impl From<ClueDirection> for crossword_core::Direction {
    fn from(d: ClueDirection) -> Self {
        match d {
            ClueDirection::Across => crossword_core::Direction::Across,
            ClueDirection::Down => crossword_core::Direction::Down,
        }
    }
}

/// Arrow keys
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl From<MoveDirection> for Arrow {
    fn from(m: MoveDirection) -> Self {
        match m {
            MoveDirection::Up => Arrow::Up,
            MoveDirection::Down => Arrow::Down,
            MoveDirection::Left => Arrow::Left,
            MoveDirection::Right => Arrow::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CellPosition {
    pub row: u32,
    pub col: u32,
}

impl From<Position> for CellPosition {
    fn from(p: Position) -> Self {
        Self {
            row: p.row as u32,
            col: p.col as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CursorState {
    pub row: u32,
    pub col: u32,
    pub direction: ClueDirection,
}

/// Everything a view needs to draw one square
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CellState {
    pub row: u32,
    pub col: u32,
    pub black: bool,
    /// Clue number printed in the corner
    pub number: Option<u32>,
    /// Player's letter
    pub letter: Option<String>,
    pub in_current_word: bool,
    pub is_cursor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ClueInfo {
    pub number: u32,
    pub direction: ClueDirection,
    pub text: String,
    pub row: u32,
    pub col: u32,
    pub length: u32,
}

impl From<&ClueEntry> for ClueInfo {
    fn from(e: &ClueEntry) -> Self {
        Self {
            number: e.number,
            direction: e.direction.into(),
            text: e.text.clone(),
            row: e.start.row as u32,
            col: e.start.col as u32,
            length: e.length as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct CompletionState {
    pub complete: bool,
    pub correct: bool,
}

/// A puzzle and one player's progress on it
#[derive(uniffi::Object)]
pub struct CrosswordGame {
    puzzle: Puzzle,
    session: Mutex<Session>,
    /// Problems found while decoding or indexing
    inconsistencies: Vec<String>,
}

impl CrosswordGame {
    fn with_puzzle(puzzle: Puzzle, mut inconsistencies: Vec<String>) -> Arc<Self> {
        inconsistencies.extend(puzzle.clues().inconsistencies().iter().map(|i| i.to_string()));
        Arc::new(Self {
            session: Mutex::new(Session::new(&puzzle)),
            puzzle,
            inconsistencies,
        })
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn engine(&self) -> Engine<'_> {
        Engine::new(&self.puzzle)
    }
}

#[uniffi::export]
impl CrosswordGame {
    /// Open a structured JSON document
    #[uniffi::constructor]
    pub fn from_json(json: String) -> Result<Arc<Self>, CrosswordError> {
        let puzzle = Puzzle::from_json(&json)?;
        Ok(Self::with_puzzle(puzzle, Vec::new()))
    }

    /// Open a `.puz` buffer
    #[uniffi::constructor]
    pub fn from_puz(bytes: Vec<u8>) -> Result<Arc<Self>, CrosswordError> {
        let decoded = crossword_core::decode_puz(&bytes)?;
        let puzzle = Puzzle::load(&decoded.document)?;
        let issues = decoded.inconsistencies.iter().map(|i| i.to_string()).collect();
        Ok(Self::with_puzzle(puzzle, issues))
    }

    pub fn title(&self) -> String {
        self.puzzle.title().to_string()
    }

    pub fn author(&self) -> String {
        self.puzzle.author().to_string()
    }

    pub fn copyright(&self) -> String {
        self.puzzle.copyright().to_string()
    }

    pub fn notes(&self) -> String {
        self.puzzle.notes().to_string()
    }

    pub fn rows(&self) -> u32 {
        self.puzzle.grid().rows() as u32
    }

    pub fn cols(&self) -> u32 {
        self.puzzle.grid().cols() as u32
    }

    pub fn inconsistencies(&self) -> Vec<String> {
        self.inconsistencies.clone()
    }

    /// The puzzle as a structured JSON document
    pub fn to_document_json(&self) -> Result<String, CrosswordError> {
        Ok(self.puzzle.to_document().to_json()?)
    }

    /// State of every square, row-major
    pub fn cells(&self) -> Vec<CellState> {
        let session = self.session();
        let word = self.engine().current_word(&session);
        let cursor = session.cursor().position;
        let grid = self.puzzle.grid();

        grid.positions()
            .map(|pos| CellState {
                row: pos.row as u32,
                col: pos.col as u32,
                black: !grid.is_playable(pos),
                number: self.puzzle.clues().number_at(pos),
                letter: session.user_grid().get(pos).map(String::from),
                in_current_word: word.contains(&pos),
                is_cursor: pos == cursor,
            })
            .collect()
    }

    pub fn clues(&self, direction: ClueDirection) -> Vec<ClueInfo> {
        self.puzzle.clues().entries(direction.into()).iter().map(ClueInfo::from).collect()
    }

    pub fn current_clue(&self) -> Option<ClueInfo> {
        let session = self.session();
        self.engine().current_clue(&session).map(ClueInfo::from)
    }

    pub fn current_word(&self) -> Vec<CellPosition> {
        let session = self.session();
        self.engine().current_word(&session).into_iter().map(CellPosition::from).collect()
    }

    pub fn cursor(&self) -> CursorState {
        let cursor = self.session().cursor();
        CursorState {
            row: cursor.position.row as u32,
            col: cursor.position.col as u32,
            direction: cursor.direction.into(),
        }
    }

    /// Click or tap a square
    pub fn activate_cell(&self, row: u32, col: u32) -> bool {
        self.engine().activate_cell(&mut self.session(), row as usize, col as usize)
    }

    pub fn move_cursor(&self, direction: MoveDirection) -> bool {
        self.engine().move_cursor(&mut self.session(), direction.into())
    }

    pub fn input_char(&self, row: u32, col: u32, text: String) -> bool {
        self.engine().input_char(&mut self.session(), row as usize, col as usize, &text)
    }

    pub fn backspace(&self, row: u32, col: u32) -> bool {
        self.engine().backspace(&mut self.session(), row as usize, col as usize)
    }

    /// Tab (`forward`) or Shift+Tab
    pub fn advance_clue(&self, forward: bool) -> bool {
        self.engine().advance_clue(&mut self.session(), forward)
    }

    pub fn toggle_direction(&self) -> bool {
        self.engine().toggle_direction(&mut self.session())
    }

    pub fn check_completion(&self) -> CompletionState {
        let c = self.engine().check_completion(&self.session());
        CompletionState {
            complete: c.complete,
            correct: c.correct,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.session().is_solved()
    }

    pub fn is_paused(&self) -> bool {
        self.session().is_paused()
    }

    pub fn set_paused(&self, paused: bool) {
        self.session().set_paused(paused);
    }

    /// Serialize progress for saving
    pub fn serialize(&self) -> String {
        // Snapshot holds only strings, bools and integers
        serde_json::to_string(&self.session().snapshot()).unwrap_or_default()
    }

    /// Replace progress with a saved snapshot; false if it cannot be parsed
    pub fn restore(&self, json: String) -> bool {
        match serde_json::from_str::<SessionSnapshot>(&json) {
            Ok(snapshot) => {
                *self.session() = snapshot.into_session(&self.puzzle);
                true
            }
            Err(_) => false,
        }
    }
}

/// Convert a `.puz` buffer to the structured JSON document
#[uniffi::export]
pub fn puz_to_json(bytes: Vec<u8>) -> Result<String, CrosswordError> {
    let decoded = crossword_core::decode_puz(&bytes)?;
    Ok(decoded.document.to_json()?)
}

/// Check a grid of letters (row-major, `""` for empty) without a game object
#[uniffi::export]
pub fn check_grid(document_json: String, rows: Vec<Vec<String>>) -> Result<CompletionState, CrosswordError> {
    let document = PuzzleDocument::from_json(&document_json)?;
    let puzzle = Puzzle::load(&document)?;
    let c = crossword_core::completion::check_rows(puzzle.grid(), &rows);
    Ok(CompletionState {
        complete: c.complete,
        correct: c.correct,
    })
}
