//! Browser-side game state, independent of any JS API

use crossword_core::{Arrow, ClueEntry, Direction, Engine, Puzzle, Session, SessionSnapshot};
use serde::{Deserialize, Serialize};

/// Saved game as stored in `localStorage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableState {
    #[serde(flatten)]
    pub session: SessionSnapshot,
    #[serde(default)]
    pub elapsed_secs: u32,
}

/// One square as handed to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub black: bool,
    pub number: Option<u32>,
    pub letter: Option<char>,
    pub cursor: bool,
    pub in_word: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClueView {
    pub number: u32,
    pub direction: Direction,
    pub text: String,
    pub row: usize,
    pub col: usize,
    pub length: usize,
    /// Every cell of the word holds a letter
    pub filled: bool,
}

pub struct GameState {
    puzzle: Puzzle,
    session: Session,
    /// Milliseconds of interactive play
    elapsed_ms: f64,
}

impl GameState {
    pub fn new(puzzle: Puzzle) -> Self {
        let session = Session::new(&puzzle);
        Self {
            puzzle,
            session,
            elapsed_ms: 0.0,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn engine(&self) -> Engine<'_> {
        Engine::new(&self.puzzle)
    }

    /// Advance the clock by one frame; frozen while paused or solved
    pub fn tick(&mut self, delta_ms: f64) {
        if self.session.is_interactive() && delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
    }

    pub fn elapsed_secs(&self) -> u32 {
        (self.elapsed_ms / 1000.0) as u32
    }

    pub fn elapsed_string(&self) -> String {
        let secs = self.elapsed_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn toggle_pause(&mut self) {
        self.session.toggle_pause();
    }

    /// Keyboard input using `KeyboardEvent.key` names
    pub fn handle_key(&mut self, key: &str, shift: bool) -> bool {
        let engine = Engine::new(&self.puzzle);
        let session = &mut self.session;
        let cursor = session.cursor().position;

        match key {
            "ArrowUp" => engine.move_cursor(session, Arrow::Up),
            "ArrowDown" => engine.move_cursor(session, Arrow::Down),
            "ArrowLeft" => engine.move_cursor(session, Arrow::Left),
            "ArrowRight" => engine.move_cursor(session, Arrow::Right),
            "Tab" => engine.advance_clue(session, !shift),
            " " => engine.toggle_direction(session),
            "Backspace" | "Delete" => engine.backspace(session, cursor.row, cursor.col),
            _ if key.chars().count() == 1 => engine.input_char(session, cursor.row, cursor.col, key),
            _ => false,
        }
    }

    pub fn click(&mut self, row: usize, col: usize) -> bool {
        let engine = Engine::new(&self.puzzle);
        engine.activate_cell(&mut self.session, row, col)
    }

    pub fn input(&mut self, row: usize, col: usize, text: &str) -> bool {
        let engine = Engine::new(&self.puzzle);
        engine.input_char(&mut self.session, row, col, text)
    }

    pub fn backspace(&mut self, row: usize, col: usize) -> bool {
        let engine = Engine::new(&self.puzzle);
        engine.backspace(&mut self.session, row, col)
    }

    pub fn cells(&self) -> Vec<CellView> {
        let grid = self.puzzle.grid();
        let word = self.engine().current_word(&self.session);
        let cursor = self.session.cursor().position;

        grid.positions()
            .map(|pos| CellView {
                row: pos.row,
                col: pos.col,
                black: !grid.is_playable(pos),
                number: self.puzzle.clues().number_at(pos),
                letter: self.session.user_grid().get(pos),
                cursor: pos == cursor,
                in_word: word.contains(&pos),
            })
            .collect()
    }

    fn clue_view(&self, entry: &ClueEntry) -> ClueView {
        let user = self.session.user_grid();
        ClueView {
            number: entry.number,
            direction: entry.direction,
            text: entry.text.clone(),
            row: entry.start.row,
            col: entry.start.col,
            length: entry.length,
            filled: entry.cells().all(|p| user.is_filled(p)),
        }
    }

    pub fn clues(&self, direction: Direction) -> Vec<ClueView> {
        self.puzzle
            .clues()
            .entries(direction)
            .iter()
            .map(|e| self.clue_view(e))
            .collect()
    }

    pub fn current_clue(&self) -> Option<ClueView> {
        self.engine().current_clue(&self.session).map(|e| self.clue_view(e))
    }

    pub fn is_complete(&self) -> bool {
        self.engine().check_completion(&self.session).complete
    }

    pub fn is_correct(&self) -> bool {
        self.engine().check_completion(&self.session).correct
    }

    pub fn to_serializable(&self) -> SerializableState {
        SerializableState {
            session: self.session.snapshot(),
            elapsed_secs: self.elapsed_secs(),
        }
    }

    /// Apply a saved state to this puzzle
    pub fn restore(&mut self, state: SerializableState) {
        self.session = state.session.into_session(&self.puzzle);
        self.elapsed_ms = f64::from(state.elapsed_secs) * 1000.0;
    }
}
