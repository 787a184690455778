//! Mutable per-puzzle session state: the player's letters, the cursor and the
//! pause/solved flags.
//!
//! A [`Session`] is owned by the host and handed to the
//! [`Engine`](crate::navigation::Engine) for every input event. Nothing here is
//! shared or locked.

use crate::completion;
use crate::document::Puzzle;
use crate::grid::{Direction, Grid, Position};
use serde::{Deserialize, Serialize};

/// Letters entered by the player, parallel to the puzzle grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<char>>,
}

impl UserGrid {
    /// An all-empty grid matching `grid`'s dimensions
    pub fn empty(grid: &Grid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cells: vec![None; grid.rows() * grid.cols()],
        }
    }

    /// Restore a saved snapshot.
    ///
    /// Returns `None` when the snapshot's dimensions differ from `grid`. Entries
    /// are trimmed and uppercased; only the first character is kept, non-letters
    /// and black cells are left empty.
    pub fn restore<S: AsRef<str>>(rows: &[Vec<S>], grid: &Grid) -> Option<Self> {
        if rows.len() != grid.rows() || rows.iter().any(|r| r.len() != grid.cols()) {
            return None;
        }

        let mut user = Self::empty(grid);
        for (r, row) in rows.iter().enumerate() {
            for (c, raw) in row.iter().enumerate() {
                let pos = Position::new(r, c);
                if !grid.is_playable(pos) {
                    continue;
                }
                let letter = raw
                    .as_ref()
                    .trim()
                    .chars()
                    .next()
                    .filter(char::is_ascii_alphabetic)
                    .map(|c| c.to_ascii_uppercase());
                user.set(pos, letter);
            }
        }
        Some(user)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The entered letter at a position
    pub fn get(&self, pos: Position) -> Option<char> {
        if pos.row < self.rows && pos.col < self.cols {
            self.cells[pos.row * self.cols + pos.col]
        } else {
            None
        }
    }

    pub fn is_filled(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    pub(crate) fn set(&mut self, pos: Position, letter: Option<char>) {
        if pos.row < self.rows && pos.col < self.cols {
            self.cells[pos.row * self.cols + pos.col] = letter;
        }
    }

    /// Number of cells holding a letter
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Snapshot as rows of one-letter (or empty) strings
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.map(String::from).unwrap_or_default()).collect())
            .collect()
    }
}

/// Cursor position and the word direction it selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub position: Position,
    pub direction: Direction,
}

/// Per-puzzle mutable state
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) user: UserGrid,
    pub(crate) cursor: Cursor,
    paused: bool,
    pub(crate) solved: bool,
}

impl Session {
    /// Fresh session with the cursor on the first playable cell
    pub fn new(puzzle: &Puzzle) -> Self {
        Self::with_progress(puzzle, UserGrid::empty(puzzle.grid()))
    }

    /// Session resuming from a saved snapshot; a snapshot with the wrong
    /// dimensions is ignored
    pub fn restore<S: AsRef<str>>(puzzle: &Puzzle, rows: &[Vec<S>]) -> Self {
        match UserGrid::restore(rows, puzzle.grid()) {
            Some(user) => Self::with_progress(puzzle, user),
            None => {
                log::info!("saved progress does not match the puzzle grid; starting fresh");
                Self::new(puzzle)
            }
        }
    }

    fn with_progress(puzzle: &Puzzle, user: UserGrid) -> Self {
        let grid = puzzle.grid();
        let position = grid.playable_positions().next().unwrap_or(Position::new(0, 0));
        let direction = puzzle.default_direction(position);
        let solved = completion::check(grid, &user).correct;
        Self {
            user,
            cursor: Cursor { position, direction },
            paused: false,
            solved,
        }
    }

    pub fn user_grid(&self) -> &UserGrid {
        &self.user
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the puzzle has been filled in correctly
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Input events are honoured only while this holds. A host's elapsed-time
    /// counter should advance only while it holds too.
    pub fn is_interactive(&self) -> bool {
        !self.paused && !self.solved
    }

    /// Host pause hook; always honoured, even after the puzzle is solved
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Serializable view for host persistence
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            progress: self.user.to_rows(),
            cursor: self.cursor,
            paused: self.paused,
        }
    }
}

/// What a host saves between visits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub progress: Vec<Vec<String>>,
    pub cursor: Cursor,
    #[serde(default)]
    pub paused: bool,
}

impl SessionSnapshot {
    /// Rebuild a session. Progress with the wrong dimensions is dropped, and a
    /// saved cursor is only reused if it still points at a playable cell.
    pub fn into_session(self, puzzle: &Puzzle) -> Session {
        let mut session = Session::restore(puzzle, &self.progress);
        if puzzle.grid().is_playable(self.cursor.position) {
            session.cursor = self.cursor;
        }
        session.paused = self.paused;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::cat_dog;
    use crate::grid::grid_from_rows;

    #[test]
    fn test_restore_rejects_mismatched_dimensions() {
        let grid = grid_from_rows(&["AB", "CD"]);
        let rows = vec![vec!["A", "B", "C"], vec!["D", "", ""]];
        assert!(UserGrid::restore(&rows, &grid).is_none());
        let rows = vec![vec!["A", "B"]];
        assert!(UserGrid::restore(&rows, &grid).is_none());
    }

    #[test]
    fn test_restore_normalizes_entries() {
        let grid = grid_from_rows(&["AB", ".D"]);
        let rows = vec![vec![" a ", "xy"], vec!["Q", "7"]];
        let user = UserGrid::restore(&rows, &grid).unwrap();
        assert_eq!(user.get(Position::new(0, 0)), Some('A'));
        assert_eq!(user.get(Position::new(0, 1)), Some('X'));
        assert_eq!(user.get(Position::new(1, 0)), None, "black cells stay empty");
        assert_eq!(user.get(Position::new(1, 1)), None);
        assert_eq!(user.to_rows(), vec![vec!["A", "X"], vec!["", ""]]);
    }

    #[test]
    fn test_new_session_starts_on_first_playable_cell() {
        let puzzle = cat_dog();
        let session = Session::new(&puzzle);
        assert_eq!(session.cursor().position, Position::new(0, 0));
        assert_eq!(session.cursor().direction, Direction::Across);
        assert!(session.is_interactive());
        assert!(!session.is_solved());
    }

    #[test]
    fn test_restore_solved_progress_disables_interaction() {
        let puzzle = cat_dog();
        let rows = vec![vec!["c", "a", "t"], vec!["", "", ""], vec!["D", "O", "G"]];
        let session = Session::restore(&puzzle, &rows);
        assert!(session.is_solved());
        assert!(!session.is_interactive());
    }

    #[test]
    fn test_pause_toggles() {
        let puzzle = cat_dog();
        let mut session = Session::new(&puzzle);
        session.toggle_pause();
        assert!(session.is_paused());
        assert!(!session.is_interactive());
        session.set_paused(false);
        assert!(session.is_interactive());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let puzzle = cat_dog();
        let rows = vec![vec!["C", "", ""], vec!["", "", ""], vec!["", "", ""]];
        let mut session = Session::restore(&puzzle, &rows);
        session.cursor = Cursor {
            position: Position::new(2, 1),
            direction: Direction::Across,
        };
        session.set_paused(true);

        let json = serde_json::to_string(&session.snapshot()).unwrap();
        let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let restored = snapshot.into_session(&puzzle);
        assert_eq!(restored.cursor().position, Position::new(2, 1));
        assert!(restored.is_paused());
        assert_eq!(restored.user_grid(), session.user_grid());
    }

    #[test]
    fn test_snapshot_with_black_cursor_keeps_default() {
        let puzzle = cat_dog();
        let snapshot = SessionSnapshot {
            progress: vec![vec![String::new(); 3]; 3],
            cursor: Cursor {
                position: Position::new(1, 1),
                direction: Direction::Down,
            },
            paused: false,
        };
        let session = snapshot.into_session(&puzzle);
        assert_eq!(session.cursor().position, Position::new(0, 0));
    }
}
