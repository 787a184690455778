//! Cursor and direction state machine.
//!
//! Every operation takes the host's [`Session`] by mutable reference, runs to
//! completion and returns whether anything changed. Operations on black or
//! out-of-range cells, while paused, or after the puzzle is solved are silent
//! no-ops.

use crate::clues::ClueEntry;
use crate::completion::{self, Completion};
use crate::document::Puzzle;
use crate::grid::{Arrow, Direction, Position};
use crate::session::{Cursor, Session};

/// Navigation engine bound to one loaded puzzle
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    puzzle: &'a Puzzle,
}

impl<'a> Engine<'a> {
    pub fn new(puzzle: &'a Puzzle) -> Self {
        Self { puzzle }
    }

    pub fn puzzle(&self) -> &'a Puzzle {
        self.puzzle
    }

    /// Click or tap on a cell.
    ///
    /// Activating the cursor cell again toggles the direction; any other
    /// playable cell moves the cursor there with the default direction for
    /// that cell.
    pub fn activate_cell(&self, session: &mut Session, row: usize, col: usize) -> bool {
        let pos = Position::new(row, col);
        if !session.is_interactive() || !self.puzzle.grid().is_playable(pos) {
            return false;
        }

        if session.cursor.position == pos {
            session.cursor.direction = session.cursor.direction.toggled();
        } else {
            session.cursor = Cursor {
                position: pos,
                direction: self.puzzle.default_direction(pos),
            };
        }
        log::trace!("cursor -> {:?}", session.cursor);
        true
    }

    /// Arrow key: jump to the nearest playable cell in that direction, skipping
    /// black cells. Stays put when the edge is reached first.
    pub fn move_cursor(&self, session: &mut Session, arrow: Arrow) -> bool {
        if !session.is_interactive() {
            return false;
        }

        let grid = self.puzzle.grid();
        let mut cur = grid.step(session.cursor.position, arrow);
        while let Some(pos) = cur {
            if grid.is_playable(pos) {
                session.cursor.position = pos;
                log::trace!("cursor -> {:?}", session.cursor);
                return true;
            }
            cur = grid.step(pos, arrow);
        }
        false
    }

    /// Letter entry at a cell.
    ///
    /// The last character of `text` is stored uppercased, then the cursor moves
    /// to the next empty cell later in the current word. Past the end of the
    /// word it advances to the next clue.
    pub fn input_char(&self, session: &mut Session, row: usize, col: usize, text: &str) -> bool {
        let pos = Position::new(row, col);
        if !session.is_interactive() || !self.puzzle.grid().is_playable(pos) {
            return false;
        }
        let Some(letter) = text.chars().last().filter(char::is_ascii_alphabetic) else {
            return false;
        };

        session.user.set(pos, Some(letter.to_ascii_uppercase()));
        let direction = self.word_direction(pos, session.cursor.direction);
        session.cursor = Cursor { position: pos, direction };

        if let Some(entry) = self.puzzle.clues().entry_at(pos, direction) {
            let offset = entry.offset_of(pos).unwrap_or(0);
            let next_empty = (offset + 1..entry.length)
                .map(|i| entry.cell(i))
                .find(|&p| !session.user.is_filled(p));
            match next_empty {
                Some(next) => session.cursor.position = next,
                None => {
                    self.step_clue(session, true);
                }
            }
        }

        self.refresh(session);
        true
    }

    /// Backspace at a cell.
    ///
    /// A filled cell is cleared in place. On an empty cell the cursor steps
    /// back one cell in the word and clears it, or, at the start of the word,
    /// jumps to the last cell of the previous word.
    pub fn backspace(&self, session: &mut Session, row: usize, col: usize) -> bool {
        let pos = Position::new(row, col);
        let grid = self.puzzle.grid();
        if !session.is_interactive() || !grid.is_playable(pos) {
            return false;
        }

        if session.user.is_filled(pos) {
            session.user.set(pos, None);
            self.refresh(session);
            return true;
        }

        let direction = self.word_direction(pos, session.cursor.direction);
        let clues = self.puzzle.clues();
        let Some(index) = clues.index_at(pos, direction) else {
            return false;
        };
        let entries = clues.entries(direction);

        if entries[index].start == pos {
            let previous = &entries[(index + entries.len() - 1) % entries.len()];
            session.cursor = Cursor {
                position: previous.last_cell(),
                direction,
            };
        } else if let Some(back) = grid.advance(pos, direction, false) {
            session.user.set(back, None);
            session.cursor = Cursor {
                position: back,
                direction,
            };
        }

        self.refresh(session);
        true
    }

    /// Tab / Shift+Tab
    pub fn advance_clue(&self, session: &mut Session, forward: bool) -> bool {
        if !session.is_interactive() {
            return false;
        }
        self.step_clue(session, forward)
    }

    /// Space: flip between across and down
    pub fn toggle_direction(&self, session: &mut Session) -> bool {
        if !session.is_interactive() {
            return false;
        }
        session.cursor.direction = session.cursor.direction.toggled();
        true
    }

    pub fn check_completion(&self, session: &Session) -> Completion {
        completion::check(self.puzzle.grid(), &session.user)
    }

    /// The clue selected by the cursor
    pub fn current_clue(&self, session: &Session) -> Option<&'a ClueEntry> {
        self.puzzle
            .clues()
            .entry_at(session.cursor.position, session.cursor.direction)
    }

    /// Cells of the selected word, or just the cursor cell outside any word
    pub fn current_word(&self, session: &Session) -> Vec<Position> {
        match self.current_clue(session) {
            Some(entry) => entry.cells().collect(),
            None => vec![session.cursor.position],
        }
    }

    /// Move to the first empty cell of the nearest unfinished clue in the
    /// current direction, searching from the adjacent clue and wrapping. When
    /// every clue is filled, move to the start of the adjacent clue.
    fn step_clue(&self, session: &mut Session, forward: bool) -> bool {
        let clues = self.puzzle.clues();
        let mut direction = session.cursor.direction;
        if clues.entries(direction).is_empty() {
            direction = direction.toggled();
        }
        let entries = clues.entries(direction);
        if entries.is_empty() {
            return false;
        }

        let n = entries.len();
        let adjacent = match (clues.index_at(session.cursor.position, direction), forward) {
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
            (None, true) => 0,
            (None, false) => n - 1,
        };

        let target = (0..n)
            .map(|k| if forward { (adjacent + k) % n } else { (adjacent + n - k) % n })
            .find_map(|i| entries[i].cells().find(|&p| !session.user.is_filled(p)))
            .unwrap_or(entries[adjacent].start);

        session.cursor = Cursor {
            position: target,
            direction,
        };
        log::trace!("clue advance -> {:?}", session.cursor);
        true
    }

    /// `preferred` if the cell has a word that way, otherwise the other
    /// direction when it does
    fn word_direction(&self, pos: Position, preferred: Direction) -> Direction {
        let clues = self.puzzle.clues();
        if clues.entry_at(pos, preferred).is_none() && clues.entry_at(pos, preferred.toggled()).is_some() {
            preferred.toggled()
        } else {
            preferred
        }
    }

    fn refresh(&self, session: &mut Session) {
        let result = self.check_completion(session);
        if result.correct && !session.solved {
            log::info!("puzzle solved");
        }
        session.solved = result.correct;
    }
}
