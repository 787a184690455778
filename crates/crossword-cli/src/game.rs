use crate::progress::SavedGame;
use crate::script::Command;
use crossword_core::{Completion, Engine, Position, Puzzle, Session};
use std::time::{Duration, Instant};

/// Wall-clock timer that only runs while the session accepts input
#[derive(Debug, Clone)]
struct Stopwatch {
    /// When the current running stretch began
    started: Option<Instant>,
    /// Time banked from earlier stretches
    banked: Duration,
}

impl Stopwatch {
    fn new(banked: Duration) -> Self {
        Self { started: None, banked }
    }

    /// Start or stop to match the session state
    fn sync(&mut self, running: bool) {
        match (running, self.started) {
            (true, None) => self.started = Some(Instant::now()),
            (false, Some(start)) => {
                self.banked += start.elapsed();
                self.started = None;
            }
            _ => {}
        }
    }

    fn elapsed(&self) -> Duration {
        self.banked + self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
}

/// A puzzle being played from the command line
pub struct Game {
    puzzle: Puzzle,
    session: Session,
    stopwatch: Stopwatch,
}

impl Game {
    pub fn new(puzzle: Puzzle) -> Self {
        let session = Session::new(&puzzle);
        Self::with_session(puzzle, session, Duration::ZERO)
    }

    /// Pick up from saved progress
    pub fn resume(puzzle: Puzzle, saved: SavedGame) -> Self {
        let session = saved.session.into_session(&puzzle);
        Self::with_session(puzzle, session, Duration::from_secs(saved.elapsed_secs))
    }

    fn with_session(puzzle: Puzzle, session: Session, elapsed: Duration) -> Self {
        let mut stopwatch = Stopwatch::new(elapsed);
        stopwatch.sync(session.is_interactive());
        Self {
            puzzle,
            session,
            stopwatch,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_solved(&self) -> bool {
        self.session.is_solved()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    /// Format the elapsed time as MM:SS
    pub fn elapsed_string(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn completion(&self) -> Completion {
        Engine::new(&self.puzzle).check_completion(&self.session)
    }

    /// Apply one event. Returns text to print, if the event asks for any.
    ///
    /// `Save` is handled by the caller, which owns the progress store.
    pub fn apply(&mut self, command: &Command) -> Option<String> {
        match command {
            Command::Check => {
                let c = self.completion();
                return Some(format!("complete: {}  correct: {}", c.complete, c.correct));
            }
            Command::Show => return Some(self.board()),
            _ => {}
        }

        let engine = Engine::new(&self.puzzle);
        let session = &mut self.session;
        let cursor = session.cursor().position;

        let changed = match command {
            Command::Click { row, col } => engine.activate_cell(session, *row, *col),
            Command::Move(arrow) => engine.move_cursor(session, *arrow),
            Command::Type { text, at } => {
                let (row, col) = at.unwrap_or((cursor.row, cursor.col));
                engine.input_char(session, row, col, text)
            }
            Command::Backspace { at } => {
                let (row, col) = at.unwrap_or((cursor.row, cursor.col));
                engine.backspace(session, row, col)
            }
            Command::NextClue => engine.advance_clue(session, true),
            Command::PreviousClue => engine.advance_clue(session, false),
            Command::ToggleDirection => engine.toggle_direction(session),
            Command::Pause => {
                session.set_paused(true);
                true
            }
            Command::Resume => {
                session.set_paused(false);
                true
            }
            Command::Check | Command::Show | Command::Save => false,
        };

        if !changed {
            log::debug!("{command:?} had no effect");
        }
        self.stopwatch.sync(self.session.is_interactive());
        None
    }

    /// Snapshot for the progress store
    pub fn saved(&self) -> SavedGame {
        SavedGame {
            session: self.session.snapshot(),
            elapsed_secs: self.elapsed().as_secs(),
        }
    }

    /// Text rendering of the player's grid with the current word bracketed
    pub fn board(&self) -> String {
        let engine = Engine::new(&self.puzzle);
        let grid = self.puzzle.grid();
        let user = self.session.user_grid();
        let cursor = self.session.cursor();
        let word = engine.current_word(&self.session);

        let mut out = String::new();
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let pos = Position::new(row, col);
                let glyph = if !grid.is_playable(pos) {
                    '#'
                } else {
                    user.get(pos).unwrap_or('_')
                };
                let (open, close) = if pos == cursor.position {
                    ('[', ']')
                } else if word.contains(&pos) {
                    ('(', ')')
                } else {
                    (' ', ' ')
                };
                out.push_str(&format!("{open}{glyph}{close}"));
            }
            out.push('\n');
        }

        if let Some(clue) = engine.current_clue(&self.session) {
            out.push_str(&format!("{} {}: {}", clue.number, clue.direction, clue.text));
        }
        if self.session.is_paused() {
            out.push_str("\n(paused)");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossword_core::{Arrow, PuzzleDocument};

    fn pets() -> Puzzle {
        let json = r#"{
            "title": "Pets", "author": "Anon",
            "size": { "rows": 3, "cols": 3 },
            "clues": { "across": ["1. Feline", "7. Canine"], "down": [] },
            "grid": ["C","A","T",".",".",".","D","O","G"]
        }"#;
        Puzzle::load(&PuzzleDocument::from_json(json).unwrap()).unwrap()
    }

    fn run(game: &mut Game, lines: &str) {
        for line in lines.lines() {
            if let Some(cmd) = Command::parse(line).unwrap() {
                game.apply(&cmd);
            }
        }
    }

    #[test]
    fn test_script_solves_puzzle() {
        let mut game = Game::new(pets());
        run(&mut game, "type c\ntype a\ntype t\ntype d\ntype o\ntype g");
        assert!(game.is_solved());
        assert!(game.completion().correct);
    }

    #[test]
    fn test_stopwatch_stops_while_paused() {
        let mut game = Game::new(pets());
        assert!(game.stopwatch.started.is_some());

        game.apply(&Command::Pause);
        assert!(game.stopwatch.started.is_none());
        let frozen = game.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(game.elapsed(), frozen);

        game.apply(&Command::Resume);
        assert!(game.stopwatch.started.is_some());
    }

    #[test]
    fn test_paused_game_ignores_input() {
        let mut game = Game::new(pets());
        run(&mut game, "pause\ntype c");
        assert_eq!(game.session().user_grid().filled_count(), 0);
        run(&mut game, "resume\ntype c");
        assert_eq!(game.session().user_grid().filled_count(), 1);
    }

    #[test]
    fn test_resume_restores_elapsed_and_letters() {
        let mut game = Game::new(pets());
        run(&mut game, "type c\ntype a");
        let mut saved = game.saved();
        saved.elapsed_secs = 125;

        let resumed = Game::resume(pets(), saved);
        assert_eq!(resumed.session().user_grid().filled_count(), 2);
        assert!(resumed.elapsed() >= Duration::from_secs(125));
        assert!(resumed.elapsed_string().starts_with("02:0"));
    }

    #[test]
    fn test_board_marks_cursor_and_word() {
        let mut game = Game::new(pets());
        game.apply(&Command::Move(Arrow::Right));
        let board = game.board();
        let first = board.lines().next().unwrap();
        assert_eq!(first, "(_)[_](_)");
        assert!(board.contains("1 across: Feline"));
        assert!(board.lines().nth(1).unwrap().contains('#'));
    }

    #[test]
    fn test_board_shows_letters_and_pause() {
        let mut game = Game::new(pets());
        game.apply(&Command::parse("type c").unwrap().unwrap());
        game.apply(&Command::Pause);
        let board = game.board();
        assert!(board.starts_with("(C)[_](_)\n"));
        assert!(board.ends_with("1 across: Feline\n(paused)"));
    }

    #[test]
    fn test_check_reports_completion() {
        let mut game = Game::new(pets());
        let reply = game.apply(&Command::Check).unwrap();
        assert_eq!(reply, "complete: false  correct: false");
    }
}
