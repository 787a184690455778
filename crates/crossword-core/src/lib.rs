//! Crossword engine
//!
//! Derives clue numbering from a grid, drives a cursor/direction state
//! machine over the player's letters, checks completion, and decodes the
//! legacy `.puz` binary format into the structured document shape.
//!
//! ```
//! use crossword_core::{Engine, Puzzle, PuzzleDocument, Session};
//!
//! let json = r#"{
//!     "title": "Pets", "author": "Anon",
//!     "size": { "rows": 3, "cols": 3 },
//!     "clues": { "across": ["1. Feline", "7. Canine"], "down": [] },
//!     "grid": ["C","A","T",".",".",".","D","O","G"]
//! }"#;
//! let puzzle = Puzzle::load(&PuzzleDocument::from_json(json).unwrap()).unwrap();
//! let engine = Engine::new(&puzzle);
//! let mut session = Session::new(&puzzle);
//!
//! for (row, word) in [(0, "CAT"), (2, "DOG")] {
//!     for (col, letter) in word.chars().enumerate() {
//!         engine.input_char(&mut session, row, col, &letter.to_string());
//!     }
//! }
//! assert!(engine.check_completion(&session).correct);
//! ```

pub mod clues;
pub mod completion;
pub mod document;
pub mod error;
pub mod grid;
pub mod navigation;
pub mod puz;
pub mod session;

pub use clues::{ClueEntry, ClueIndex, NumberGrid};
pub use completion::Completion;
pub use document::{ClueLists, Puzzle, PuzzleDocument, Size};
pub use error::{DataInconsistency, DocumentError, FormatError};
pub use grid::{Arrow, Cell, Direction, Grid, Position};
pub use navigation::Engine;
pub use session::{Cursor, Session, SessionSnapshot, UserGrid};

/// Load a structured document into a grid and clue index
pub fn load(document: &PuzzleDocument) -> Result<Puzzle, DocumentError> {
    Puzzle::load(document)
}

/// Decode a `.puz` buffer
pub fn decode_puz(bytes: &[u8]) -> Result<puz::Decoded, FormatError> {
    puz::decode(bytes)
}
