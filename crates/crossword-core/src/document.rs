//! The structured puzzle document and the loaded, immutable [`Puzzle`].

use crate::clues::ClueIndex;
use crate::error::DocumentError;
use crate::grid::{Direction, Grid, Position};
use serde::{Deserialize, Serialize};

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

/// Raw clue lists, each entry formatted `"<number>. <text>"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueLists {
    #[serde(default)]
    pub across: Vec<String>,
    #[serde(default)]
    pub down: Vec<String>,
}

/// Structured puzzle document (the canonical interchange shape)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub size: Size,
    #[serde(default)]
    pub clues: ClueLists,
    /// Flat row-major cells, each `.` or a letter
    pub grid: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl PuzzleDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A loaded puzzle: validated grid plus its clue index. Immutable once built.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: Grid,
    clues: ClueIndex,
    title: String,
    author: String,
    copyright: String,
    notes: String,
}

impl Puzzle {
    /// Validate a document and index its clues
    pub fn load(document: &PuzzleDocument) -> Result<Self, DocumentError> {
        let grid = Grid::from_cells(document.size.rows, document.size.cols, &document.grid)?;
        if grid.playable_count() == 0 {
            return Err(DocumentError::NoPlayableCells);
        }
        let clues = ClueIndex::build(&grid, &document.clues.across, &document.clues.down);

        log::debug!("loaded {:?} by {:?}", document.title, document.author);

        Ok(Self {
            grid,
            clues,
            title: document.title.clone(),
            author: document.author.clone(),
            copyright: document.copyright.clone(),
            notes: document.notes.clone(),
        })
    }

    /// Parse and load a JSON document
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Self::load(&PuzzleDocument::from_json(json)?)
    }

    /// Re-encode as a structured document
    pub fn to_document(&self) -> PuzzleDocument {
        PuzzleDocument {
            title: self.title.clone(),
            author: self.author.clone(),
            size: Size {
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            },
            clues: ClueLists {
                across: self.clues.clue_strings(Direction::Across),
                down: self.clues.clue_strings(Direction::Down),
            },
            grid: self.grid.to_cells(),
            copyright: self.copyright.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn clues(&self) -> &ClueIndex {
        &self.clues
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Direction chosen when the cursor lands on a new cell: down only when the
    /// cell belongs to a down word and no across word
    pub fn default_direction(&self, pos: Position) -> Direction {
        let across = self.clues.entry_at(pos, Direction::Across).is_some();
        let down = self.clues.entry_at(pos, Direction::Down).is_some();
        if down && !across {
            Direction::Down
        } else {
            Direction::Across
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn cat_dog_document() -> PuzzleDocument {
        PuzzleDocument {
            title: "Pets".into(),
            author: "Tester".into(),
            size: Size { rows: 3, cols: 3 },
            clues: ClueLists {
                across: vec!["1. Feline".into(), "7. Canine".into()],
                down: vec![],
            },
            grid: ["C", "A", "T", ".", ".", ".", "D", "O", "G"].map(String::from).to_vec(),
            copyright: String::new(),
            notes: String::new(),
        }
    }

    pub(crate) fn cat_dog() -> Puzzle {
        Puzzle::load(&cat_dog_document()).expect("valid document")
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{
            "title": "Pets",
            "author": "Tester",
            "size": { "rows": 3, "cols": 3 },
            "clues": { "across": ["1. Feline", "7. Canine"], "down": [] },
            "grid": ["C","A","T",".",".",".","D","O","G"]
        }"#;
        let puzzle = Puzzle::from_json(json).unwrap();
        assert_eq!(puzzle.title(), "Pets");
        assert_eq!(puzzle.copyright(), "");
        assert_eq!(puzzle.clues().number_at(Position::new(2, 0)), Some(7));
    }

    #[test]
    fn test_load_rejects_bad_documents() {
        let mut doc = cat_dog_document();
        doc.size.rows = 2;
        assert!(matches!(Puzzle::load(&doc), Err(DocumentError::GridLength { .. })));

        let mut doc = cat_dog_document();
        doc.grid = vec![".".into(); 9];
        assert!(matches!(Puzzle::load(&doc), Err(DocumentError::NoPlayableCells)));

        assert!(matches!(Puzzle::from_json("{"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn test_round_trip_through_json() {
        let original = cat_dog();
        let json = original.to_document().to_json().unwrap();
        let reloaded = Puzzle::from_json(&json).unwrap();

        assert_eq!(reloaded.grid(), original.grid());
        for direction in Direction::all() {
            let texts = |p: &Puzzle| {
                p.clues()
                    .entries(direction)
                    .iter()
                    .map(|e| (e.number, e.text.clone()))
                    .collect::<Vec<_>>()
            };
            assert_eq!(texts(&reloaded), texts(&original));
        }
    }

    #[test]
    fn test_round_trip_ignores_incidental_whitespace() {
        let mut doc = cat_dog_document();
        doc.clues.across = vec!["1.Feline  ".into(), " 7.   Canine".into()];
        let puzzle = Puzzle::load(&doc).unwrap();
        assert_eq!(puzzle.to_document().clues.across, vec!["1. Feline", "7. Canine"]);
    }

    #[test]
    fn test_default_direction() {
        let doc = PuzzleDocument {
            title: String::new(),
            author: String::new(),
            size: Size { rows: 2, cols: 3 },
            clues: ClueLists::default(),
            grid: ["A", "B", "C", "D", ".", "."].map(String::from).to_vec(),
            copyright: String::new(),
            notes: String::new(),
        };
        let puzzle = Puzzle::load(&doc).unwrap();
        // (0,0) is in both words, (0,1) only across, (1,0) only down
        assert_eq!(puzzle.default_direction(Position::new(0, 0)), Direction::Across);
        assert_eq!(puzzle.default_direction(Position::new(0, 1)), Direction::Across);
        assert_eq!(puzzle.default_direction(Position::new(1, 0)), Direction::Down);
    }
}
