use anyhow::{Context, Result};
use crossword_core::{Puzzle, SessionSnapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Progress written between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    #[serde(flatten)]
    pub session: SessionSnapshot,
    #[serde(default)]
    pub elapsed_secs: u64,
}

/// Directory of per-puzzle progress files
#[derive(Debug, Clone)]
pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data-local>/crossword`, or `./crossword` when the platform has none
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crossword")
    }

    /// File holding progress for `puzzle`
    pub fn path_for(&self, puzzle: &Puzzle) -> PathBuf {
        self.dir.join(format!("{}.json", key(puzzle)))
    }

    /// Saved progress, or `None` if absent or unreadable
    pub fn load(&self, puzzle: &Puzzle) -> Option<SavedGame> {
        let path = self.path_for(puzzle);
        let json = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&json) {
            Ok(saved) => Some(saved),
            Err(e) => {
                log::warn!("ignoring unreadable progress file {}: {e}", path.display());
                None
            }
        }
    }

    pub fn save(&self, puzzle: &Puzzle, saved: &SavedGame) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(puzzle);
        let json = serde_json::to_string_pretty(saved)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("saved progress to {}", path.display());
        Ok(path)
    }
}

/// Title slug plus dimensions, e.g. `sunday-special-15x15`
fn key(puzzle: &Puzzle) -> String {
    let mut slug = String::new();
    for c in puzzle.title().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "untitled" } else { slug };
    format!("{slug}-{}x{}", puzzle.grid().rows(), puzzle.grid().cols())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::script::Command;
    use crossword_core::PuzzleDocument;
    use tempfile::TempDir;

    fn puzzle(title: &str) -> Puzzle {
        let json = format!(
            r#"{{
                "title": "{title}", "author": "Anon",
                "size": {{ "rows": 1, "cols": 3 }},
                "clues": {{ "across": ["1. Feline"], "down": [] }},
                "grid": ["C","A","T"]
            }}"#
        );
        Puzzle::load(&PuzzleDocument::from_json(&json).unwrap()).unwrap()
    }

    #[test]
    fn test_key_slugs_title() {
        assert_eq!(key(&puzzle("Sunday Special!")), "sunday-special-1x3");
        assert_eq!(key(&puzzle("  ")), "untitled-1x3");
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = ProgressStore::new(tmp.path().join("nested"));
        let p = puzzle("Cats");

        let mut game = Game::new(p.clone());
        game.apply(&Command::parse("type c").unwrap().unwrap());
        game.apply(&Command::Pause);

        let path = store.save(&p, &game.saved()).unwrap();
        assert!(path.exists());

        let loaded = store.load(&p).unwrap();
        assert_eq!(loaded, game.saved());
        assert!(loaded.session.paused);
        assert_eq!(loaded.session.progress[0][0], "C");
    }

    #[test]
    fn test_missing_or_corrupt_file_loads_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = ProgressStore::new(tmp.path());
        let p = puzzle("Cats");
        assert!(store.load(&p).is_none());

        fs::write(store.path_for(&p), "{ not json").unwrap();
        assert!(store.load(&p).is_none());
    }
}
