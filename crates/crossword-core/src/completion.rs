//! Completion checking: pure comparison of the player's letters against the
//! solution.

use crate::grid::{Grid, Position};
use crate::session::UserGrid;
use serde::{Deserialize, Serialize};

/// Result of a completion check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Every playable cell holds a letter
    pub complete: bool,
    /// Complete, and every letter matches the solution
    pub correct: bool,
}

/// What a cell holds, as far as checking is concerned
enum Entry {
    Empty,
    Letter(char),
    /// Anything longer than one character: filled, never correct
    Other,
}

/// Check a session's user grid against the solution
pub fn check(grid: &Grid, user: &UserGrid) -> Completion {
    evaluate(grid, |pos| user.get(pos).map_or(Entry::Empty, Entry::Letter))
}

/// Check a raw host-supplied matrix of entries.
///
/// Entries are trimmed and compared case-insensitively; missing rows or
/// columns count as empty.
pub fn check_rows<S: AsRef<str>>(grid: &Grid, rows: &[Vec<S>]) -> Completion {
    evaluate(grid, |pos| {
        let raw = rows
            .get(pos.row)
            .and_then(|row| row.get(pos.col))
            .map_or("", |raw| raw.as_ref().trim());
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Entry::Empty,
            (Some(c), None) => Entry::Letter(c),
            (Some(_), Some(_)) => Entry::Other,
        }
    })
}

fn evaluate(grid: &Grid, entry: impl Fn(Position) -> Entry) -> Completion {
    let mut complete = true;
    let mut correct = true;

    for pos in grid.playable_positions() {
        match entry(pos) {
            Entry::Empty => {
                complete = false;
                correct = false;
                break;
            }
            Entry::Letter(letter) => {
                let expected = grid.get(pos).and_then(|cell| cell.letter());
                if expected != Some(letter.to_ascii_uppercase()) {
                    correct = false;
                }
            }
            Entry::Other => correct = false,
        }
    }

    Completion { complete, correct }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid_from_rows;

    #[test]
    fn test_empty_grid_is_incomplete() {
        let grid = grid_from_rows(&["CAT", "...", "DOG"]);
        let result = check(&grid, &UserGrid::empty(&grid));
        assert_eq!(result, Completion { complete: false, correct: false });
    }

    #[test]
    fn test_matching_grid_is_correct() {
        let grid = grid_from_rows(&["CAT", "...", "DOG"]);
        let rows = vec![vec!["C", "A", "T"], vec!["", "", ""], vec!["D", "O", "G"]];
        assert_eq!(check_rows(&grid, &rows), Completion { complete: true, correct: true });

        let lower = vec![vec!["c", "a", "t"], vec!["", "", ""], vec!["d", "o", "g"]];
        assert_eq!(check_rows(&grid, &lower), Completion { complete: true, correct: true });
        let user = UserGrid::restore(&lower, &grid).unwrap();
        assert!(check(&grid, &user).correct);
    }

    #[test]
    fn test_filled_but_wrong() {
        let grid = grid_from_rows(&["CAT", "...", "DOG"]);
        let rows = vec![vec!["C", "O", "T"], vec!["", "", ""], vec!["D", "O", "G"]];
        assert_eq!(check_rows(&grid, &rows), Completion { complete: true, correct: false });
    }

    #[test]
    fn test_multi_letter_entry_is_filled_but_wrong() {
        let grid = grid_from_rows(&["CAT"]);
        let rows = vec![vec!["CX", "A", "T"]];
        assert_eq!(check_rows(&grid, &rows), Completion { complete: true, correct: false });
        let padded = vec![vec![" c ", "A", "t"]];
        assert!(check_rows(&grid, &padded).correct);
    }

    #[test]
    fn test_whitespace_entries_count_as_empty() {
        let grid = grid_from_rows(&["AB"]);
        let rows = vec![vec!["A", "  "]];
        assert!(!check_rows(&grid, &rows).complete);
        let short: Vec<Vec<&str>> = vec![vec!["A"]];
        assert!(!check_rows(&grid, &short).complete);
    }
}
