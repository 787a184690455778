//! Grid model: an addressable rows x cols matrix of black and letter cells.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest allowed row or column count
pub const MAX_DIMENSION: usize = 50;

/// Marker used for black cells in both the structured and binary formats
pub const BLACK_MARKER: char = '.';

/// A cell position (row, column), zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Word direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// The other direction
    pub fn toggled(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    pub fn all() -> [Direction; 2] {
        [Direction::Across, Direction::Down]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Arrow-key direction for cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

impl Arrow {
    /// (row delta, col delta)
    fn delta(self) -> (isize, isize) {
        match self {
            Arrow::Up => (-1, 0),
            Arrow::Down => (1, 0),
            Arrow::Left => (0, -1),
            Arrow::Right => (0, 1),
        }
    }
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Black,
    /// A playable cell holding its expected (uppercase) letter
    Letter(char),
}

impl Cell {
    pub fn is_black(&self) -> bool {
        matches!(self, Cell::Black)
    }

    pub fn is_playable(&self) -> bool {
        !self.is_black()
    }

    /// The expected letter, if playable
    pub fn letter(&self) -> Option<char> {
        match self {
            Cell::Black => None,
            Cell::Letter(c) => Some(*c),
        }
    }
}

/// A rectangular puzzle grid stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from the structured format's flat cell list.
    ///
    /// Every entry must be `.` or a single letter `A-Z` (lowercase is accepted and
    /// uppercased).
    pub fn from_cells<S: AsRef<str>>(rows: usize, cols: usize, cells: &[S]) -> Result<Self, DocumentError> {
        check_dimensions(rows, cols)?;
        if cells.len() != rows * cols {
            return Err(DocumentError::GridLength {
                expected: rows * cols,
                actual: cells.len(),
            });
        }

        let cells = cells
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let raw = raw.as_ref();
                let mut chars = raw.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(BLACK_MARKER), None) => Ok(Cell::Black),
                    (Some(c), None) if c.is_ascii_alphabetic() => Ok(Cell::Letter(c.to_ascii_uppercase())),
                    _ => Err(DocumentError::InvalidCell {
                        index,
                        value: raw.to_string(),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows, cols, cells })
    }

    /// Build a grid from a `.puz` solution block: `.` is black, any other byte is
    /// the expected letter.
    pub(crate) fn from_solution_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), rows * cols);
        let cells = bytes
            .iter()
            .map(|&b| {
                if b == BLACK_MARKER as u8 {
                    Cell::Black
                } else {
                    Cell::Letter((b as char).to_ascii_uppercase())
                }
            })
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the position lies inside the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Cell at a position, `None` when out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if self.contains(pos) {
            Some(self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// In bounds and not black
    pub fn is_playable(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(|cell| cell.is_playable())
    }

    /// Black or out of bounds
    pub(crate) fn is_blocked(&self, pos: Position) -> bool {
        !self.is_playable(pos)
    }

    pub(crate) fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// All playable positions in row-major order
    pub fn playable_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |&pos| self.is_playable(pos))
    }

    pub fn playable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_playable()).count()
    }

    /// Rows of cells, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    /// The neighbouring position one step away, if inside the grid
    pub fn step(&self, pos: Position, arrow: Arrow) -> Option<Position> {
        let (dr, dc) = arrow.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    /// The next position along a word direction (forward = right/down)
    pub fn advance(&self, pos: Position, direction: Direction, forward: bool) -> Option<Position> {
        let arrow = match (direction, forward) {
            (Direction::Across, true) => Arrow::Right,
            (Direction::Across, false) => Arrow::Left,
            (Direction::Down, true) => Arrow::Down,
            (Direction::Down, false) => Arrow::Up,
        };
        self.step(pos, arrow)
    }

    /// Length of the run of playable cells starting at `pos` and extending
    /// forward in `direction`
    pub(crate) fn run_length(&self, pos: Position, direction: Direction) -> usize {
        let mut len = 0;
        let mut cur = Some(pos);
        while let Some(p) = cur {
            if !self.is_playable(p) {
                break;
            }
            len += 1;
            cur = self.advance(p, direction, true);
        }
        len
    }

    /// Flat structured-format representation (`.` or the letter)
    pub fn to_cells(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Black => BLACK_MARKER.to_string(),
                Cell::Letter(c) => c.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for cell in row {
                match cell {
                    Cell::Black => write!(f, "■")?,
                    Cell::Letter(c) => write!(f, "{c}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub(crate) fn check_dimensions(rows: usize, cols: usize) -> Result<(), DocumentError> {
    if (1..=MAX_DIMENSION).contains(&rows) && (1..=MAX_DIMENSION).contains(&cols) {
        Ok(())
    } else {
        Err(DocumentError::InvalidSize { rows, cols })
    }
}

#[cfg(test)]
pub(crate) fn grid_from_rows(rows: &[&str]) -> Grid {
    let cells: Vec<String> = rows
        .iter()
        .flat_map(|r| r.chars().map(|c| c.to_string()))
        .collect();
    Grid::from_cells(rows.len(), rows[0].chars().count(), &cells).expect("valid test grid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_classifies_black_and_letters() {
        let grid = Grid::from_cells(3, 3, &["C", "A", "T", ".", ".", ".", "d", "o", "g"]).unwrap();
        assert_eq!(grid.get(Position::new(0, 0)), Some(Cell::Letter('C')));
        assert_eq!(grid.get(Position::new(1, 1)), Some(Cell::Black));
        assert_eq!(grid.get(Position::new(2, 2)), Some(Cell::Letter('G')));
        assert_eq!(grid.get(Position::new(3, 0)), None);
        assert_eq!(grid.playable_count(), 6);
    }

    #[test]
    fn test_from_cells_rejects_bad_length() {
        let err = Grid::from_cells(2, 2, &["A", "B", "C"]).unwrap_err();
        assert!(matches!(err, DocumentError::GridLength { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_from_cells_rejects_bad_cell() {
        let err = Grid::from_cells(1, 2, &["A", "7"]).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidCell { index: 1, .. }));

        let err = Grid::from_cells(1, 2, &["A", "BC"]).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidCell { index: 1, .. }));
    }

    #[test]
    fn test_dimension_bounds() {
        assert!(Grid::from_cells::<&str>(0, 1, &[]).is_err());
        let cells = vec!["A"; 51];
        assert!(matches!(
            Grid::from_cells(1, 51, &cells),
            Err(DocumentError::InvalidSize { rows: 1, cols: 51 })
        ));
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let grid = grid_from_rows(&["AB", "CD"]);
        assert_eq!(grid.step(Position::new(0, 0), Arrow::Up), None);
        assert_eq!(grid.step(Position::new(0, 0), Arrow::Left), None);
        assert_eq!(grid.step(Position::new(0, 0), Arrow::Right), Some(Position::new(0, 1)));
        assert_eq!(grid.step(Position::new(1, 1), Arrow::Down), None);
    }

    #[test]
    fn test_run_length_stops_at_black() {
        let grid = grid_from_rows(&["AB.C", "D..E"]);
        assert_eq!(grid.run_length(Position::new(0, 0), Direction::Across), 2);
        assert_eq!(grid.run_length(Position::new(0, 3), Direction::Across), 1);
        assert_eq!(grid.run_length(Position::new(0, 3), Direction::Down), 2);
        assert_eq!(grid.run_length(Position::new(0, 2), Direction::Down), 0);
    }

    #[test]
    fn test_to_cells_round_trip() {
        let grid = grid_from_rows(&["A.", "BC"]);
        let again = Grid::from_cells(2, 2, &grid.to_cells()).unwrap();
        assert_eq!(grid, again);
    }
}
