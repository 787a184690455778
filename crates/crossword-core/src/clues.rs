//! Clue numbering and the clue index.
//!
//! Numbers come from a row-major raster scan. A cell is a numbering boundary
//! when it sits on the left edge of its row or right of a black cell, or on the
//! top edge of its column or below a black cell. The running counter advances
//! once per boundary cell, black cells included, so numbers are sparse but
//! strictly increasing in scan order. Only cells that begin a run of two or more
//! playable cells carry their number into the [`NumberGrid`] and get a
//! [`ClueEntry`].

use crate::error::DataInconsistency;
use crate::grid::{Direction, Grid, Position};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// `"<number>. <text>"`
static CLUE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*(\d+)\.\s*(\S.*?)\s*$").expect("clue prefix pattern is valid"));

/// Minimum run length that forms a word
pub const MIN_WORD_LENGTH: usize = 2;

/// A grid-derived word slot, before clue text is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub number: u32,
    pub direction: Direction,
    pub start: Position,
    pub length: usize,
}

/// Per-cell clue numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberGrid {
    rows: usize,
    cols: usize,
    numbers: Vec<Option<u32>>,
}

impl NumberGrid {
    pub fn get(&self, pos: Position) -> Option<u32> {
        if pos.row < self.rows && pos.col < self.cols {
            self.numbers[pos.row * self.cols + pos.col]
        } else {
            None
        }
    }

    /// Rows of optional numbers, top to bottom
    pub fn to_rows(&self) -> Vec<Vec<Option<u32>>> {
        self.numbers.chunks(self.cols).map(<[_]>::to_vec).collect()
    }
}

/// Run the numbering scan over a grid.
///
/// Slots are returned in scan order; when one cell starts both words the
/// across slot comes first.
pub fn number_slots(grid: &Grid) -> (NumberGrid, Vec<Slot>) {
    let mut numbers = vec![None; grid.rows() * grid.cols()];
    let mut slots = Vec::new();
    let mut counter: u32 = 1;

    for pos in grid.positions() {
        let across_boundary = pos.col == 0 || grid.is_blocked(Position::new(pos.row, pos.col - 1));
        let down_boundary = pos.row == 0 || grid.is_blocked(Position::new(pos.row - 1, pos.col));
        if !across_boundary && !down_boundary {
            continue;
        }

        let number = counter;
        counter += 1;

        if !grid.is_playable(pos) {
            continue;
        }

        for (direction, boundary) in [(Direction::Across, across_boundary), (Direction::Down, down_boundary)] {
            if !boundary {
                continue;
            }
            let length = grid.run_length(pos, direction);
            if length >= MIN_WORD_LENGTH {
                numbers[grid.index(pos)] = Some(number);
                slots.push(Slot {
                    number,
                    direction,
                    start: pos,
                    length,
                });
            }
        }
    }

    let number_grid = NumberGrid {
        rows: grid.rows(),
        cols: grid.cols(),
        numbers,
    };
    (number_grid, slots)
}

/// Split a raw clue string into its leading number and text
pub fn parse_clue(raw: &str) -> Option<(u32, &str)> {
    let caps = CLUE_PREFIX.captures(raw)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    Some((number, caps.get(2)?.as_str()))
}

/// Render a clue in the structured document convention
pub fn format_clue(number: u32, text: &str) -> String {
    format!("{number}. {text}")
}

/// One numbered word with its clue text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueEntry {
    pub number: u32,
    pub direction: Direction,
    /// Clue text without the number prefix; empty when no clue matched the slot
    pub text: String,
    pub start: Position,
    pub length: usize,
}

impl ClueEntry {
    /// Positions of the word's cells, first to last
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.length).map(move |i| self.cell(i))
    }

    /// The `i`th cell of the word
    pub fn cell(&self, i: usize) -> Position {
        match self.direction {
            Direction::Across => Position::new(self.start.row, self.start.col + i),
            Direction::Down => Position::new(self.start.row + i, self.start.col),
        }
    }

    pub fn last_cell(&self) -> Position {
        self.cell(self.length - 1)
    }

    /// Offset of `pos` within the word
    pub fn offset_of(&self, pos: Position) -> Option<usize> {
        let offset = match self.direction {
            Direction::Across if pos.row == self.start.row && pos.col >= self.start.col => pos.col - self.start.col,
            Direction::Down if pos.col == self.start.col && pos.row >= self.start.row => pos.row - self.start.row,
            _ => return None,
        };
        (offset < self.length).then_some(offset)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.offset_of(pos).is_some()
    }

    /// Structured-format clue string
    pub fn to_clue_string(&self) -> String {
        format_clue(self.number, &self.text)
    }
}

/// Numbered words of a grid, cross-referenced with their clue text
#[derive(Debug, Clone)]
pub struct ClueIndex {
    numbers: NumberGrid,
    across: Vec<ClueEntry>,
    down: Vec<ClueEntry>,
    /// Per cell, the index into `across` of the word covering it
    across_at: Vec<Option<usize>>,
    down_at: Vec<Option<usize>>,
    cols: usize,
    inconsistencies: Vec<DataInconsistency>,
}

impl ClueIndex {
    /// Number the grid and attach raw `"<number>. <text>"` clues by number.
    pub fn build<S: AsRef<str>>(grid: &Grid, across: &[S], down: &[S]) -> Self {
        let (numbers, slots) = number_slots(grid);
        let mut inconsistencies = Vec::new();

        let mut across_text = collect_clue_text(Direction::Across, across, &mut inconsistencies);
        let mut down_text = collect_clue_text(Direction::Down, down, &mut inconsistencies);

        let mut across_entries = Vec::new();
        let mut down_entries = Vec::new();
        for slot in slots {
            let (texts, entries) = match slot.direction {
                Direction::Across => (&mut across_text, &mut across_entries),
                Direction::Down => (&mut down_text, &mut down_entries),
            };
            let text = texts.remove(&slot.number).unwrap_or_else(|| {
                inconsistencies.push(DataInconsistency::MissingClue {
                    number: slot.number,
                    direction: slot.direction,
                });
                String::new()
            });
            entries.push(ClueEntry {
                number: slot.number,
                direction: slot.direction,
                text,
                start: slot.start,
                length: slot.length,
            });
        }

        for (direction, leftover) in [(Direction::Across, across_text), (Direction::Down, down_text)] {
            inconsistencies.extend(
                leftover
                    .into_keys()
                    .map(|number| DataInconsistency::OrphanClue { number, direction }),
            );
        }

        for issue in &inconsistencies {
            log::warn!("{issue}");
        }

        let cell_count = grid.rows() * grid.cols();
        let across_at = cover(cell_count, grid.cols(), &across_entries);
        let down_at = cover(cell_count, grid.cols(), &down_entries);

        log::debug!(
            "indexed {}x{} grid: {} across, {} down, {} inconsistencies",
            grid.rows(),
            grid.cols(),
            across_entries.len(),
            down_entries.len(),
            inconsistencies.len()
        );

        Self {
            numbers,
            across: across_entries,
            down: down_entries,
            across_at,
            down_at,
            cols: grid.cols(),
            inconsistencies,
        }
    }

    pub fn numbers(&self) -> &NumberGrid {
        &self.numbers
    }

    pub fn number_at(&self, pos: Position) -> Option<u32> {
        self.numbers.get(pos)
    }

    /// Entries of one direction, ascending by number
    pub fn entries(&self, direction: Direction) -> &[ClueEntry] {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }

    pub fn get(&self, number: u32, direction: Direction) -> Option<&ClueEntry> {
        let entries = self.entries(direction);
        entries
            .binary_search_by_key(&number, |e| e.number)
            .ok()
            .map(|i| &entries[i])
    }

    /// The word in `direction` that covers `pos`
    pub fn entry_at(&self, pos: Position, direction: Direction) -> Option<&ClueEntry> {
        self.index_at(pos, direction).map(|i| &self.entries(direction)[i])
    }

    /// Index into [`entries`](Self::entries) of the word covering `pos`
    pub fn index_at(&self, pos: Position, direction: Direction) -> Option<usize> {
        if pos.col >= self.cols {
            return None;
        }
        let lookup = match direction {
            Direction::Across => &self.across_at,
            Direction::Down => &self.down_at,
        };
        lookup.get(pos.row * self.cols + pos.col).copied().flatten()
    }

    /// Structured-format clue strings for one direction; slots without text are
    /// left out
    pub fn clue_strings(&self, direction: Direction) -> Vec<String> {
        self.entries(direction)
            .iter()
            .filter(|e| !e.text.is_empty())
            .map(ClueEntry::to_clue_string)
            .collect()
    }

    /// Mismatches found while attaching clue text
    pub fn inconsistencies(&self) -> &[DataInconsistency] {
        &self.inconsistencies
    }
}

fn collect_clue_text<S: AsRef<str>>(
    direction: Direction,
    raw: &[S],
    inconsistencies: &mut Vec<DataInconsistency>,
) -> BTreeMap<u32, String> {
    let mut texts = BTreeMap::new();
    for raw in raw {
        let raw = raw.as_ref();
        let Some((number, text)) = parse_clue(raw) else {
            inconsistencies.push(DataInconsistency::MalformedClue {
                direction,
                raw: raw.to_string(),
            });
            continue;
        };
        if texts.contains_key(&number) {
            inconsistencies.push(DataInconsistency::DuplicateClue { number, direction });
            continue;
        }
        texts.insert(number, text.to_string());
    }
    texts
}

fn cover(cell_count: usize, cols: usize, entries: &[ClueEntry]) -> Vec<Option<usize>> {
    let mut lookup = vec![None; cell_count];
    for (i, entry) in entries.iter().enumerate() {
        for pos in entry.cells() {
            lookup[pos.row * cols + pos.col] = Some(i);
        }
    }
    lookup
}
