//! Error and diagnostic types.
//!
//! Only malformed binary input is fatal ([`FormatError`]). Structured documents
//! that cannot describe a valid grid fail with [`DocumentError`]. Mismatches
//! between clue text and grid-derived slots are reported as
//! [`DataInconsistency`] values next to the result and never abort.

use crate::grid::Direction;

/// Fatal `.puz` decode failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("bad magic: expected \"ACROSS&DOWN\" at offset 0x02")]
    BadMagic,

    #[error("bad dimensions: {width}x{height} (width and height must be within 1..=50)")]
    BadDimensions { width: u8, height: u8 },

    #[error("truncated buffer: needed {needed} byte(s) at offset {offset:#x}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl FormatError {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            FormatError::BadMagic => "bad_magic",
            FormatError::BadDimensions { .. } => "bad_dimensions",
            FormatError::Truncated { .. } => "truncated",
        }
    }
}

/// A structured document that cannot be loaded
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid size {rows}x{cols} (rows and cols must be within 1..=50)")]
    InvalidSize { rows: usize, cols: usize },

    #[error("grid has {actual} cells, expected {expected}")]
    GridLength { expected: usize, actual: usize },

    #[error("grid cell {index} is {value:?}, expected \".\" or a letter A-Z")]
    InvalidCell { index: usize, value: String },

    #[error("grid has no playable cells")]
    NoPlayableCells,

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Non-fatal mismatch between clue text and the grid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataInconsistency {
    #[error("clue {number} {direction} has no matching slot in the grid")]
    OrphanClue { number: u32, direction: Direction },

    #[error("slot {number} {direction} has no clue text")]
    MissingClue { number: u32, direction: Direction },

    #[error("{direction} clue {raw:?} does not start with \"<number>. \"")]
    MalformedClue { direction: Direction, raw: String },

    #[error("clue {number} {direction} appears more than once; keeping the first")]
    DuplicateClue { number: u32, direction: Direction },

    #[error("{count} clue(s) in the file have no slot left to attach to")]
    SurplusClues { count: usize },

    #[error("solution is scrambled (tag {tag:#06x}); expected letters may be wrong")]
    ScrambledSolution { tag: u16 },
}
