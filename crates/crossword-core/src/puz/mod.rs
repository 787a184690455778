//! Decoder for the legacy `.puz` binary interchange format.
//!
//! Layout (all offsets fixed):
//!
//! | offset | size        | field                                   |
//! |--------|-------------|-----------------------------------------|
//! | 0x02   | 12          | `ACROSS&DOWN\0`                         |
//! | 0x2C   | 1           | width                                   |
//! | 0x2D   | 1           | height                                  |
//! | 0x2E   | 2 (LE)      | clue count                              |
//! | 0x32   | 2 (LE)      | scrambled tag                           |
//! | 0x34   | w*h         | solution (`.` = black)                  |
//! |        | w*h         | player state (skipped)                  |
//! |        | NUL strings | title, author, copyright, clues, notes  |
//!
//! The clue strings carry no direction. They are stored in one stream ordered
//! by number with across before down on a shared number, so directions are
//! reassigned by walking the same stream derived from the solution grid.

mod text;

pub use text::{clean_clue, decode_cp1252};

use crate::clues::{format_clue, number_slots, parse_clue};
use crate::document::{ClueLists, PuzzleDocument, Size};
use crate::error::{DataInconsistency, FormatError};
use crate::grid::{Direction, Grid, MAX_DIMENSION};

pub const MAGIC: &[u8] = b"ACROSS&DOWN\0";

const MAGIC_OFFSET: usize = 0x02;
const WIDTH_OFFSET: usize = 0x2C;
const HEIGHT_OFFSET: usize = 0x2D;
const CLUE_COUNT_OFFSET: usize = 0x2E;
const SCRAMBLED_OFFSET: usize = 0x32;
const SOLUTION_OFFSET: usize = 0x34;

/// A decoded `.puz` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub document: PuzzleDocument,
    /// Clue/slot mismatches found while reassigning directions
    pub inconsistencies: Vec<DataInconsistency>,
}

/// Bounds-checked view over the input buffer
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn slice_at(&self, offset: usize, len: usize) -> Result<&'a [u8], FormatError> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(FormatError::Truncated {
                offset,
                needed: len,
                available: self.bytes.len().saturating_sub(offset),
            })
    }

    fn u8_at(&self, offset: usize) -> Result<u8, FormatError> {
        Ok(self.slice_at(offset, 1)?[0])
    }

    fn u16_le_at(&self, offset: usize) -> Result<u16, FormatError> {
        let b = self.slice_at(offset, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn seek(&mut self, offset: usize) {
        self.pos = offset;
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let slice = self.slice_at(self.pos, len)?;
        self.pos += len;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// A NUL-terminated string; a missing terminator is a truncated buffer
    fn string(&mut self) -> Result<String, FormatError> {
        let rest = self.bytes.get(self.pos..).unwrap_or_default();
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let value = decode_cp1252(&rest[..len]);
        self.pos += len + 1;
        Ok(value)
    }

    /// A string that may be absent: empty at end of buffer, and an unterminated
    /// tail is taken as the whole value
    fn optional_string(&mut self) -> String {
        let rest = self.bytes.get(self.pos..).unwrap_or_default();
        let len = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        let value = decode_cp1252(&rest[..len]);
        self.pos = (self.pos + len + 1).min(self.bytes.len());
        value
    }
}

/// Decode a `.puz` buffer into a structured document.
///
/// Bad magic, out-of-range dimensions and reads past the end of the buffer
/// are fatal. Clue/slot count mismatches are reported alongside the result.
pub fn decode(bytes: &[u8]) -> Result<Decoded, FormatError> {
    let mut reader = Reader::new(bytes);

    if reader.slice_at(MAGIC_OFFSET, MAGIC.len())? != MAGIC {
        return Err(FormatError::BadMagic);
    }

    let width = reader.u8_at(WIDTH_OFFSET)?;
    let height = reader.u8_at(HEIGHT_OFFSET)?;
    let in_range = |d: u8| (1..=MAX_DIMENSION).contains(&usize::from(d));
    if !in_range(width) || !in_range(height) {
        return Err(FormatError::BadDimensions { width, height });
    }
    let (cols, rows) = (usize::from(width), usize::from(height));

    let clue_count = usize::from(reader.u16_le_at(CLUE_COUNT_OFFSET)?);
    let scrambled = reader.u16_le_at(SCRAMBLED_OFFSET)?;

    reader.seek(SOLUTION_OFFSET);
    let solution = reader.take(rows * cols)?;
    reader.take(rows * cols)?;

    let title = reader.string()?;
    let author = reader.string()?;
    let copyright = reader.optional_string();
    let raw_clues = (0..clue_count)
        .map(|_| reader.string())
        .collect::<Result<Vec<_>, _>>()?;
    let notes = if reader.remaining() > 0 {
        reader.optional_string()
    } else {
        String::new()
    };

    log::debug!("decoded .puz header: {cols}x{rows}, {clue_count} clues, title {title:?}");

    let mut inconsistencies = Vec::new();
    if scrambled != 0 {
        inconsistencies.push(DataInconsistency::ScrambledSolution { tag: scrambled });
    }

    let grid = Grid::from_solution_bytes(rows, cols, solution);
    let clues = assign_directions(&grid, &raw_clues, &mut inconsistencies);

    for issue in &inconsistencies {
        log::warn!("{issue}");
    }

    Ok(Decoded {
        document: PuzzleDocument {
            title,
            author,
            size: Size { rows, cols },
            clues,
            grid: grid.to_cells(),
            copyright,
            notes,
        },
        inconsistencies,
    })
}

/// Pair the file's clue stream with the grid's slots in number order (across
/// before down on a tie) and prefix each clue with its number.
///
/// This is a reconstruction: a file whose clue order differs from that
/// convention gets directions assigned by position anyway.
fn assign_directions(
    grid: &Grid,
    raw_clues: &[String],
    inconsistencies: &mut Vec<DataInconsistency>,
) -> ClueLists {
    let (_, slots) = number_slots(grid);
    let mut lists = ClueLists::default();

    for (slot, raw) in slots.iter().zip(raw_clues) {
        let text = clean_clue(raw);
        if text.is_empty() {
            log::warn!("{} {} has no text after cleaning", slot.number, slot.direction);
            inconsistencies.push(DataInconsistency::MissingClue {
                number: slot.number,
                direction: slot.direction,
            });
            continue;
        }
        let clue = match parse_clue(&text) {
            Some((number, _)) if number == slot.number => text,
            _ => format_clue(slot.number, &text),
        };
        match slot.direction {
            Direction::Across => lists.across.push(clue),
            Direction::Down => lists.down.push(clue),
        }
    }

    if slots.len() > raw_clues.len() {
        inconsistencies.extend(slots[raw_clues.len()..].iter().map(|slot| DataInconsistency::MissingClue {
            number: slot.number,
            direction: slot.direction,
        }));
    } else if raw_clues.len() > slots.len() {
        inconsistencies.push(DataInconsistency::SurplusClues {
            count: raw_clues.len() - slots.len(),
        });
    }

    lists
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Assemble a `.puz` buffer with the fields this decoder reads
    pub(crate) fn build_puz(width: u8, height: u8, solution: &str, strings: &[&str], clue_count: u16) -> Vec<u8> {
        let mut buf = vec![0u8; SOLUTION_OFFSET];
        buf[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()].copy_from_slice(MAGIC);
        buf[WIDTH_OFFSET] = width;
        buf[HEIGHT_OFFSET] = height;
        buf[CLUE_COUNT_OFFSET..CLUE_COUNT_OFFSET + 2].copy_from_slice(&clue_count.to_le_bytes());
        buf.extend_from_slice(solution.as_bytes());
        buf.extend(solution.bytes().map(|b| if b == b'.' { b'.' } else { b'-' }));
        for s in strings {
            buf.extend_from_slice(s.as_bytes());
            buf.push(0);
        }
        buf
    }

    #[test]
    fn test_decode_minimal_puzzle() {
        let buf = build_puz(3, 1, "CAT", &["T", "A", "", "1. Feline"], 1);
        let decoded = decode(&buf).unwrap();
        let doc = decoded.document;

        assert_eq!(doc.title, "T");
        assert_eq!(doc.author, "A");
        assert_eq!(doc.copyright, "");
        assert_eq!(doc.notes, "");
        assert_eq!(doc.size, Size { rows: 1, cols: 3 });
        assert_eq!(doc.grid, vec!["C", "A", "T"]);
        assert_eq!(doc.clues.across, vec!["1. Feline"]);
        assert!(doc.clues.down.is_empty());
        assert!(decoded.inconsistencies.is_empty());
    }

    #[test]
    fn test_unnumbered_clues_get_prefixed() {
        let buf = build_puz(3, 1, "CAT", &["T", "A", "", "Feline"], 1);
        let doc = decode(&buf).unwrap().document;
        assert_eq!(doc.clues.across, vec!["1. Feline"]);
    }

    #[test]
    fn test_directions_follow_number_order_across_first() {
        // A B C
        // D . E
        // F G H
        // Stream: 1A, 1D, 3D, 6A
        let buf = build_puz(
            3,
            3,
            "ABCD.EFGH",
            &["Ring", "Me", "(c) Me", "Top", "Left", "Right", "Bottom", "Some notes"],
            4,
        );
        let decoded = decode(&buf).unwrap();
        let doc = decoded.document;
        assert_eq!(doc.clues.across, vec!["1. Top", "6. Bottom"]);
        assert_eq!(doc.clues.down, vec!["1. Left", "3. Right"]);
        assert_eq!(doc.copyright, "(c) Me");
        assert_eq!(doc.notes, "Some notes");
        assert!(decoded.inconsistencies.is_empty());
    }

    #[test]
    fn test_clue_markup_is_cleaned() {
        let buf = build_puz(3, 1, "CAT", &["T", "A", "", "<i>Puss</i> &amp; co&#46;"], 1);
        let doc = decode(&buf).unwrap().document;
        assert_eq!(doc.clues.across, vec!["1. Puss & co."]);
    }

    #[test]
    fn test_strings_are_windows_1252() {
        let mut buf = build_puz(3, 1, "CAT", &[], 1);
        buf.extend_from_slice(b"Caf\xe9\0A\0\0\x93Meow\x94\0");
        let doc = decode(&buf).unwrap().document;
        assert_eq!(doc.title, "Café");
        assert_eq!(doc.clues.across, vec!["1. \u{201C}Meow\u{201D}"]);
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = build_puz(3, 1, "CAT", &["T", "A", "", "x"], 1);
        buf[MAGIC_OFFSET] = b'X';
        assert_eq!(decode(&buf).unwrap_err(), FormatError::BadMagic);
    }

    #[test]
    fn test_magic_needs_terminator() {
        let mut buf = build_puz(3, 1, "CAT", &["T", "A", "", "x"], 1);
        buf[MAGIC_OFFSET + MAGIC.len() - 1] = b'!';
        assert_eq!(decode(&buf).unwrap_err(), FormatError::BadMagic);
    }

    #[test]
    fn test_clue_empty_after_cleaning_is_missing() {
        let buf = build_puz(3, 3, "ABCD.EFGH", &["Ring", "Me", "", "Top", "<i></i>", "Right", "Bottom"], 4);
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.document.clues.across, vec!["1. Top", "6. Bottom"]);
        assert_eq!(decoded.document.clues.down, vec!["3. Right"]);
        assert_eq!(
            decoded.inconsistencies,
            vec![DataInconsistency::MissingClue {
                number: 1,
                direction: Direction::Down
            }]
        );
    }

    #[test]
    fn test_bad_dimensions() {
        let buf = build_puz(0, 1, "", &["T", "A", ""], 0);
        assert_eq!(decode(&buf).unwrap_err(), FormatError::BadDimensions { width: 0, height: 1 });

        let mut buf = build_puz(3, 1, "CAT", &["T", "A", ""], 0);
        buf[HEIGHT_OFFSET] = 51;
        assert_eq!(decode(&buf).unwrap_err().reason(), "bad_dimensions");
    }

    #[test]
    fn test_truncated_inputs() {
        assert_eq!(decode(&[]).unwrap_err().reason(), "truncated");

        // Header only, no grids
        let buf = build_puz(3, 1, "", &[], 0);
        assert_eq!(decode(&buf).unwrap_err().reason(), "truncated");

        // Clue count promises more strings than present
        let buf = build_puz(3, 1, "CAT", &["T", "A", "", "one"], 3);
        assert_eq!(decode(&buf).unwrap_err().reason(), "truncated");

        // Missing author terminator
        let mut buf = build_puz(3, 1, "CAT", &["T"], 0);
        buf.extend_from_slice(b"Auth");
        assert_eq!(decode(&buf).unwrap_err().reason(), "truncated");
    }

    #[test]
    fn test_missing_copyright_defaults_to_empty() {
        let buf = build_puz(3, 1, "CAT", &["T", "A"], 0);
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.document.copyright, "");
        assert_eq!(
            decoded.inconsistencies,
            vec![DataInconsistency::MissingClue {
                number: 1,
                direction: Direction::Across
            }]
        );
    }

    #[test]
    fn test_surplus_clues_are_reported() {
        let buf = build_puz(3, 1, "CAT", &["T", "A", "", "Feline", "Extra"], 2);
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.document.clues.across, vec!["1. Feline"]);
        assert_eq!(decoded.inconsistencies, vec![DataInconsistency::SurplusClues { count: 1 }]);
    }

    #[test]
    fn test_scrambled_tag_is_reported() {
        let mut buf = build_puz(3, 1, "CAT", &["T", "A", "", "Feline"], 1);
        buf[SCRAMBLED_OFFSET] = 0x04;
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.inconsistencies, vec![DataInconsistency::ScrambledSolution { tag: 4 }]);
    }
}
