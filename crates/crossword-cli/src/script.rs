//! Line-oriented input events for the `play` command.
//!
//! One event per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! click 0 2        select a cell (again to flip direction)
//! up | down | left | right
//! type A [ROW COL] letter at the cursor or a given cell
//! back [ROW COL]   backspace
//! tab | shift-tab  next / previous clue
//! space            flip direction
//! pause | resume
//! check | show | save
//! ```

use anyhow::{bail, Context, Result};
use crossword_core::Arrow;

/// One host input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Click { row: usize, col: usize },
    Move(Arrow),
    Type { text: String, at: Option<(usize, usize)> },
    Backspace { at: Option<(usize, usize)> },
    NextClue,
    PreviousClue,
    ToggleDirection,
    Pause,
    Resume,
    Check,
    Show,
    Save,
}

impl Command {
    /// Parse one script line; `Ok(None)` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("click", [row, col]) => {
                let (row, col) = parse_cell(row, col)?;
                Command::Click { row, col }
            }
            ("up", []) => Command::Move(Arrow::Up),
            ("down", []) => Command::Move(Arrow::Down),
            ("left", []) => Command::Move(Arrow::Left),
            ("right", []) => Command::Move(Arrow::Right),
            ("type", [text]) => Command::Type {
                text: text.to_string(),
                at: None,
            },
            ("type", [text, row, col]) => Command::Type {
                text: text.to_string(),
                at: Some(parse_cell(row, col)?),
            },
            ("back", []) => Command::Backspace { at: None },
            ("back", [row, col]) => Command::Backspace {
                at: Some(parse_cell(row, col)?),
            },
            ("tab", []) => Command::NextClue,
            ("shift-tab", []) => Command::PreviousClue,
            ("space", []) => Command::ToggleDirection,
            ("pause", []) => Command::Pause,
            ("resume", []) => Command::Resume,
            ("check", []) => Command::Check,
            ("show", []) => Command::Show,
            ("save", []) => Command::Save,
            _ => bail!("unrecognised command: {line:?}"),
        };
        Ok(Some(command))
    }
}

fn parse_cell(row: &str, col: &str) -> Result<(usize, usize)> {
    let row = row.parse().with_context(|| format!("bad row {row:?}"))?;
    let col = col.parse().with_context(|| format!("bad column {col:?}"))?;
    Ok((row, col))
}
