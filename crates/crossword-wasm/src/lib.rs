//! WebAssembly crossword game
//!
//! Exposes puzzle loading, cursor navigation and completion checking to a
//! page that does its own drawing. Views cross the boundary as plain JS
//! objects.

use crossword_core::{decode_puz, Direction, DocumentError, FormatError, Puzzle};
use wasm_bindgen::prelude::*;

mod game;


pub use game::{CellView, ClueView, GameState, SerializableState};

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("console_log unavailable: {e}").into());
    }
}

fn format_error(e: FormatError) -> JsValue {
    JsValue::from_str(&format!("{}: {e}", e.reason()))
}

fn document_error(e: DocumentError) -> JsValue {
    JsValue::from_str(&format!("invalid_document: {e}"))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn parse_direction(direction: &str) -> Result<Direction, JsValue> {
    match direction {
        "across" => Ok(Direction::Across),
        "down" => Ok(Direction::Down),
        other => Err(JsValue::from_str(&format!("unknown direction {other:?}"))),
    }
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct CrosswordGame {
    state: GameState,
    /// Problems found while decoding or indexing
    inconsistencies: Vec<String>,
}

impl CrosswordGame {
    fn with_puzzle(puzzle: Puzzle, mut inconsistencies: Vec<String>) -> Self {
        inconsistencies.extend(puzzle.clues().inconsistencies().iter().map(|i| i.to_string()));
        Self {
            state: GameState::new(puzzle),
            inconsistencies,
        }
    }
}

#[wasm_bindgen]
impl CrosswordGame {
    /// Open a structured JSON document
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<CrosswordGame, JsValue> {
        let puzzle = Puzzle::from_json(json).map_err(document_error)?;
        Ok(Self::with_puzzle(puzzle, Vec::new()))
    }

    /// Open the bytes of a `.puz` file
    #[wasm_bindgen(js_name = fromPuz)]
    pub fn from_puz(bytes: &[u8]) -> Result<CrosswordGame, JsValue> {
        let decoded = decode_puz(bytes).map_err(format_error)?;
        let puzzle = Puzzle::load(&decoded.document).map_err(document_error)?;
        let issues = decoded.inconsistencies.iter().map(|i| i.to_string()).collect();
        Ok(Self::with_puzzle(puzzle, issues))
    }

    pub fn title(&self) -> String {
        self.state.puzzle().title().to_string()
    }

    pub fn author(&self) -> String {
        self.state.puzzle().author().to_string()
    }

    pub fn rows(&self) -> usize {
        self.state.puzzle().grid().rows()
    }

    pub fn cols(&self) -> usize {
        self.state.puzzle().grid().cols()
    }

    pub fn inconsistencies(&self) -> Vec<String> {
        self.inconsistencies.clone()
    }

    /// Structured document JSON, e.g. after opening a `.puz`
    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        self.state.puzzle().to_document().to_json().map_err(document_error)
    }

    /// Advance the elapsed counter by one frame's worth of milliseconds
    pub fn tick(&mut self, delta_ms: f64) {
        self.state.tick(delta_ms);
    }

    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, shift: bool) -> bool {
        self.state.handle_key(key, shift)
    }

    pub fn click(&mut self, row: usize, col: usize) -> bool {
        self.state.click(row, col)
    }

    /// Text typed into a cell (the on-screen input path)
    pub fn input(&mut self, row: usize, col: usize, text: &str) -> bool {
        self.state.input(row, col, text)
    }

    pub fn backspace(&mut self, row: usize, col: usize) -> bool {
        self.state.backspace(row, col)
    }

    /// Array of `{ row, col, black, number, letter, cursor, in_word }`
    pub fn cells(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.cells())
    }

    /// Clues for `"across"` or `"down"`
    pub fn clues(&self, direction: &str) -> Result<JsValue, JsValue> {
        to_js(&self.state.clues(parse_direction(direction)?))
    }

    #[wasm_bindgen(js_name = currentClue)]
    pub fn current_clue(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.current_clue())
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    #[wasm_bindgen(js_name = isCorrect)]
    pub fn is_correct(&self) -> bool {
        self.state.is_correct()
    }

    #[wasm_bindgen(js_name = isSolved)]
    pub fn is_solved(&self) -> bool {
        self.state.session().is_solved()
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.state.session().is_paused()
    }

    #[wasm_bindgen(js_name = elapsedSecs)]
    pub fn elapsed_secs(&self) -> u32 {
        self.state.elapsed_secs()
    }

    #[wasm_bindgen(js_name = elapsedString)]
    pub fn elapsed_string(&self) -> String {
        self.state.elapsed_string()
    }

    /// Current progress as JSON
    #[wasm_bindgen(js_name = getStateJson)]
    pub fn get_state_json(&self) -> String {
        serde_json::to_string(&self.state.to_serializable()).unwrap_or_default()
    }

    /// Load progress saved by `getStateJson`
    #[wasm_bindgen(js_name = loadStateJson)]
    pub fn load_state_json(&mut self, json: &str) -> bool {
        match serde_json::from_str(json) {
            Ok(state) => {
                self.state.restore(state);
                true
            }
            Err(e) => {
                log::warn!("discarding saved state: {e}");
                false
            }
        }
    }
}
