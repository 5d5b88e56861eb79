//! # Actions
//!
//! Every key press becomes a [`Key`] token. [`transition`] takes the current
//! [`SessionState`] and a token, updates the state, and returns the render
//! operations that bring the screen up to date plus an [`Effect`] for the
//! caller. No terminal I/O happens here; the renderer executes the ops.
//!
//! ```text
//! State + Key  →  transition()  →  New State + [RenderOp] + Effect
//! ```
//!
//! ## Modes
//!
//! ```text
//!            up/down            left/right
//!   Table ───────────▶  Row  ─────────────▶  Column
//!         ◀─────────── (esc) ◀───────────── (esc)
//! ```
//!
//! Navigation never fails: lines clamp at the first and last data row,
//! columns wrap around. Deleting (`x` or backspace) is only possible while a
//! row is selected and always ends in a full redraw.

use log::{debug, info, warn};

use crate::core::grid::clamp_line;
use crate::core::state::{Mode, SessionState};

// ============================================================================
// Key Tokens
// ============================================================================

pub const KEY_ARROW_UP: &str = "1b5b41";
pub const KEY_ARROW_DOWN: &str = "1b5b42";
pub const KEY_ARROW_RIGHT: &str = "1b5b43";
pub const KEY_ARROW_LEFT: &str = "1b5b44";
pub const KEY_ESC: &str = "1b";
pub const KEY_X: &str = "78";
pub const KEY_BACKSPACE: &str = "7f";
pub const COM_CTRL_C: &str = "03";
pub const COM_CTRL_D: &str = "04";

/// A complete, decoded key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Esc,
    X,
    Backspace,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    EndOfTransmission,
    /// Anything else, kept as raw bytes.
    Other(Vec<u8>),
}

impl Key {
    pub fn from_bytes(bytes: &[u8]) -> Key {
        match bytes {
            [0x1b, 0x5b, 0x41] => Key::ArrowUp,
            [0x1b, 0x5b, 0x42] => Key::ArrowDown,
            [0x1b, 0x5b, 0x43] => Key::ArrowRight,
            [0x1b, 0x5b, 0x44] => Key::ArrowLeft,
            [0x1b] => Key::Esc,
            [0x78] => Key::X,
            [0x7f] => Key::Backspace,
            [0x03] => Key::Interrupt,
            [0x04] => Key::EndOfTransmission,
            other => Key::Other(other.to_vec()),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Key::ArrowUp => &[0x1b, 0x5b, 0x41],
            Key::ArrowDown => &[0x1b, 0x5b, 0x42],
            Key::ArrowRight => &[0x1b, 0x5b, 0x43],
            Key::ArrowLeft => &[0x1b, 0x5b, 0x44],
            Key::Esc => &[0x1b],
            Key::X => &[0x78],
            Key::Backspace => &[0x7f],
            Key::Interrupt => &[0x03],
            Key::EndOfTransmission => &[0x04],
            Key::Other(bytes) => bytes,
        }
    }

    /// Lowercase hexadecimal encoding of the raw bytes, e.g. `1b5b41`.
    pub fn hex(&self) -> String {
        self.bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Exit tokens end the session.
    pub fn is_exit(&self) -> bool {
        matches!(self, Key::Interrupt | Key::EndOfTransmission)
    }
}

// ============================================================================
// Render Operations
// ============================================================================

/// How a repainted row is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    Row,
    /// Only the given column is highlighted; the rest of the row is dimmed.
    Cell(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    /// Clear the screen, recompute column widths, draw header and visible rows.
    /// Leaves the terminal cursor on the first data row.
    FullRedraw,
    /// Reprint data row `row` on the terminal cursor's current line.
    RepaintRow { row: usize, highlight: Highlight },
    /// Relative vertical cursor move; negative is up.
    MoveCursorLines(isize),
    /// Absolute move, 0-based screen coordinates.
    MoveCursorAbsolute { line: usize, column: usize },
}

// ============================================================================
// Transition
// ============================================================================

/// What the caller must do after applying the render ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Data row `index` was removed; the grid's mutation callback has already
    /// received the full updated grid.
    RowDeleted { index: usize, remaining: usize },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub ops: Vec<RenderOp>,
    pub effect: Effect,
}

impl Transition {
    fn none() -> Self {
        Self {
            ops: Vec::new(),
            effect: Effect::None,
        }
    }

    fn render(ops: Vec<RenderOp>) -> Self {
        Self {
            ops,
            effect: Effect::None,
        }
    }
}

/// Apply one key token to the session state.
pub fn transition(state: &mut SessionState, key: &Key) -> Transition {
    let before = state.mode;
    let result = match key {
        key if key.is_exit() => Transition {
            ops: Vec::new(),
            effect: Effect::Quit,
        },
        Key::ArrowUp => vertical(state, -1),
        Key::ArrowDown => vertical(state, 1),
        Key::ArrowLeft => horizontal(state, -1),
        Key::ArrowRight => horizontal(state, 1),
        Key::Esc => escape(state),
        Key::X | Key::Backspace => delete(state),
        _ => Transition::none(),
    };
    if state.mode != before {
        debug!("Mode {:?} -> {:?}", before, state.mode);
    }
    result
}

/// The highlight the cursor row should carry in the current mode.
pub fn cursor_highlight(state: &SessionState) -> Highlight {
    match state.mode {
        Mode::Table => Highlight::None,
        Mode::Row => Highlight::Row,
        Mode::Column => Highlight::Cell(state.cursor.column),
    }
}

/// Ops for a complete repaint that restores the cursor row and its highlight.
pub fn redraw_ops(state: &SessionState) -> Vec<RenderOp> {
    let mut ops = vec![RenderOp::FullRedraw];
    if !state.has_addressable_row() {
        return ops;
    }
    let line = state.cursor.line;
    let screen_line = state.viewport.screen_line(line);
    if screen_line != 1 {
        ops.push(RenderOp::MoveCursorAbsolute {
            line: screen_line,
            column: 0,
        });
    }
    if state.mode != Mode::Table {
        ops.push(RenderOp::RepaintRow {
            row: line,
            highlight: cursor_highlight(state),
        });
    }
    ops
}

fn vertical(state: &mut SessionState, delta: isize) -> Transition {
    if !state.has_addressable_row() {
        return Transition::none();
    }
    match state.mode {
        Mode::Table => {
            state.mode = Mode::Row;
            Transition::render(vec![RenderOp::RepaintRow {
                row: state.cursor.line,
                highlight: Highlight::Row,
            }])
        }
        Mode::Row | Mode::Column => move_line(state, delta),
    }
}

fn move_line(state: &mut SessionState, delta: isize) -> Transition {
    let from = state.cursor.line;
    let to = clamp_line(from.saturating_add_signed(delta), state.grid.data_len());
    if to == from {
        return Transition::none();
    }
    state.cursor.line = to;

    if state.viewport.reveal(to) {
        debug!("Viewport scrolled to top={}", state.viewport.top);
        return Transition::render(redraw_ops(state));
    }
    Transition::render(vec![
        RenderOp::RepaintRow {
            row: from,
            highlight: Highlight::None,
        },
        RenderOp::MoveCursorLines(to as isize - from as isize),
        RenderOp::RepaintRow {
            row: to,
            highlight: cursor_highlight(state),
        },
    ])
}

fn horizontal(state: &mut SessionState, delta: isize) -> Transition {
    match state.mode {
        Mode::Table => Transition::none(),
        Mode::Row => {
            state.mode = Mode::Column;
            Transition::render(vec![RenderOp::RepaintRow {
                row: state.cursor.line,
                highlight: Highlight::Cell(state.cursor.column),
            }])
        }
        Mode::Column => {
            let count = state.grid.column_count() as isize;
            state.cursor.column = (state.cursor.column as isize + delta).rem_euclid(count) as usize;
            Transition::render(vec![RenderOp::RepaintRow {
                row: state.cursor.line,
                highlight: Highlight::Cell(state.cursor.column),
            }])
        }
    }
}

fn escape(state: &mut SessionState) -> Transition {
    if state.mode == Mode::Table {
        return Transition::none();
    }
    state.mode = state.mode.pop();
    Transition::render(vec![RenderOp::RepaintRow {
        row: state.cursor.line,
        highlight: cursor_highlight(state),
    }])
}

fn delete(state: &mut SessionState) -> Transition {
    if state.mode == Mode::Table || !state.has_addressable_row() {
        return Transition::none();
    }
    let index = state.cursor.line;
    match state.grid.delete_row(index) {
        Ok((_, line)) => state.cursor.line = line,
        Err(e) => {
            warn!("Delete ignored: {}", e);
            return Transition::none();
        }
    }
    state.reclamp();
    if state.grid.is_empty() {
        state.mode = Mode::Table;
    }

    let remaining = state.grid.data_len();
    info!("Deleted row {} ({} data rows remain)", index, remaining);
    Transition {
        ops: redraw_ops(state),
        effect: Effect::RowDeleted { index, remaining },
    }
}
