//! # Session State
//!
//! Everything the navigation logic reads and writes, in one value.
//!
//! ```text
//! SessionState
//! ├── grid: DataGrid       // header + data rows
//! ├── mode: Mode           // Table | Row | Column
//! ├── cursor: Cursor       // (line, column)
//! └── viewport: Viewport   // visible window of data rows
//! ```
//!
//! State changes only happen through `transition(state, key)` in action.rs.

use crate::core::grid::{DataGrid, clamp_line};

/// Selection granularity. `Column` always implies an active row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Nothing selected.
    #[default]
    Table,
    /// One row highlighted.
    Row,
    /// One cell of the highlighted row highlighted.
    Column,
}

impl Mode {
    /// The mode one level up; `Table` stays `Table`.
    pub fn pop(self) -> Mode {
        match self {
            Mode::Column => Mode::Row,
            Mode::Row | Mode::Table => Mode::Table,
        }
    }
}

/// `line` indexes data rows (1-based, header excluded), `column` indexes fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// Window of data rows currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible data row (>= 1).
    pub top: usize,
    /// Number of data rows that fit on screen (>= 1).
    pub height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            top: 1,
            height: height.max(1),
        }
    }

    /// One past the last visible data row.
    pub fn bottom(&self) -> usize {
        self.top + self.height
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.top..self.bottom()).contains(&line)
    }

    /// Scroll the minimal amount so `line` is visible. Returns true if `top` moved.
    pub fn reveal(&mut self, line: usize) -> bool {
        let top = if line < self.top {
            line
        } else if line >= self.bottom() {
            line + 1 - self.height
        } else {
            self.top
        };
        let moved = top != self.top;
        self.top = top.max(1);
        moved
    }

    /// Screen line of a data row: the header sits on screen line 0.
    pub fn screen_line(&self, line: usize) -> usize {
        line.saturating_sub(self.top) + 1
    }
}

pub struct SessionState {
    pub grid: DataGrid,
    pub mode: Mode,
    pub cursor: Cursor,
    pub viewport: Viewport,
}

impl SessionState {
    pub fn new(grid: DataGrid, viewport_height: usize) -> Self {
        Self {
            grid,
            mode: Mode::default(),
            cursor: Cursor::default(),
            viewport: Viewport::new(viewport_height),
        }
    }

    /// Whether the cursor line currently points at a data row.
    pub fn has_addressable_row(&self) -> bool {
        !self.grid.is_empty()
    }

    /// Re-establish the cursor and viewport invariants after the grid shrank.
    pub fn reclamp(&mut self) {
        let data_len = self.grid.data_len();
        self.cursor.line = clamp_line(self.cursor.line, data_len);
        // Pull the window up if rows vanished beneath it.
        let max_top = data_len.saturating_sub(self.viewport.height) + 1;
        self.viewport.top = self.viewport.top.min(max_top).max(1);
        self.viewport.reveal(self.cursor.line);
    }
}
