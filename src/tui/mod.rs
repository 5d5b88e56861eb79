//! # TUI Adapter
//!
//! The terminal-specific layer: raw key decoding, escape-sequence rendering,
//! and the session that ties them to the core state machine.
//!
//! This is the only module that knows about crossterm and the real terminal.
//!
//! ## Activities
//!
//! ```text
//! main task                       reader task (spawn_blocking)
//! ─────────                       ────────────────────────────
//! raw mode + alternate screen
//! full redraw
//! spawn reader ─────────────────▶ loop: read key → lock → transition
//! await reader                          → persist → render → unlock
//! restore terminal ◀───────────── exit token or read error
//! ```
//!
//! The viewport height is measured once at startup. Resizing the terminal
//! mid-session leaves the cached height and column widths stale until the
//! next full redraw.
//!
//! Rows are never clipped horizontally. A row wider than the terminal wraps
//! onto extra screen lines, and the relative `ESC[nA`/`ESC[nB` moves, which
//! count one screen line per row, then land on the wrong row.

pub mod event;
pub mod session;
pub mod ui;

use log::info;
use std::io::{self, stdout};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use crate::core::config::ResolvedConfig;
use crate::core::grid::{DataGrid, MutationCallback};
use crate::tui::session::Session;
use crate::tui::ui::Renderer;

/// Lines the header and the spare bottom line take away from the data rows.
const RESERVED_LINES: usize = 2;

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;
        info!("Terminal modes enabled (raw, alternate screen, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Data rows that fit in a terminal `terminal_rows` lines tall.
pub fn viewport_height(terminal_rows: u16) -> usize {
    usize::from(terminal_rows)
        .saturating_sub(RESERVED_LINES)
        .max(1)
}

/// Run an interactive session until an exit key or a fatal read error.
pub async fn run(
    grid: DataGrid,
    on_mutation: MutationCallback,
    config: &ResolvedConfig,
) -> io::Result<()> {
    let _terminal_mode_guard = TerminalModeGuard::new()?;
    let (_, rows) = terminal::size()?;

    let renderer = Renderer::new(config.theme, config.column_padding);
    let session = Session::new(grid, on_mutation, renderer, viewport_height(rows));
    session.draw(&mut stdout())?;

    let reader = session.clone();
    let result = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        reader.run_with(stdin.lock(), &mut stdout())
    })
    .await
    .map_err(io::Error::other)?;

    info!(
        "Session ended with {} data rows",
        session.with_state(|s| s.grid.data_len())
    );
    result
}
