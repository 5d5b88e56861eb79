//! # Session
//!
//! Owns the grid, the navigation state and the renderer, and runs one
//! key-handling cycle per decoded token:
//!
//! ```text
//! lock ─▶ transition() ─▶ [grid mutation callback] ─▶ render ops ─▶ flush ─▶ unlock
//! ```
//!
//! Everything a cycle touches sits behind a single mutex, so two cycles can
//! never interleave their terminal output. Today only the reader task takes
//! the lock after the initial draw, but anything added later (a resize
//! watcher, say) has to go through the same door.
//!
//! The mutation callback runs under the lock. A slow save stalls the UI
//! instead of queuing or dropping the change; that is a deliberate
//! usability trade-off.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::core::action::{Effect, Key, redraw_ops, transition};
use crate::core::grid::{DataGrid, MutationCallback};
use crate::core::state::SessionState;
use crate::tui::event::KeyDecoder;
use crate::tui::ui::Renderer;

struct Shared {
    state: SessionState,
    renderer: Renderer,
}

#[derive(Clone)]
pub struct Session {
    shared: Arc<Mutex<Shared>>,
}

impl Session {
    /// `on_mutation` receives the full grid after every row deletion.
    pub fn new(
        mut grid: DataGrid,
        on_mutation: MutationCallback,
        renderer: Renderer,
        viewport_height: usize,
    ) -> Self {
        grid.on_mutation(on_mutation);
        info!(
            "Session started: {} columns, {} data rows, viewport of {} rows",
            grid.column_count(),
            grid.data_len(),
            viewport_height
        );
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: SessionState::new(grid, viewport_height),
                renderer,
            })),
        }
    }

    /// Draw the whole table from scratch.
    pub fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut shared = self.lock();
        let Shared { state, renderer } = &mut *shared;
        renderer.render(out, state, &redraw_ops(state))
    }

    /// Run one key cycle. Returns `false` once the session should end.
    pub fn handle_key<W: Write>(&self, key: Key, out: &mut W) -> io::Result<bool> {
        let mut shared = self.lock();
        let Shared { state, renderer } = &mut *shared;

        let result = transition(state, &key);
        renderer.render(out, state, &result.ops)?;

        match result.effect {
            Effect::Quit => {
                info!("Exit key {} received", key.hex());
                Ok(false)
            }
            Effect::RowDeleted { index, remaining } => {
                debug!("Row {} deleted and persisted, {} remain", index, remaining);
                Ok(true)
            }
            Effect::None => Ok(true),
        }
    }

    /// Decode keys from `input` and handle each until an exit token arrives.
    pub fn run_with<R: Read, W: Write>(&self, input: R, out: &mut W) -> io::Result<()> {
        KeyDecoder::new(input).read_keys(|key| self.handle_key(key, out))
    }

    /// Inspect the current state under the session lock.
    pub fn with_state<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        f(&self.lock().state)
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Theme;
    use crate::core::state::Mode;
    use crate::test_support::{ChunkedReader, grid_rows, recording_callback, sample_grid};

    fn session() -> (Session, crate::test_support::Recorded) {
        let (callback, calls) = recording_callback();
        let session = Session::new(sample_grid(), callback, Renderer::new(Theme::default(), 4), 10);
        (session, calls)
    }

    #[test]
    fn test_draw_paints_full_table() {
        let (session, _) = session();
        let mut out = Vec::new();
        session.draw(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Alice"));
        assert!(out.contains("Bob"));
    }

    #[test]
    fn test_handle_key_reports_exit() {
        let (session, _) = session();
        let mut out = Vec::new();
        assert!(session.handle_key(Key::ArrowDown, &mut out).unwrap());
        assert!(!session.handle_key(Key::Interrupt, &mut out).unwrap());
        assert_eq!(session.with_state(|s| s.mode), Mode::Row);
    }

    #[test]
    fn test_run_with_deletes_and_persists_once() {
        let (session, calls) = session();
        let input = ChunkedReader::new(&[b"\x1b[B", b"\x1b[B", b"\x7f", b"\x03"]);
        let mut out = Vec::new();
        session.draw(&mut out).unwrap();
        session.run_with(input, &mut out).unwrap();

        let expected = grid_rows(&[&["name", "score"], &["Alice", "10"]]);
        assert_eq!(*calls.lock().unwrap(), vec![expected.clone()]);
        session.with_state(|s| {
            assert_eq!(s.grid.rows(), expected.as_slice());
            assert_eq!(s.cursor.line, 1);
        });
    }

    #[test]
    fn test_clones_share_state() {
        let (session, _) = session();
        let reader = session.clone();
        let handle = std::thread::spawn(move || {
            let mut out = Vec::new();
            reader
                .run_with(ChunkedReader::new(&[b"\x1b[A", b"\x1b[C", b"\x04"]), &mut out)
                .unwrap();
        });
        handle.join().unwrap();
        assert_eq!(session.with_state(|s| s.mode), Mode::Column);
    }
}
