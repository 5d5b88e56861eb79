//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use crate::core::grid::{DataGrid, MutationCallback};

/// Every snapshot a [`recording_callback`] has received, in order.
pub type Recorded = Arc<Mutex<Vec<Vec<Vec<String>>>>>;

/// Owned rows from string literals.
pub fn grid_rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// The `name`/`score` table used throughout the tests.
pub fn sample_grid() -> DataGrid {
    DataGrid::new(grid_rows(&[&["name", "score"], &["Alice", "10"], &["Bob", "20"]]))
        .expect("sample grid is rectangular")
}

/// A mutation callback that stores every snapshot it receives.
pub fn recording_callback() -> (MutationCallback, Recorded) {
    let calls: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let callback: MutationCallback = Box::new(move |rows: &[Vec<String>]| {
        sink.lock().unwrap().push(rows.to_vec());
    });
    (callback, calls)
}

/// Replays input the way a terminal delivers it: one key press per `read`.
pub struct ChunkedReader {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkedReader {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}
