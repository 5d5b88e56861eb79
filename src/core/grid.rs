//! # Data Grid
//!
//! The table being edited, held entirely in memory.
//!
//! ```text
//! rows[0]   | name  | score |   header, fixed for the whole session
//! rows[1]   | Alice | 10    |   ┐
//! rows[2]   | Bob   | 20    |   ┘ data rows, removable one at a time
//! ```
//!
//! Every row has exactly as many fields as the header. The only mutation is
//! [`DataGrid::delete_row`], and every successful deletion hands the complete
//! post-deletion grid to the registered mutation callback exactly once, before
//! `delete_row` returns. Where that snapshot ends up (a file, a spreadsheet)
//! is the callback owner's business.

use std::fmt;

/// Invoked synchronously with the full grid (header included) after each mutation.
pub type MutationCallback = Box<dyn FnMut(&[Vec<String>]) + Send>;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The input had no rows at all, so there is no header.
    MissingHeader,
    /// The header row has zero fields.
    NoColumns,
    /// A row's field count differs from the header's.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Deletion targeted the header or a row past the end.
    RowOutOfRange { index: usize, len: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::MissingHeader => write!(f, "grid has no header row"),
            GridError::NoColumns => write!(f, "grid header has no columns"),
            GridError::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} fields, expected {expected}"),
            GridError::RowOutOfRange { index, len } => {
                write!(f, "row {index} is not a data row (grid has {len} rows)")
            }
        }
    }
}

impl std::error::Error for GridError {}

// ============================================================================
// Grid
// ============================================================================

pub struct DataGrid {
    rows: Vec<Vec<String>>,
    on_mutation: Option<MutationCallback>,
}

impl fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGrid")
            .field("rows", &self.rows)
            .field("has_callback", &self.on_mutation.is_some())
            .finish()
    }
}

impl DataGrid {
    /// Build a grid from a header row followed by data rows.
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, GridError> {
        let header = rows.first().ok_or(GridError::MissingHeader)?;
        let expected = header.len();
        if expected == 0 {
            return Err(GridError::NoColumns);
        }
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len()))
            .find(|&(_, len)| len != expected)
        {
            return Err(GridError::RaggedRow {
                row,
                expected,
                found,
            });
        }
        Ok(Self {
            rows,
            on_mutation: None,
        })
    }

    /// Register the callback that receives the grid after every mutation.
    /// Replaces any previously registered callback.
    pub fn on_mutation(&mut self, callback: MutationCallback) {
        self.on_mutation = Some(callback);
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn column_count(&self) -> usize {
        self.rows[0].len()
    }

    /// Total rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows (header excluded).
    pub fn data_len(&self) -> usize {
        self.rows.len() - 1
    }

    /// True when only the header is left.
    pub fn is_empty(&self) -> bool {
        self.data_len() == 0
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// An owned copy of the whole grid, header first.
    pub fn snapshot(&self) -> Vec<Vec<String>> {
        self.rows.clone()
    }

    /// Remove data row `index`, shifting later rows up.
    ///
    /// Returns the new grid and `index` clamped into the new data-row domain,
    /// the line the cursor should rest on. The mutation callback runs once,
    /// after the removal, before this returns.
    pub fn delete_row(&mut self, index: usize) -> Result<(&[Vec<String>], usize), GridError> {
        if index == 0 || index >= self.rows.len() {
            return Err(GridError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.rows.remove(index);
        let line = clamp_line(index, self.data_len());

        if let Some(callback) = self.on_mutation.as_mut() {
            callback(&self.rows);
        }
        Ok((&self.rows, line))
    }
}

/// Clamp a cursor line into `[1, data_len]`.
///
/// With no data rows the result is 1, which addresses nothing; callers check
/// [`DataGrid::is_empty`] before treating the line as a row.
pub fn clamp_line(line: usize, data_len: usize) -> usize {
    line.clamp(1, data_len.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{grid_rows, recording_callback};

    #[test]
    fn test_new_rejects_empty_input() {
        assert_eq!(DataGrid::new(vec![]).unwrap_err(), GridError::MissingHeader);
    }

    #[test]
    fn test_new_rejects_empty_header() {
        assert_eq!(
            DataGrid::new(vec![vec![]]).unwrap_err(),
            GridError::NoColumns
        );
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let rows = grid_rows(&[&["name", "score"], &["Alice", "10"], &["Bob"]]);
        assert_eq!(
            DataGrid::new(rows).unwrap_err(),
            GridError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_header_only_grid_is_empty() {
        let grid = DataGrid::new(grid_rows(&[&["name", "score"]])).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.column_count(), 2);
    }

    #[test]
    fn test_delete_row_shifts_and_notifies_once() {
        let rows = grid_rows(&[&["name", "score"], &["Alice", "10"], &["Bob", "20"], &["Cy", "30"]]);
        let mut grid = DataGrid::new(rows).unwrap();
        let (callback, calls) = recording_callback();
        grid.on_mutation(callback);

        let (after, line) = grid.delete_row(2).unwrap();
        let expected = grid_rows(&[&["name", "score"], &["Alice", "10"], &["Cy", "30"]]);
        assert_eq!(after, expected.as_slice());
        assert_eq!(line, 2);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], expected);
    }

    #[test]
    fn test_delete_last_row_clamps_line() {
        let rows = grid_rows(&[&["name", "score"], &["Alice", "10"], &["Bob", "20"]]);
        let mut grid = DataGrid::new(rows).unwrap();
        let (_, line) = grid.delete_row(2).unwrap();
        assert_eq!(line, 1);
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn test_delete_header_is_rejected_without_callback() {
        let mut grid = DataGrid::new(grid_rows(&[&["name"], &["Alice"]])).unwrap();
        let (callback, calls) = recording_callback();
        grid.on_mutation(callback);

        assert_eq!(
            grid.delete_row(0).unwrap_err(),
            GridError::RowOutOfRange { index: 0, len: 2 }
        );
        assert!(grid.delete_row(2).is_err());
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn test_clamp_line() {
        assert_eq!(clamp_line(0, 3), 1);
        assert_eq!(clamp_line(2, 3), 2);
        assert_eq!(clamp_line(9, 3), 3);
        assert_eq!(clamp_line(4, 0), 1);
    }
}
