//! # Grid Store
//!
//! Load and save the whole grid as one sheet on disk.
//!
//! The format follows the file extension:
//!
//! - `.csv`: one record per row, the first record is the header
//! - `.json`: an array of arrays of strings, header first
//!
//! Saves always overwrite the entire sheet with the full grid and go through
//! an atomic rename (write `.tmp`, then `rename()`) so a crash mid-save never
//! leaves a half-written file behind.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::core::grid::{DataGrid, GridError, MutationCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Csv,
    Json,
}

impl StoreFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(StoreFormat::Csv),
            "json" => Some(StoreFormat::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    UnsupportedFormat(PathBuf),
    Grid(GridError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {e}"),
            StoreError::Csv(e) => write!(f, "CSV error: {e}"),
            StoreError::Json(e) => write!(f, "JSON error: {e}"),
            StoreError::UnsupportedFormat(path) => {
                write!(f, "unsupported data file '{}' (expected .csv or .json)", path.display())
            }
            StoreError::Grid(e) => write!(f, "invalid grid: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Csv(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

impl From<GridError> for StoreError {
    fn from(e: GridError) -> Self {
        StoreError::Grid(e)
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone)]
pub struct GridStore {
    path: PathBuf,
    format: StoreFormat,
}

impl GridStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let format =
            StoreFormat::from_path(&path).ok_or_else(|| StoreError::UnsupportedFormat(path.clone()))?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Read the whole sheet and validate it as a grid.
    pub fn load(&self) -> Result<DataGrid, StoreError> {
        let rows = match self.format {
            StoreFormat::Csv => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_path(&self.path)?;
                let mut rows = Vec::new();
                for record in reader.records() {
                    let record = record?;
                    rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
                }
                rows
            }
            StoreFormat::Json => {
                let json = fs::read_to_string(&self.path)?;
                serde_json::from_str::<Vec<Vec<String>>>(&json)?
            }
        };
        info!("Loaded {} rows from {}", rows.len(), self.path.display());
        Ok(DataGrid::new(rows)?)
    }

    /// Overwrite the sheet with `rows` (header first).
    pub fn save(&self, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let bytes = match self.format {
            StoreFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for row in rows {
                    writer.write_record(row)?;
                }
                writer
                    .into_inner()
                    .map_err(|e| StoreError::Io(io::Error::other(e.to_string())))?
            }
            StoreFormat::Json => serde_json::to_vec_pretty(rows)?,
        };
        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    /// A mutation callback that saves every snapshot synchronously.
    ///
    /// Save failures are logged and swallowed: the session keeps the
    /// in-memory grid and the next successful save writes the full state.
    pub fn into_callback(self) -> MutationCallback {
        Box::new(move |rows: &[Vec<String>]| {
            if let Err(e) = self.save(rows) {
                warn!("Failed to persist grid to {}: {}", self.path.display(), e);
            }
        })
    }
}

/// Atomically write `bytes` to `path` (via `.tmp` + rename).
fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
