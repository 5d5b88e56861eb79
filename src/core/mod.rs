//! # Core Application Logic
//!
//! Grid, navigation and persistence. It knows nothing about the terminal.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • DataGrid (table)     │
//!                    │  • SessionState         │
//!                    │  • transition()         │
//!                    │                         │
//!                    │  No terminal I/O.       │
//!                    └───────────┬─────────────┘
//!                                │  RenderOps
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (crossterm)│
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: The `DataGrid` — header plus data rows, deletion, mutation callback
//! - [`state`]: `SessionState` — mode, cursor and viewport in one place
//! - [`action`]: Key tokens, render ops and the `transition()` function
//! - [`config`]: Config file loading and resolution
//! - [`store`]: CSV/JSON files the grid is loaded from and saved to

pub mod action;
pub mod config;
pub mod grid;
pub mod state;
pub mod store;
