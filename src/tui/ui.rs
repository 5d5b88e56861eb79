//! # Renderer
//!
//! Executes [`RenderOp`]s against any `Write`, using plain ANSI sequences via
//! crossterm commands. The screen looks like this:
//!
//! ```text
//! line 0   |  name  | score |     header, labels centered
//! line 1   | Alice  |  10   |  ┐
//! line 2   |  Bob   |  20   |  ┘ data rows from viewport.top onward
//! ```
//!
//! Only `FullRedraw` clears the screen. Navigation repaints at most two rows
//! and moves the cursor with relative `ESC[nA` / `ESC[nB`, so the output per
//! key press does not grow with the table.
//!
//! Column widths come from the header labels plus padding. They are computed
//! on `FullRedraw` and cached until the next one; a terminal resize between
//! full redraws is not noticed.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveTo, MoveUp};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::action::{Highlight, RenderOp};
use crate::core::config::Theme;
use crate::core::state::SessionState;

/// Replaces the tail of cells too wide for their column.
pub const ELLIPSIS: &str = "...";

const MIN_COLUMN_WIDTH: usize = ELLIPSIS.len() + 1;

#[derive(Debug)]
pub struct Renderer {
    theme: Theme,
    column_padding: usize,
    widths: Vec<usize>,
}

impl Renderer {
    pub fn new(theme: Theme, column_padding: usize) -> Self {
        Self {
            theme,
            column_padding,
            widths: Vec::new(),
        }
    }

    pub fn column_widths(&self) -> &[usize] {
        &self.widths
    }

    /// Apply `ops` in order and flush once at the end.
    pub fn render<W: Write>(
        &mut self,
        out: &mut W,
        state: &SessionState,
        ops: &[RenderOp],
    ) -> io::Result<()> {
        for op in ops {
            self.apply(out, state, op)?;
        }
        out.flush()
    }

    fn apply<W: Write>(&mut self, out: &mut W, state: &SessionState, op: &RenderOp) -> io::Result<()> {
        match *op {
            RenderOp::FullRedraw => self.full_redraw(out, state),
            RenderOp::RepaintRow { row, highlight } => match state.grid.row(row) {
                Some(cells) if row > 0 => self.repaint_row(out, cells, highlight),
                _ => Ok(()),
            },
            RenderOp::MoveCursorLines(delta) if delta < 0 => {
                queue!(out, MoveUp(to_u16(delta.unsigned_abs())))
            }
            RenderOp::MoveCursorLines(delta) if delta > 0 => {
                queue!(out, MoveDown(to_u16(delta.unsigned_abs())))
            }
            RenderOp::MoveCursorLines(_) => Ok(()),
            RenderOp::MoveCursorAbsolute { line, column } => {
                queue!(out, MoveTo(to_u16(column), to_u16(line)))
            }
        }
    }

    fn full_redraw<W: Write>(&mut self, out: &mut W, state: &SessionState) -> io::Result<()> {
        let grid = &state.grid;
        self.widths = column_widths(grid.header(), self.column_padding);

        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        out.write_all(self.plain_line(grid.header()).as_bytes())?;

        let end = state.viewport.bottom().min(grid.row_count());
        for index in state.viewport.top..end {
            if let Some(cells) = grid.row(index) {
                out.write_all(b"\r\n")?;
                out.write_all(self.plain_line(cells).as_bytes())?;
            }
        }
        queue!(out, MoveTo(0, 1))
    }

    /// Reprint one row in place on the cursor's current line.
    fn repaint_row<W: Write>(&self, out: &mut W, cells: &[String], highlight: Highlight) -> io::Result<()> {
        out.write_all(b"\r")?;
        match highlight {
            Highlight::None => out.write_all(self.plain_line(cells).as_bytes()),
            Highlight::Row => self.highlighted(out, &self.plain_line(cells)),
            Highlight::Cell(selected) => {
                out.write_all(b"|")?;
                for (column, (cell, width)) in cells.iter().zip(&self.widths).enumerate() {
                    let text = fit_cell(cell, *width);
                    if column == selected {
                        self.highlighted(out, &text)?;
                    } else {
                        queue!(out, SetAttribute(Attribute::Dim), Print(text), SetAttribute(Attribute::Reset))?;
                    }
                    out.write_all(b"|")?;
                }
                Ok(())
            }
        }
    }

    fn highlighted<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        queue!(
            out,
            SetBackgroundColor(self.theme.highlight_bg),
            SetForegroundColor(self.theme.highlight_fg),
            Print(text),
            SetAttribute(Attribute::Reset)
        )
    }

    fn plain_line(&self, cells: &[String]) -> String {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(&self.widths) {
            line.push_str(&fit_cell(cell, *width));
            line.push('|');
        }
        line
    }
}

/// Width of each column: header label width plus padding.
pub fn column_widths(header: &[String], padding: usize) -> Vec<usize> {
    header
        .iter()
        .map(|label| (label.width() + padding).max(MIN_COLUMN_WIDTH))
        .collect()
}

/// Fit `text` into exactly `width` display columns.
///
/// Text that fits is centered (odd leftover space goes right). Text that
/// doesn't keeps its first `width - 3` columns followed by [`ELLIPSIS`].
pub fn fit_cell(text: &str, width: usize) -> String {
    // Control characters would break the row layout.
    let text: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let len = text.width();

    if len <= width {
        let left = (width - len) / 2;
        let right = width - len - left;
        return format!("{}{}{}", " ".repeat(left), text, " ".repeat(right));
    }

    let budget = width.saturating_sub(ELLIPSIS.len());
    let mut fitted = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        fitted.push(c);
    }
    // A wide character that didn't fit leaves a one-column gap.
    fitted.push_str(&" ".repeat(budget - used));
    fitted.push_str(ELLIPSIS);
    fitted
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::DataGrid;
    use crate::core::state::SessionState;
    use crate::test_support::{grid_rows, sample_grid};

    fn render_to_string(renderer: &mut Renderer, state: &SessionState, ops: &[RenderOp]) -> String {
        let mut out = Vec::new();
        renderer.render(&mut out, state, ops).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn drawn(state: &SessionState) -> Renderer {
        let mut renderer = Renderer::new(Theme::default(), 4);
        render_to_string(&mut renderer, state, &[RenderOp::FullRedraw]);
        renderer
    }

    // ------------------------------------------------------------------------
    // Cell fitting
    // ------------------------------------------------------------------------

    #[test]
    fn test_fit_cell_truncates_long_text() {
        assert_eq!(fit_cell("Toads of the Bayou", 8), "Toads...");
        assert_eq!(fit_cell("Toads of the Bayou", 8).width(), 8);
    }

    #[test]
    fn test_fit_cell_exact_width_is_unmodified() {
        assert_eq!(fit_cell("Alice", 5), "Alice");
    }

    #[test]
    fn test_fit_cell_centers_short_text() {
        assert_eq!(fit_cell("10", 9), "   10    ");
        assert_eq!(fit_cell("", 4), "    ");
    }

    #[test]
    fn test_fit_cell_replaces_control_characters() {
        assert_eq!(fit_cell("a\nb", 3), "a b");
    }

    #[test]
    fn test_fit_cell_wide_characters_keep_width() {
        let fitted = fit_cell("日本語のゲーム", 6);
        assert_eq!(fitted.width(), 6);
        assert!(fitted.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_column_widths_from_header() {
        let header = grid_rows(&[&["name", "score", "x"]]).remove(0);
        assert_eq!(column_widths(&header, 4), vec![8, 9, 5]);
        assert_eq!(column_widths(&header, 0), vec![4, 5, 4]);
    }

    // ------------------------------------------------------------------------
    // Render ops
    // ------------------------------------------------------------------------

    #[test]
    fn test_full_redraw_draws_header_and_rows() {
        let state = SessionState::new(sample_grid(), 10);
        let mut renderer = Renderer::new(Theme::default(), 4);
        let out = render_to_string(&mut renderer, &state, &[RenderOp::FullRedraw]);

        assert!(out.starts_with("\x1b[2J\x1b[1;1H"));
        assert!(out.contains("|  name  |  score  |"));
        assert!(out.contains("\r\n| Alice  |   10    |"));
        assert!(out.contains("\r\n|  Bob   |   20    |"));
        assert!(out.ends_with("\x1b[2;1H"), "cursor parks on the first data row");
        assert_eq!(renderer.column_widths(), [8, 9]);
    }

    #[test]
    fn test_full_redraw_clips_to_viewport() {
        let rows: &[&[&str]] = &[&["h"], &["a"], &["b"], &["c"], &["d"]];
        let mut state = SessionState::new(DataGrid::new(grid_rows(rows)).unwrap(), 2);
        state.viewport.top = 2;
        let out = render_to_string(&mut Renderer::new(Theme::default(), 4), &state, &[RenderOp::FullRedraw]);

        assert!(!out.contains("  a  "));
        assert!(out.contains("  b  "));
        assert!(out.contains("  c  "));
        assert!(!out.contains("  d  "));
    }

    #[test]
    fn test_repaint_plain_row() {
        let state = SessionState::new(sample_grid(), 10);
        let mut renderer = drawn(&state);
        let out = render_to_string(
            &mut renderer,
            &state,
            &[RenderOp::RepaintRow {
                row: 1,
                highlight: Highlight::None,
            }],
        );
        assert_eq!(out, "\r| Alice  |   10    |");
    }

    #[test]
    fn test_repaint_row_highlight_wraps_whole_row() {
        let state = SessionState::new(sample_grid(), 10);
        let mut renderer = drawn(&state);
        let out = render_to_string(
            &mut renderer,
            &state,
            &[RenderOp::RepaintRow {
                row: 2,
                highlight: Highlight::Row,
            }],
        );
        assert_eq!(out, "\r\x1b[48;5;12m\x1b[38;5;0m|  Bob   |   20    |\x1b[0m");
    }

    #[test]
    fn test_repaint_cell_highlight_dims_the_rest() {
        let state = SessionState::new(sample_grid(), 10);
        let mut renderer = drawn(&state);
        let out = render_to_string(
            &mut renderer,
            &state,
            &[RenderOp::RepaintRow {
                row: 1,
                highlight: Highlight::Cell(1),
            }],
        );
        assert_eq!(
            out,
            "\r|\x1b[2m Alice  \x1b[0m|\x1b[48;5;12m\x1b[38;5;0m   10    \x1b[0m|"
        );
    }

    #[test]
    fn test_cursor_moves_use_relative_and_absolute_sequences() {
        let state = SessionState::new(sample_grid(), 10);
        let mut renderer = drawn(&state);
        let out = render_to_string(
            &mut renderer,
            &state,
            &[
                RenderOp::MoveCursorLines(1),
                RenderOp::MoveCursorLines(-2),
                RenderOp::MoveCursorLines(0),
                RenderOp::MoveCursorAbsolute { line: 2, column: 0 },
            ],
        );
        assert_eq!(out, "\x1b[1B\x1b[2A\x1b[3;1H");
    }

    #[test]
    fn test_repaint_of_missing_row_is_skipped() {
        let state = SessionState::new(sample_grid(), 10);
        let mut renderer = drawn(&state);
        let out = render_to_string(
            &mut renderer,
            &state,
            &[
                RenderOp::RepaintRow {
                    row: 0,
                    highlight: Highlight::Row,
                },
                RenderOp::RepaintRow {
                    row: 9,
                    highlight: Highlight::Row,
                },
            ],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_navigation_output_is_independent_of_table_size() {
        let mut small = vec![vec!["name".to_string()]];
        small.extend((0..3).map(|i| vec![format!("game {i}")]));
        let mut large = small.clone();
        large.extend((3..5000).map(|i| vec![format!("game {i}")]));

        let ops = [
            RenderOp::RepaintRow {
                row: 1,
                highlight: Highlight::None,
            },
            RenderOp::MoveCursorLines(1),
            RenderOp::RepaintRow {
                row: 2,
                highlight: Highlight::Row,
            },
        ];
        let lens: Vec<usize> = [small, large]
            .into_iter()
            .map(|rows| {
                let state = SessionState::new(DataGrid::new(rows).unwrap(), 40);
                let mut renderer = drawn(&state);
                render_to_string(&mut renderer, &state, &ops).len()
            })
            .collect();
        assert_eq!(lens[0], lens[1]);
    }
}
