//! Spreadsheet access as seen by the extraction engine.
//!
//! The reader hands back loosely typed cells. They are folded into the closed
//! [`CellValue`] variant once, at the ingestion boundary, so that every coercer
//! can match on it exhaustively.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// Native temporal cell content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temporal {
    /// A calendar date with a time of day.
    DateTime(NaiveDateTime),
    /// A bare time of day.
    TimeOfDay(NaiveTime),
    /// An elapsed duration.
    Duration(TimeDelta),
}

/// A raw cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Temporal(Temporal),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<Temporal> for CellValue {
    fn from(value: Temporal) -> Self {
        CellValue::Temporal(value)
    }
}

/// Read-only, 1-based access to a worksheet.
pub trait Grid {
    /// Last row holding data (0 when the sheet is empty).
    fn max_row(&self) -> u32;

    /// Last column holding data (0 when the sheet is empty).
    fn max_column(&self) -> u32;

    /// Cell at the given 1-based position. Positions outside the extent read
    /// as [`CellValue::Empty`].
    fn cell(&self, row: u32, column: u32) -> &CellValue;
}

static EMPTY: CellValue = CellValue::Empty;

/// Dense in-memory worksheet anchored at A1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
    width: u32,
}

impl SheetGrid {
    /// Builds a grid from row-major cells. Rows may have different lengths.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        Self { rows, width }
    }

    /// Stores a value at a 1-based position, growing the grid if needed.
    pub fn set(&mut self, row: u32, column: u32, value: CellValue) {
        if row == 0 || column == 0 {
            return;
        }
        let (r, c) = ((row - 1) as usize, (column - 1) as usize);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize(c + 1, CellValue::Empty);
        }
        cells[c] = value;
        self.width = self.width.max(column);
    }
}

impl Grid for SheetGrid {
    fn max_row(&self) -> u32 {
        self.rows.len() as u32
    }

    fn max_column(&self) -> u32 {
        self.width
    }

    fn cell(&self, row: u32, column: u32) -> &CellValue {
        if row == 0 || column == 0 {
            return &EMPTY;
        }
        self.rows
            .get((row - 1) as usize)
            .and_then(|cells| cells.get((column - 1) as usize))
            .unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_cells_read_as_empty() {
        let grid = SheetGrid::from_rows(vec![vec!["a".into()], vec!["b".into(), 2.0.into()]]);
        assert_eq!(grid.max_row(), 2);
        assert_eq!(grid.max_column(), 2);
        assert_eq!(grid.cell(1, 2), &CellValue::Empty);
        assert_eq!(grid.cell(0, 1), &CellValue::Empty);
        assert_eq!(grid.cell(9, 9), &CellValue::Empty);
        assert_eq!(grid.cell(2, 2), &CellValue::Number(2.0));
    }

    #[test]
    fn set_grows_the_grid() {
        let mut grid = SheetGrid::default();
        grid.set(3, 4, CellValue::text("x"));
        assert_eq!(grid.max_row(), 3);
        assert_eq!(grid.max_column(), 4);
        assert_eq!(grid.cell(3, 4), &CellValue::text("x"));
    }
}
