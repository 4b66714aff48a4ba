//! Locates a RÉALISATION or PRÉVISIONNEL section inside a sheet and resolves
//! the month labels of its rows.

use chrono::NaiveDate;
use tracing::trace;

use crate::suivi::tools::grid::{CellValue, Grid};
use crate::suivi::tools::labels::{normalize_text, resolve_month_date};

/// Column holding both the section markers and the month labels (B).
pub const MARKER_COLUMN: u32 = 2;
/// Distance from the section marker to the first monthly row. The header row
/// sits just above it.
pub const DATA_ROW_OFFSET: u32 = 3;
/// Every section spans exactly this many monthly rows.
pub const BLOCK_ROW_COUNT: u32 = 4;

/// A located section: its header row plus the rows whose month label
/// resolved to a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub label: String,
    pub header_row: u32,
    pub rows: Vec<(u32, NaiveDate)>,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Looks for the first marker cell matching `label` and collects the dated
/// rows below it. An absent section gives an empty block.
///
/// A row whose month resolves to a date already taken by an earlier row of
/// the block is left out, so each date appears at most once per block.
pub fn locate_block<G: Grid + ?Sized>(grid: &G, label: &str, start_year: i32) -> Block {
    let target = normalize_text(&CellValue::text(label));
    let mut block = Block {
        label: label.to_string(),
        header_row: 0,
        rows: Vec::new(),
    };

    let Some(marker_row) =
        (1..=grid.max_row()).find(|row| normalize_text(grid.cell(*row, MARKER_COLUMN)) == target)
    else {
        return block;
    };

    let first_data_row = marker_row + DATA_ROW_OFFSET;
    block.header_row = first_data_row - 1;

    for row in first_data_row..first_data_row + BLOCK_ROW_COUNT {
        if row > grid.max_row() {
            break;
        }
        match resolve_month_date(grid.cell(row, MARKER_COLUMN), start_year) {
            Some(date) if block.rows.iter().any(|(_, seen)| *seen == date) => {
                trace!(row, label, %date, "row skipped, date already in block");
            }
            Some(date) => block.rows.push((row, date)),
            None => trace!(row, label, "row skipped, no month label"),
        }
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suivi::tools::grid::SheetGrid;

    #[test]
    fn block_starts_three_rows_below_marker() {
        let mut grid = SheetGrid::default();
        grid.set(5, 2, " réalisation ".into());
        grid.set(8, 2, "juin".into());
        grid.set(9, 2, "aout".into());
        grid.set(10, 2, "octobre".into());
        grid.set(11, 2, "début janvier".into());
        grid.set(12, 2, "juin".into());

        let block = locate_block(&grid, "RÉALISATION", 2025);
        assert_eq!(block.header_row, 7);
        let rows: Vec<u32> = block.rows.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![8, 9, 10, 11]);
        assert_eq!(
            block.rows[3].1,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn only_first_marker_is_used() {
        let mut grid = SheetGrid::default();
        grid.set(1, 2, "RÉALISATION".into());
        grid.set(4, 2, "juin".into());
        grid.set(10, 2, "RÉALISATION".into());
        grid.set(13, 2, "août".into());

        let block = locate_block(&grid, "RÉALISATION", 2025);
        assert_eq!(block.header_row, 3);
        assert_eq!(block.rows.len(), 1);
        assert_eq!(block.rows[0].0, 4);
    }

    #[test]
    fn unresolved_rows_are_dropped() {
        let mut grid = SheetGrid::default();
        grid.set(1, 2, "PRÉVISIONNEL".into());
        grid.set(4, 2, "juin".into());
        grid.set(5, 2, CellValue::Number(8.0));
        grid.set(7, 2, "octobre".into());

        let block = locate_block(&grid, "PRÉVISIONNEL", 2025);
        let rows: Vec<u32> = block.rows.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![4, 7]);
    }

    #[test]
    fn untracked_months_are_not_collected() {
        let mut grid = SheetGrid::default();
        grid.set(1, 2, "RÉALISATION".into());
        grid.set(4, 2, "Début janvier".into());
        grid.set(5, 2, "Janvier".into());
        grid.set(6, 2, "Septembre".into());

        let block = locate_block(&grid, "RÉALISATION", 2025);
        assert_eq!(
            block.rows,
            vec![(4, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())]
        );
    }

    #[test]
    fn repeated_dates_keep_the_first_row() {
        let mut grid = SheetGrid::default();
        grid.set(1, 2, "RÉALISATION".into());
        grid.set(4, 2, "Début janvier".into());
        grid.set(5, 2, "debut janvier".into());
        grid.set(6, 2, "Août".into());
        grid.set(7, 2, "aout".into());

        let block = locate_block(&grid, "RÉALISATION", 2025);
        let rows: Vec<u32> = block.rows.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![4, 6]);
    }

    #[test]
    fn marker_label_is_normalised_like_cells() {
        let mut grid = SheetGrid::default();
        grid.set(1, 2, "réalisation".into());
        grid.set(4, 2, "juin".into());

        let block = locate_block(&grid, "  Réalisation\t", 2025);
        assert_eq!(block.header_row, 3);
        assert_eq!(block.rows.len(), 1);
    }

    #[test]
    fn scan_stops_at_sheet_extent() {
        let mut grid = SheetGrid::default();
        grid.set(1, 2, "RÉALISATION".into());
        grid.set(4, 2, "juin".into());
        let block = locate_block(&grid, "RÉALISATION", 2025);
        assert_eq!(grid.max_row(), 4);
        assert_eq!(block.rows.len(), 1);
    }

    #[test]
    fn absent_marker_gives_empty_block() {
        let mut grid = SheetGrid::default();
        grid.set(1, 1, "RÉALISATION".into());
        let block = locate_block(&grid, "RÉALISATION", 2025);
        assert!(block.is_empty());
        assert_eq!(block.header_row, 0);
    }
}
