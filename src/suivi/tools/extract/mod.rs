//! Turns one person's sheet into normalized records.
//!
//! A sheet holds one block per series. Each block starts with a marker cell in
//! the second column (`RÉALISATION`, `PRÉVISIONNEL`), followed by a header row
//! naming the measurements and a fixed run of monthly rows.

mod block;

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::suivi::tools::coerce::{coerce_duration, coerce_number};
use crate::suivi::tools::grid::Grid;
use crate::suivi::tools::labels::{cell_text, header_measure, normalize_text};
use crate::suivi::tools::model::{Measure, Record, SeriesType};

pub use block::{BLOCK_ROW_COUNT, Block, DATA_ROW_OFFSET, MARKER_COLUMN, locate_block};

/// Columns scanned for measurement headers (C through K).
pub const HEADER_COLUMNS: std::ops::RangeInclusive<u32> = 3..=11;

/// Label of the cell whose right-hand neighbour holds the annotation.
pub const GAGE_LABEL: &str = "gage";

/// Series looked for on every sheet, in extraction order.
const SERIES: [SeriesType; 2] = [SeriesType::Realisation, SeriesType::Previsionnel];

/// Maps header columns to the measurement they hold. Unknown headers are
/// ignored.
pub fn map_headers<G: Grid + ?Sized>(grid: &G, header_row: u32) -> BTreeMap<u32, Measure> {
    HEADER_COLUMNS
        .filter_map(|column| {
            let label = normalize_text(grid.cell(header_row, column));
            header_measure(&label).map(|measure| (column, measure))
        })
        .collect()
}

/// Extracts every dated row of both series blocks.
pub fn extract_sheet_records<G: Grid + ?Sized>(
    grid: &G,
    person: &str,
    start_year: i32,
) -> Vec<Record> {
    let mut records = Vec::new();

    for series in SERIES {
        let block = locate_block(grid, series.section_label(), start_year);
        if block.is_empty() {
            trace!(person, %series, "section not present");
            continue;
        }

        let headers = map_headers(grid, block.header_row);
        debug!(
            person,
            %series,
            header_row = block.header_row,
            rows = block.rows.len(),
            columns = headers.len(),
            "located block"
        );

        for (row, date) in &block.rows {
            let mut record = Record::new(person, *date, series);
            for (column, measure) in &headers {
                let cell = grid.cell(*row, *column);
                let value = if measure.is_duration() {
                    coerce_duration(cell)
                } else {
                    coerce_number(cell)
                };
                record.set(*measure, value);
            }
            records.push(record);
        }
    }

    records
}

/// Finds the first `gage` label, scanning row by row, and returns the trimmed
/// text to its right.
pub fn extract_meta<G: Grid + ?Sized>(grid: &G) -> Option<String> {
    for row in 1..=grid.max_row() {
        for column in 1..=grid.max_column() {
            if normalize_text(grid.cell(row, column)) == GAGE_LABEL {
                return cell_text(grid.cell(row, column + 1))
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty());
            }
        }
    }
    None
}
