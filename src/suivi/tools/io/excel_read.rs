use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

use crate::suivi::tools::error::{Result, ToolError};
use crate::suivi::tools::grid::{CellValue, SheetGrid, Temporal};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A worksheet and the tab name it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookSheet {
    pub name: String,
    pub grid: SheetGrid,
}

/// Reads every worksheet of the workbook, in tab order.
pub fn read_sheets(path: &Path) -> Result<Vec<WorkbookSheet>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = read_required_sheet(&mut workbook, &name)?;
        let grid = range_to_grid(&range);
        debug!(sheet = %name, rows = range.height(), columns = range.width(), "read sheet");
        sheets.push(WorkbookSheet { name, grid });
    }

    Ok(sheets)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Re-anchors a calamine range at A1 so that grid positions match the sheet.
pub fn range_to_grid(range: &Range<DataType>) -> SheetGrid {
    let mut grid = SheetGrid::default();
    let Some((start_row, start_column)) = range.start() else {
        return grid;
    };

    for (row_offset, row) in range.rows().enumerate() {
        for (column_offset, cell) in row.iter().enumerate() {
            let value = cell_value(cell);
            if value.is_empty() {
                continue;
            }
            let row_index = start_row + row_offset as u32 + 1;
            let column_index = start_column + column_offset as u32 + 1;
            grid.set(row_index, column_index, value);
        }
    }

    grid
}

/// Folds a calamine cell into the closed [`CellValue`] variant.
pub fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Error(error) => CellValue::Text(error.to_string()),
        DataType::DateTime(serial) => serial_to_temporal(*serial)
            .map(CellValue::Temporal)
            .unwrap_or(CellValue::Number(*serial)),
        DataType::Duration(days) => millis(days * MILLIS_PER_DAY)
            .map(|delta| CellValue::Temporal(Temporal::Duration(delta)))
            .unwrap_or(CellValue::Number(*days)),
        DataType::DateTimeIso(text) => parse_iso_temporal(text)
            .map(CellValue::Temporal)
            .unwrap_or_else(|| CellValue::Text(text.clone())),
        DataType::DurationIso(text) => parse_iso_duration(text)
            .map(|delta| CellValue::Temporal(Temporal::Duration(delta)))
            .unwrap_or_else(|| CellValue::Text(text.clone())),
    }
}

fn millis(value: f64) -> Option<TimeDelta> {
    if !value.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds(value.round() as i64)
}

/// Excel serial dates count days from 1899-12-30; the fraction is the time
/// of day. Serials below one carry only a time.
fn serial_to_temporal(serial: f64) -> Option<Temporal> {
    let delta = millis(serial * MILLIS_PER_DAY)?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let moment = epoch.checked_add_signed(delta)?;
    if (0.0..1.0).contains(&serial) {
        Some(Temporal::TimeOfDay(moment.time()))
    } else {
        Some(Temporal::DateTime(moment))
    }
}

fn parse_iso_temporal(text: &str) -> Option<Temporal> {
    let text = text.trim().trim_end_matches('Z');
    if let Ok(moment) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Temporal::DateTime(moment));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(Temporal::DateTime);
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .ok()
        .map(Temporal::TimeOfDay)
}

/// Parses the `PnDTnHnMnS` subset of ISO-8601 durations.
fn parse_iso_duration(text: &str) -> Option<TimeDelta> {
    let body = text.trim().strip_prefix('P')?;
    let (date_part, time_part) = body.split_once('T').unwrap_or((body, ""));

    let mut seconds = 0.0;
    let sections: [(&str, &[(char, f64)]); 2] = [
        (date_part, &[('D', 86_400.0)]),
        (time_part, &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)]),
    ];
    for (part, units) in sections {
        let mut number = String::new();
        for ch in part.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                number.push(ch);
                continue;
            }
            let (_, factor) = units.iter().find(|(unit, _)| *unit == ch)?;
            seconds += number.parse::<f64>().ok()? * factor;
            number.clear();
        }
        if !number.is_empty() {
            return None;
        }
    }

    millis(seconds * 1000.0)
}
