//! Total conversions from raw cells to canonical scalars.
//!
//! None of these functions fail: anything that cannot be read as the wanted
//! shape is treated as a missing measurement.

use chrono::Timelike;

use crate::suivi::tools::grid::{CellValue, Temporal};

/// Tokens that mark a measurement as not recorded, compared after trimming
/// and lower-casing.
const MISSING_MARKERS: &[&str] = &["", "x", "na", "n/a", "none", "null", "-"];

fn is_missing_marker(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    MISSING_MARKERS.contains(&lowered.as_str())
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Reads a plain number. Decimal commas are accepted.
pub fn coerce_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty | CellValue::Bool(_) | CellValue::Temporal(_) => None,
        CellValue::Number(number) => finite(*number),
        CellValue::Text(text) => {
            let raw = text.trim();
            if is_missing_marker(raw) {
                return None;
            }
            raw.replace(',', ".").parse::<f64>().ok().and_then(finite)
        }
    }
}

/// Reads a duration in seconds, rounded to the millisecond.
///
/// Numbers are taken as seconds already and pass through untouched. Text is
/// either a bare decimal or `mm:ss` / `hh:mm:ss`.
pub fn coerce_duration(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty | CellValue::Bool(_) => None,
        CellValue::Number(number) => finite(*number),
        CellValue::Temporal(Temporal::Duration(delta)) => {
            let millis = delta.num_milliseconds() as f64;
            Some(round_millis(millis / 1000.0))
        }
        CellValue::Temporal(Temporal::DateTime(moment)) => Some(time_of_day_seconds(&moment.time())),
        CellValue::Temporal(Temporal::TimeOfDay(time)) => Some(time_of_day_seconds(time)),
        CellValue::Text(text) => parse_duration_text(text.trim()),
    }
}

fn time_of_day_seconds<T: Timelike>(time: &T) -> f64 {
    let whole = f64::from(time.hour() * 3600 + time.minute() * 60 + time.second());
    let fraction = f64::from(time.nanosecond() % 1_000_000_000) / 1_000_000_000.0;
    round_millis(whole + fraction)
}

fn is_bare_decimal(raw: &str) -> bool {
    let (integer, fraction) = match raw.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (raw, None),
    };
    let digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    digits(integer) && fraction.is_none_or(digits)
}

fn parse_duration_text(raw: &str) -> Option<f64> {
    if is_missing_marker(raw) {
        return None;
    }
    if is_bare_decimal(raw) {
        return raw.parse::<f64>().ok().and_then(finite);
    }

    let parts = raw
        .split(':')
        .map(|part| part.trim().parse::<f64>().ok().and_then(finite))
        .collect::<Option<Vec<f64>>>()?;

    match parts.as_slice() {
        [minutes, seconds] => Some(round_millis(minutes * 60.0 + seconds)),
        [hours, minutes, seconds] => Some(round_millis(hours * 3600.0 + minutes * 60.0 + seconds)),
        _ => None,
    }
}
