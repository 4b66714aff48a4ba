//! Label normalisation and the fixed lookup tables used to recognise month
//! rows and measurement columns.

use chrono::NaiveDate;

use crate::suivi::tools::grid::{CellValue, Temporal};
use crate::suivi::tools::model::Measure;

/// First month of the tracking season. Earlier months belong to the
/// following calendar year.
pub const SEASON_FIRST_MONTH: u32 = 6;

/// Month labels as typed in the sheets, accents optional. Only the four
/// tracked checkpoints are recognised; any other label leaves its row out.
const MONTHS: &[(&str, u32)] = &[
    ("juin", 6),
    ("aout", 8),
    ("août", 8),
    ("octobre", 10),
    ("debut janvier", 1),
    ("début janvier", 1),
];

const HEADERS: &[(&str, Measure)] = &[
    ("dips", Measure::Dips),
    ("pompes", Measure::Pompes),
    ("traction pronation", Measure::TractionPro),
    ("traction supination", Measure::TractionSup),
    ("planche (min)", Measure::PlancheSec),
    ("superman (min)", Measure::SupermanSec),
    ("100 m (sec)", Measure::Sprint100mSec),
    ("5 km (min)", Measure::Run5kmSec),
    ("poids (kg)", Measure::Poids),
];

/// Renders a cell as text, the way it would read in the sheet.
///
/// Returns `None` for empty cells. Whole numbers render without a fractional
/// part.
pub fn cell_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Bool(flag) => Some(flag.to_string()),
        CellValue::Number(number) => Some(number.to_string()),
        CellValue::Text(text) => Some(text.clone()),
        CellValue::Temporal(Temporal::DateTime(moment)) => {
            Some(moment.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        CellValue::Temporal(Temporal::TimeOfDay(time)) => Some(time.format("%H:%M:%S").to_string()),
        CellValue::Temporal(Temporal::Duration(delta)) => {
            let total = delta.num_seconds();
            Some(format!(
                "{}:{:02}:{:02}",
                total / 3600,
                (total % 3600) / 60,
                total % 60
            ))
        }
    }
}

/// Trimmed, lower-cased text of a cell; empty cells normalise to `""`.
pub fn normalize_text(value: &CellValue) -> String {
    cell_text(value)
        .map(|text| text.trim().to_lowercase())
        .unwrap_or_default()
}

/// Month number for a normalised label.
pub fn month_number(label: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, month)| *month)
}

/// Canonical measurement for a normalised column header.
pub fn header_measure(label: &str) -> Option<Measure> {
    HEADERS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, measure)| *measure)
}

/// Resolves a month label to the first day of that month within the season
/// starting in `start_year`.
pub fn resolve_month_date(value: &CellValue, start_year: i32) -> Option<NaiveDate> {
    let month = month_number(&normalize_text(value))?;
    let year = if month >= SEASON_FIRST_MONTH {
        start_year
    } else {
        start_year + 1
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[test]
    fn normalisation_trims_and_lowercases() {
        assert_eq!(normalize_text(&CellValue::text("  RÉALISATION ")), "réalisation");
        assert_eq!(normalize_text(&CellValue::Empty), "");
        assert_eq!(normalize_text(&CellValue::Number(3.0)), "3");
        assert_eq!(normalize_text(&CellValue::Bool(true)), "true");
    }

    #[test]
    fn months_wrap_into_next_year() {
        assert_eq!(resolve_month_date(&"Juin".into(), 2025), Some(date(2025, 6)));
        assert_eq!(resolve_month_date(&" août".into(), 2025), Some(date(2025, 8)));
        assert_eq!(resolve_month_date(&"Aout".into(), 2025), Some(date(2025, 8)));
        assert_eq!(resolve_month_date(&"Octobre".into(), 2025), Some(date(2025, 10)));
        assert_eq!(
            resolve_month_date(&"Début janvier".into(), 2025),
            Some(date(2026, 1))
        );
        assert_eq!(
            resolve_month_date(&"debut janvier".into(), 2030),
            Some(date(2031, 1))
        );
    }

    #[test]
    fn unknown_month_labels_do_not_resolve() {
        assert_eq!(resolve_month_date(&"Semaine 1".into(), 2025), None);
        assert_eq!(resolve_month_date(&CellValue::Empty, 2025), None);
        assert_eq!(resolve_month_date(&CellValue::Number(6.0), 2025), None);
    }

    #[test]
    fn untracked_months_do_not_resolve() {
        for label in ["Janvier", "septembre", "Juillet", "décembre", "mai"] {
            assert_eq!(resolve_month_date(&label.into(), 2025), None, "{label}");
        }
    }

    #[test]
    fn headers_map_to_canonical_fields() {
        assert_eq!(header_measure("dips"), Some(Measure::Dips));
        assert_eq!(header_measure("5 km (min)"), Some(Measure::Run5kmSec));
        assert_eq!(header_measure("100 m (sec)"), Some(Measure::Sprint100mSec));
        assert_eq!(header_measure("poids (kg)"), Some(Measure::Poids));
        assert_eq!(header_measure("remarques"), None);
    }
}
