//! End-to-end extraction: finds the workbook, turns every sheet into records
//! and metadata, reconciles the two series and writes the exports.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::suivi::tools::error::{Result, ToolError};
use crate::suivi::tools::extract::{extract_meta, extract_sheet_records};
use crate::suivi::tools::grid::Grid;
use crate::suivi::tools::io::excel_read::{self, WorkbookSheet};
use crate::suivi::tools::io::export::{self, ExportPaths};
use crate::suivi::tools::model::{Dataset, PersonMeta};
use crate::suivi::tools::reconcile::reconcile;

/// Calendar year in which the default tracking season starts.
pub const DEFAULT_START_YEAR: i32 = 2025;
/// Extension of the workbooks picked up by discovery.
pub const WORKBOOK_EXTENSION: &str = "xlsx";

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Year of the first tracked month; months before June roll into the next year.
    pub start_year: i32,
    /// Directory searched for the workbook.
    pub input_dir: PathBuf,
    /// Directory receiving the exports.
    pub output_dir: PathBuf,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("data"),
        }
    }
}

/// What a completed run read and wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub workbook: PathBuf,
    pub outputs: ExportPaths,
    pub record_count: usize,
    pub person_count: usize,
    /// The exported dataset, kept for reporting.
    pub dataset: Dataset,
}

/// Picks the first `.xlsx` file of `dir`, by file name.
pub fn discover_workbook(dir: &Path) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_workbook = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case(WORKBOOK_EXTENSION));
        if is_workbook && entry.file_type()?.is_file() {
            candidates.push(path);
        }
    }

    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ToolError::WorkbookNotFound(dir.to_path_buf()))
}

/// Extracts, merges, reconciles and sorts the records of every sheet.
///
/// Each sheet is one person, named after its tab.
pub fn build_dataset<'a, G, I>(sheets: I, start_year: i32) -> Dataset
where
    G: Grid + ?Sized + 'a,
    I: IntoIterator<Item = (&'a str, &'a G)>,
{
    let mut dataset = Dataset::default();

    for (person, grid) in sheets {
        let records = extract_sheet_records(grid, person, start_year);
        let gage = extract_meta(grid);
        debug!(person, records = records.len(), has_gage = gage.is_some(), "extracted sheet");
        dataset.records.extend(records);
        dataset.people.push(PersonMeta::new(person, gage));
    }

    reconcile(&mut dataset.records);
    dataset.sort();
    dataset
}

/// Reads a workbook and builds its dataset.
#[instrument(level = "info", skip_all, fields(workbook = %path.display(), start_year = start_year))]
pub fn extract_workbook(path: &Path, start_year: i32) -> Result<Dataset> {
    let sheets: Vec<WorkbookSheet> = excel_read::read_sheets(path)?;
    info!(sheet_count = sheets.len(), "read workbook");
    let dataset = build_dataset(
        sheets
            .iter()
            .map(|sheet| (sheet.name.as_str(), &sheet.grid)),
        start_year,
    );
    info!(
        record_count = dataset.records.len(),
        person_count = dataset.people.len(),
        "dataset assembled"
    );
    Ok(dataset)
}

/// Runs the whole extraction: discovery, extraction, reconciliation and export.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %config.input_dir.display(), output = %config.output_dir.display())
)]
pub fn run(config: &ExtractConfig) -> Result<RunSummary> {
    let workbook = discover_workbook(&config.input_dir)?;
    info!(workbook = %workbook.display(), "using workbook");
    let dataset = extract_workbook(&workbook, config.start_year)?;
    let outputs = export::write_dataset(&config.output_dir, &dataset)?;

    Ok(RunSummary {
        workbook,
        outputs,
        record_count: dataset.records.len(),
        person_count: dataset.people.len(),
        dataset,
    })
}
