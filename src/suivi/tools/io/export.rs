//! Rendering and writing of the three exports: the record table as CSV, the
//! same records as JSON, and the per-person metadata as JSON. The optional
//! statistics report is rendered here too.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::{debug, instrument};

use crate::suivi::tools::analytics::Overview;
use crate::suivi::tools::error::{Result, ToolError};
use crate::suivi::tools::model::{Dataset, OUTPUT_COLUMNS, PersonMeta, Record};

/// File name of the tabular export.
pub const RECORDS_CSV: &str = "clean_data.csv";
/// File name of the structured export.
pub const RECORDS_JSON: &str = "clean_data.json";
/// File name of the per-person metadata export.
pub const PEOPLE_JSON: &str = "people_meta.json";

/// Locations of the files produced by [`write_dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub records_csv: PathBuf,
    pub records_json: PathBuf,
    pub people_json: PathBuf,
}

impl ExportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            records_csv: dir.join(RECORDS_CSV),
            records_json: dir.join(RECORDS_JSON),
            people_json: dir.join(PEOPLE_JSON),
        }
    }
}

/// Renders the records as CSV. The header row is always present, missing
/// measurements are empty fields.
pub fn records_to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|error| ToolError::Io(error.into_error()))
}

/// Renders the records as a pretty-printed JSON array, keeping explicit nulls.
pub fn records_to_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn people_to_json(people: &[PersonMeta]) -> Result<String> {
    Ok(serde_json::to_string_pretty(people)?)
}

/// Renders the statistics report as pretty-printed JSON.
pub fn overview_to_json(overview: &Overview) -> Result<String> {
    Ok(serde_json::to_string_pretty(overview)?)
}

/// Writes all three exports into `dir`, creating it when needed.
///
/// Everything is rendered before the first file is touched, so a rendering
/// failure leaves the directory as it was.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<ExportPaths> {
    let csv = records_to_csv(&dataset.records)?;
    let json = records_to_json(&dataset.records)?;
    let people = people_to_json(&dataset.people)?;

    let paths = ExportPaths::in_dir(dir);
    fs::create_dir_all(dir)?;
    fs::write(&paths.records_csv, csv)?;
    fs::write(&paths.records_json, json)?;
    fs::write(&paths.people_json, people)?;
    debug!(
        records = dataset.records.len(),
        people = dataset.people.len(),
        "exports written"
    );

    Ok(paths)
}
