//! Workbook ingestion and dataset exports.

pub mod excel_read;
pub mod export;
