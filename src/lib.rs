//! Core library for the suivi-tools command line application.
//!
//! The library turns a loosely laid out fitness-tracking workbook (one sheet
//! per person) into a flat, typed record set. Cell coercion lives in
//! [`suivi::tools::coerce`], label tables in [`suivi::tools::labels`], block
//! detection and per-sheet extraction under [`suivi::tools::extract`], the
//! cross-series rules in [`suivi::tools::reconcile`], workbook and export
//! adapters under [`suivi::tools::io`], the end-to-end run in
//! [`suivi::tools::pipeline`], and progression statistics over the result in
//! [`suivi::tools::analytics`].

pub mod suivi;

pub use suivi::tools::{
    Result, ToolError, analytics, coerce, error, extract, grid, io, labels, model, pipeline, reconcile,
};
