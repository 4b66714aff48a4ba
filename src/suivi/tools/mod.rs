pub mod analytics;
pub mod coerce;
pub mod error;
pub mod extract;
pub mod grid;
pub mod io;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod reconcile;

pub use error::{Result, ToolError};
