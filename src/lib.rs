//! Superstore Sales Analysis
//!
//! Loads a retail transactions CSV with Polars, cleans it, computes grouped
//! sales summaries, renders static charts with plotters and prints a text
//! report.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::{AnalysisConfig, ChartStyle};
pub use error::{AnalysisError, Result};
pub use pipeline::{analyze, run};
pub use report::{Report, Reporter};
