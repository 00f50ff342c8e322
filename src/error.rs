//! Error Module
//! Single error type shared by every pipeline stage.

use polars::prelude::PolarsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot access '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing required column '{0}'")]
    Schema(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("chart rendering failed: {0}")]
    Render(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
