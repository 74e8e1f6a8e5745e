use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record {record} ('{title}'): missing score field '{field}'")]
    MissingField {
        record: usize,
        title: String,
        field: String,
    },

    #[error("record {record} ('{title}'): field '{field}' has non-numeric value '{value}'")]
    InvalidField {
        record: usize,
        title: String,
        field: String,
        value: String,
    },

    #[error("no records found in '{path}'", path = path.display())]
    EmptyInput { path: PathBuf },

    #[error("cannot evaluate an empty signal")]
    EmptySignal,

    #[error("signal length {signal} does not match label length {labels}")]
    LengthMismatch { signal: usize, labels: usize },

    #[error("invalid line grammar pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to render '{path}': {message}", path = path.display())]
    Render { path: PathBuf, message: String },

    #[error("failed to write table: {0}")]
    Table(#[from] polars::error::PolarsError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a plotting backend failure for the figure at `path`.
    pub fn render(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        EvalError::Render {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
