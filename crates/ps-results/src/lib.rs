//! ps-results: time-series record types and exporters.

pub mod export;
pub mod types;

pub use export::{CSV_HEADER, write_csv, write_json};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame index {index} out of range (len={len})")]
    FrameOutOfRange { index: usize, len: usize },
}
