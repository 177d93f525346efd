//! Error types for the tickdex engine.

use thiserror::Error;
use tickdex_core::CoreError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while loading data, answering queries or writing reports.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed request line or unserializable response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad timestamp, date or record field.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The index manager has no index for the requested projection.
    #[error("index not found: {0}")]
    IndexNotFound(&'static str),
}
