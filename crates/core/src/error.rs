//! Error types for tickdex core.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while interpreting record fields.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Timestamp did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// Date did not match `YYYY-MM-DD`.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// Record type tag other than STOCK or CRYPTO.
    #[error("unknown record type: {0:?}")]
    UnknownRecordType(String),

    /// Epoch seconds outside the 32-bit key space.
    #[error("timestamp {0} does not fit in a 32-bit key")]
    KeyOutOfRange(i64),
}
