//! Local page cache and search log.

mod operations;
mod schema;

pub use operations::Store;

use thiserror::Error;

/// Errors returned by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid limit {0}: must be greater than zero")]
    InvalidLimit(i64),

    #[error("invalid timestamp {value:?} in database: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("invalid page expiration time {value:?}: {source}")]
    Expiration {
        value: String,
        source: lookup_common::DurationError,
    },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
