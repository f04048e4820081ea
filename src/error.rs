//! Error types for packrat

use thiserror::Error;

/// Result type alias for packrat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in packrat operations
///
/// Empty keys or payloads passed to [`BlobStore::set`](crate::BlobStore::set)
/// and lookups of absent keys are not errors; those surface as `Ok(false)` or
/// `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i32),

    #[error("Invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("{0} trailing bytes after decoding")]
    TrailingBytes(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}
