//! Error types for the SQLite catalog.

use metabridge_query::CatalogError;
use thiserror::Error;

/// Native catalog error codes.
pub mod codes {
    /// SQL execution failed.
    pub const CAT_SQL_ERR: i32 = -806_000;
    /// No matching path, AVU or cursor.
    pub const CAT_NO_ROWS_FOUND: i32 = -808_000;
    /// The item already exists.
    pub const CAT_ALREADY_EXISTS: i32 = -809_000;
    /// The request cannot be expressed against this catalog.
    pub const CAT_INVALID_ARGUMENT: i32 = -816_000;
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Path, AVU or cursor not found.
    #[error("{0}")]
    NotFound(String),

    /// Item already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Malformed request.
    #[error("{0}")]
    InvalidArgument(String),
}

impl StoreError {
    pub fn code(&self) -> i32 {
        match self {
            Self::Database(_) => codes::CAT_SQL_ERR,
            Self::NotFound(_) => codes::CAT_NO_ROWS_FOUND,
            Self::AlreadyExists(_) => codes::CAT_ALREADY_EXISTS,
            Self::InvalidArgument(_) => codes::CAT_INVALID_ARGUMENT,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::new(err.code(), err.to_string())
    }
}
