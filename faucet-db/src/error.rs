//! Store error types.

use thiserror::Error;

/// Balance store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The target database file already exists (snapshot one-shot guard).
    #[error("database file already exists: {0}")]
    PathExists(String),

    /// A balance batch contained an address that is already present.
    #[error("duplicate address in balance batch")]
    DuplicateAddress,

    /// The snapshot metadata singleton was already written.
    #[error("snapshot metadata already written")]
    MetaExists,

    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
