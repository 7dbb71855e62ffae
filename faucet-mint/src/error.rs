//! Mint relay error types.

use thiserror::Error;

/// Upstream mint relay errors.
#[derive(Error, Debug)]
pub enum MintError {
    /// Could not reach the mint service (connect failure or timeout).
    #[error("mint connection failed: {0}")]
    Connection(String),

    /// The mint returned a non-success HTTP status.
    #[error("mint returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// The mint response body was not valid JSON.
    #[error("mint response malformed: {0}")]
    BadResponse(String),
}

/// Result alias for mint relay operations.
pub type MintResult<T> = Result<T, MintError>;
