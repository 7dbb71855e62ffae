//! Claim error hierarchy.
//!
//! Every failure of the claim pipeline is one of these kinds; each kind
//! carries the HTTP status the API layer maps it to. The API crate performs
//! the JSON envelope conversion in one place.

use thiserror::Error;

/// Errors produced by the claim pipeline.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// Request shape, amount, or destination failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Address codec checks failed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Signature hex, length, range, low-S, or recovery-tag parse failed.
    #[error("bad signature: {0}")]
    BadSignature(String),

    /// The recovered key does not rederive the claimed address.
    #[error("signature does not match address: recovered {derived}, claimed {claimed}")]
    AddressMismatch { derived: String, claimed: String },

    /// Defense-in-depth ECDSA verify failed after a successful recovery.
    #[error("signature failed consistency check")]
    MathCheckFailed,

    /// Address absent from the snapshot.
    #[error("address not found in snapshot: {0}")]
    NotFound(String),

    /// Requested amount differs from the snapshot balance.
    #[error("amount mismatch: requested {requested}, available {available}")]
    AmountMismatch { requested: u64, available: u64 },

    /// The balance row was already consumed (including lost races).
    #[error("address has already been claimed")]
    AlreadyConsumed { destination_id: Option<String> },

    /// The upstream mint relay timed out or returned a non-success status.
    #[error("upstream mint failed: {0}")]
    UpstreamFailure(String),

    /// Persistence-layer failure.
    #[error("storage failure: {0}")]
    StoreFailure(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClaimError {
    /// HTTP status associated with this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            ClaimError::InvalidInput(_)
            | ClaimError::InvalidAddress(_)
            | ClaimError::BadSignature(_)
            | ClaimError::AddressMismatch { .. }
            | ClaimError::MathCheckFailed
            | ClaimError::AmountMismatch { .. } => 400,
            ClaimError::NotFound(_) => 404,
            ClaimError::AlreadyConsumed { .. } => 409,
            ClaimError::UpstreamFailure(_) => 502,
            ClaimError::StoreFailure(_) | ClaimError::Internal(_) => 500,
        }
    }

    /// User-safe message. Internal and storage details are not exposed.
    pub fn user_message(&self) -> String {
        match self {
            ClaimError::StoreFailure(_) => "storage failure".to_string(),
            ClaimError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result alias for claim operations.
pub type ClaimResult<T> = Result<T, ClaimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_kind() {
        assert_eq!(ClaimError::InvalidInput("x".into()).http_status(), 400);
        assert_eq!(ClaimError::NotFound("a".into()).http_status(), 404);
        assert_eq!(
            ClaimError::AlreadyConsumed {
                destination_id: None
            }
            .http_status(),
            409
        );
        assert_eq!(ClaimError::UpstreamFailure("x".into()).http_status(), 502);
        assert_eq!(ClaimError::StoreFailure("x".into()).http_status(), 500);
    }

    #[test]
    fn internal_detail_is_not_user_visible() {
        let err = ClaimError::StoreFailure("disk I/O error at page 7".into());
        assert_eq!(err.user_message(), "storage failure");
    }
}
