//! API error conversion.
//!
//! The single place where a claim error kind becomes an HTTP status and a
//! JSON envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faucet_core::ClaimError;
use serde::Serialize;

/// API-level error wrapper around the claim error hierarchy.
#[derive(Debug)]
pub struct ApiError(pub ClaimError);

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            success: false,
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        Self(err)
    }
}

impl From<faucet_db::StoreError> for ApiError {
    fn from(err: faucet_db::StoreError) -> Self {
        Self(ClaimError::StoreFailure(err.to_string()))
    }
}

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;
