//! API route handlers.

pub mod faucet;
pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/faucet/balance/:addr", get(faucet::get_balance))
        .route("/api/v1/faucet/request", post(faucet::request_claim))
        .route("/api/v1/faucet/stats", get(faucet::get_stats))
        .with_state(state)
}
