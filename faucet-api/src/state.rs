//! Application state for the API server.

use std::sync::Arc;

use faucet_db::BalanceStore;
use faucet_mint::MintRelay;

use crate::claim::ClaimService;

/// API server state.
#[derive(Clone)]
pub struct AppState {
    /// Claim coordinator.
    pub claims: Arc<ClaimService>,
    /// Balance store (read paths: balance lookup, stats).
    pub store: Arc<BalanceStore>,
    /// L1 address prefix.
    pub hrp: String,
    /// Service version.
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<BalanceStore>, mint: Arc<dyn MintRelay>, hrp: &str) -> Self {
        let claims = Arc::new(ClaimService::new(store.clone(), mint, hrp));
        Self {
            claims,
            store,
            hrp: hrp.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; `*` allows any origin.
    pub cors_origin: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: "*".to_string(),
        }
    }
}
