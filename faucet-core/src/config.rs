//! Faucet configuration.
//!
//! All settings are optional with defaults and can be loaded from
//! environment variables with the FAUCET_ prefix.

use serde::{Deserialize, Serialize};
use std::env;

use crate::address::DEFAULT_HRP;

/// Faucet service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetConfig {
    /// Port the claim API listens on.
    pub port: u16,
    /// Path to the balance database file.
    pub db_path: String,
    /// Base URL of the upstream mint service.
    pub mint_url: String,
    /// Source-chain JSON-RPC endpoint.
    pub rpc_url: String,
    /// Source-chain RPC username.
    pub rpc_user: String,
    /// Source-chain RPC password.
    pub rpc_pass: String,
    /// Allowed CORS origin; `*` allows any origin.
    pub cors_origin: String,
    /// Log level filter (error/warn/info/debug/trace).
    pub log_level: String,
    /// Human-readable prefix of L1 addresses.
    pub hrp: String,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: "faucet.db".to_string(),
            mint_url: "http://127.0.0.1:4000".to_string(),
            rpc_url: "http://127.0.0.1:8332".to_string(),
            rpc_user: String::new(),
            rpc_pass: String::new(),
            cors_origin: "*".to_string(),
            log_level: "info".to_string(),
            hrp: DEFAULT_HRP.to_string(),
        }
    }
}

impl FaucetConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - FAUCET_PORT: claim API port
    /// - FAUCET_DB_PATH: balance database path
    /// - FAUCET_MINT_URL: upstream mint base URL
    /// - FAUCET_RPC_URL: source-chain RPC endpoint
    /// - FAUCET_RPC_USER / FAUCET_RPC_PASS: RPC credentials
    /// - FAUCET_CORS_ORIGIN: allowed CORS origin
    /// - FAUCET_LOG_LEVEL: log level filter
    /// - FAUCET_HRP: L1 address prefix
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("FAUCET_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            db_path: env::var("FAUCET_DB_PATH").unwrap_or(defaults.db_path),
            mint_url: env::var("FAUCET_MINT_URL").unwrap_or(defaults.mint_url),
            rpc_url: env::var("FAUCET_RPC_URL").unwrap_or(defaults.rpc_url),
            rpc_user: env::var("FAUCET_RPC_USER").unwrap_or(defaults.rpc_user),
            rpc_pass: env::var("FAUCET_RPC_PASS").unwrap_or(defaults.rpc_pass),
            cors_origin: env::var("FAUCET_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            log_level: env::var("FAUCET_LOG_LEVEL").unwrap_or(defaults.log_level),
            hrp: env::var("FAUCET_HRP").unwrap_or(defaults.hrp),
        }
    }
}
