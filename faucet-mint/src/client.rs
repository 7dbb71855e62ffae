//! Upstream mint relay.
//!
//! The coordinator talks to the mint through the [`MintRelay`] trait. This
//! abstraction allows for different implementations:
//! - HTTP client (the production mint service)
//! - Mock client (testing)

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MintError, MintResult};

/// Default relay timeout.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Mint request payload.
#[derive(Debug, Clone, Serialize)]
pub struct MintRequest {
    /// Destination identifier on the target ledger.
    #[serde(rename = "unicityId")]
    pub unicity_id: String,
    /// Token name being minted.
    pub coin: String,
    /// Amount in coin units.
    pub amount: f64,
}

/// Successful relay result.
#[derive(Debug, Clone)]
pub struct MintReceipt {
    /// Upstream transaction id (`data.requestId`, else `txId`, else
    /// `"unknown"`).
    pub tx_id: String,
    /// Raw upstream response body.
    pub response: serde_json::Value,
}

/// Interface for relaying mint requests upstream.
#[async_trait]
pub trait MintRelay: Send + Sync {
    /// Relay a mint request. Must complete or fail within a bounded timeout.
    async fn request_mint(&self, request: &MintRequest) -> MintResult<MintReceipt>;
}

/// HTTP-based mint relay.
pub struct HttpMintClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMintClient {
    /// Create a relay client against `base_url` with the given timeout.
    pub fn new(base_url: &str, timeout: Duration) -> MintResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MintError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl MintRelay for HttpMintClient {
    async fn request_mint(&self, request: &MintRequest) -> MintResult<MintReceipt> {
        let url = format!("{}/api/v1/faucet/request", self.base_url);
        debug!(url = %url, unicity_id = %request.unicity_id, "relaying mint request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| MintError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MintError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MintError::BadResponse(e.to_string()))?;
        let tx_id = extract_tx_id(&body);

        info!(tx_id = %tx_id, unicity_id = %request.unicity_id, "mint relay succeeded");
        Ok(MintReceipt { tx_id, response: body })
    }
}

/// Pull the relay transaction id out of an upstream response body.
pub fn extract_tx_id(body: &serde_json::Value) -> String {
    body.pointer("/data/requestId")
        .and_then(|v| v.as_str())
        .or_else(|| body.get("txId").and_then(|v| v.as_str()))
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tx_id_prefers_data_request_id() {
        let body = json!({"data": {"requestId": "req-1"}, "txId": "tx-2"});
        assert_eq!(extract_tx_id(&body), "req-1");
    }

    #[test]
    fn tx_id_falls_back_to_tx_id_then_unknown() {
        assert_eq!(extract_tx_id(&json!({"txId": "tx-2"})), "tx-2");
        assert_eq!(extract_tx_id(&json!({"ok": true})), "unknown");
    }

    #[test]
    fn mint_request_serializes_camel_case() {
        let request = MintRequest {
            unicity_id: "0xDEAD".to_string(),
            coin: "alpha".to_string(),
            amount: 1.5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"unicityId": "0xDEAD", "coin": "alpha", "amount": 1.5})
        );
    }
}
