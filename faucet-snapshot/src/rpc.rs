//! Source-chain JSON-RPC client.
//!
//! The snapshot builder reads the chain through the [`ChainSource`] trait so
//! tests can substitute an in-memory chain. [`HttpChainRpc`] is the
//! production implementation: JSON-RPC 2.0 over HTTP with optional Basic
//! auth, as served by Bitcoin-style nodes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SnapshotError, SnapshotResult};

/// Chain RPC connection settings.
#[derive(Debug, Clone)]
pub struct ChainRpcConfig {
    /// RPC endpoint URL.
    pub url: String,
    /// RPC username (empty disables auth).
    pub username: String,
    /// RPC password.
    pub password: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ChainRpcConfig {
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            timeout_secs: 120,
        }
    }
}

/// One unspent output from a whole-UTXO-set scan.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanUtxo {
    pub txid: String,
    pub vout: u32,
    /// Amount in coin units.
    pub amount: f64,
    /// Confirmation height of the funding transaction.
    pub height: u64,
    /// Textual address, when the output has one.
    #[serde(default)]
    pub address: Option<String>,
}

/// A block with full transaction detail (`getblock` verbosity 2).
#[derive(Debug, Clone, Deserialize)]
pub struct BlockTxs {
    pub hash: String,
    pub height: u64,
    pub tx: Vec<RawTx>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTx {
    pub txid: String,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxInput {
    /// Funding txid; absent for coinbase inputs.
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxOutput {
    /// Value in coin units.
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub address: Option<String>,
}

impl TxOutput {
    /// Textual address of this output, if it has one.
    pub fn address(&self) -> Option<&str> {
        self.script_pub_key.address.as_deref()
    }
}

/// Read access to the source chain.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Current chain height.
    async fn chain_height(&self) -> SnapshotResult<u64>;

    /// Block hash at a height.
    async fn block_hash(&self, height: u64) -> SnapshotResult<String>;

    /// Whole-UTXO-set scan over all output descriptors.
    async fn scan_utxo_set(&self) -> SnapshotResult<Vec<ScanUtxo>>;

    /// Block with full transaction detail.
    async fn block_transactions(&self, hash: &str) -> SnapshotResult<BlockTxs>;
}

/// JSON-RPC request.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BlockchainInfo {
    blocks: u64,
}

#[derive(Debug, Deserialize)]
struct ScanResult {
    #[serde(default)]
    unspents: Vec<ScanUtxo>,
}

/// HTTP JSON-RPC chain client.
pub struct HttpChainRpc {
    client: Client,
    config: ChainRpcConfig,
    request_id: AtomicU64,
}

impl HttpChainRpc {
    pub fn new(config: ChainRpcConfig) -> SnapshotResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SnapshotError::RpcConnection(e.to_string()))?;
        Ok(Self {
            client,
            config,
            request_id: AtomicU64::new(0),
        })
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> SnapshotResult<T> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(method, id, "chain RPC call");

        let mut builder = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .json(&request);
        if !self.config.username.is_empty() {
            let auth = format!("{}:{}", self.config.username, self.config.password);
            let header = format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(auth)
            );
            builder = builder.header("Authorization", header);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SnapshotError::RpcConnection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SnapshotError::RpcRequest(format!("HTTP {status} - {body}")));
        }

        let rpc_response: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SnapshotError::RpcRequest(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(SnapshotError::RpcResponse {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| SnapshotError::RpcRequest("empty response".to_string()))
    }
}

#[async_trait]
impl ChainSource for HttpChainRpc {
    async fn chain_height(&self) -> SnapshotResult<u64> {
        let info: BlockchainInfo = self
            .call("getblockchaininfo", serde_json::json!([]))
            .await?;
        Ok(info.blocks)
    }

    async fn block_hash(&self, height: u64) -> SnapshotResult<String> {
        self.call("getblockhash", serde_json::json!([height])).await
    }

    async fn scan_utxo_set(&self) -> SnapshotResult<Vec<ScanUtxo>> {
        let result: ScanResult = self
            .call("scantxoutset", serde_json::json!(["start", ["combo(*)"]]))
            .await?;
        Ok(result.unspents)
    }

    async fn block_transactions(&self, hash: &str) -> SnapshotResult<BlockTxs> {
        self.call("getblock", serde_json::json!([hash, 2])).await
    }
}
