//! Snapshot builder error types.

use thiserror::Error;

/// Snapshot builder errors.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The output database path already exists (one-shot guard).
    #[error("output database already exists: {0}")]
    OutputExists(String),

    /// Requested height is past the chain tip.
    #[error("snapshot height {requested} is beyond chain tip {tip}")]
    HeightBeyondTip { requested: u64, tip: u64 },

    /// Chain RPC connection failed.
    #[error("chain RPC connection failed: {0}")]
    RpcConnection(String),

    /// Chain RPC request failed.
    #[error("chain RPC request failed: {0}")]
    RpcRequest(String),

    /// Chain RPC returned a JSON-RPC error object.
    #[error("chain RPC error {code}: {message}")]
    RpcResponse { code: i32, message: String },

    /// Writing the snapshot database failed.
    #[error(transparent)]
    Store(#[from] faucet_db::StoreError),
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
