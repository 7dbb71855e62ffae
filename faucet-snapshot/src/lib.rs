//! UTXO snapshot builder for the Alpha faucet.
//!
//! Reads the source chain over JSON-RPC, aggregates per-address balances at
//! a target height, and seeds a fresh balance database.

pub mod builder;
pub mod error;
pub mod rpc;

pub use builder::{
    aggregate_from_replay, aggregate_from_scan, aggregate_utxos, build_snapshot,
    SnapshotOptions, SnapshotSummary,
};
pub use error::{SnapshotError, SnapshotResult};
pub use rpc::{ChainRpcConfig, ChainSource, HttpChainRpc, ScanUtxo};
