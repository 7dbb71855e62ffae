//! Row types of the balance store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRow {
    /// Canonical lowercase L1 address.
    pub l1_address: String,
    /// Snapshot amount in smallest units.
    pub initial_amount: u64,
    /// Whether the balance has been consumed.
    pub consumed: bool,
    /// Destination identifier recorded at consumption.
    pub destination_id: Option<String>,
    /// Upstream relay transaction id; `"pending"` between reservation and
    /// relay success.
    pub relay_tx_id: Option<String>,
    /// When the balance was consumed.
    pub consumed_at: Option<DateTime<Utc>>,
    /// When the row was created by the snapshot builder.
    pub created_at: DateTime<Utc>,
}

/// Snapshot provenance, written once by the snapshot builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub block_height: u64,
    pub address_count: u64,
    pub total_amount: u64,
    pub chain_rpc_endpoint: String,
    pub mint_endpoint: String,
    pub created_at: DateTime<Utc>,
}

/// Resolution state of a claim log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Success,
    Failed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A claim attempt log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequestRow {
    pub id: i64,
    pub l1_address: String,
    pub destination_id: String,
    pub amount: u64,
    pub signature: String,
    pub status: ClaimStatus,
    pub error_message: Option<String>,
    pub upstream_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Outcome of an atomic consume attempt.
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// This caller consumed the row.
    Consumed(BalanceRow),
    /// The row was already consumed before the transaction began.
    AlreadyConsumed(BalanceRow),
    /// A concurrent transaction consumed the row first.
    Raced,
    /// No row exists for the address.
    NotFound,
}
