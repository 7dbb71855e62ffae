//! Data Transfer Objects for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Balance lookup response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub description: String,
    pub l1_addr: String,
    #[serde(rename = "unicityId")]
    pub unicity_id: Option<String>,
    /// Remaining claimable amount in coin units.
    pub amount: f64,
    #[serde(rename = "amountInSmallUnits")]
    pub amount_in_small_units: u64,
    /// Snapshot amount in coin units.
    #[serde(rename = "initialAmount")]
    pub initial_amount: f64,
    #[serde(rename = "initialAmountInSmallUnits")]
    pub initial_amount_in_small_units: u64,
    pub spent: bool,
    #[serde(rename = "inSnapshot")]
    pub in_snapshot: bool,
    #[serde(rename = "mintedAt", skip_serializing_if = "Option::is_none")]
    pub minted_at: Option<DateTime<Utc>>,
}

/// Claim request body.
#[derive(Debug, Deserialize)]
pub struct ClaimRequestDto {
    pub l1_addr: String,
    #[serde(rename = "unicityId")]
    pub unicity_id: String,
    pub amount: u64,
    pub signature: String,
}

/// Successful claim response.
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub success: bool,
    pub l1_addr: String,
    #[serde(rename = "unicityId")]
    pub unicity_id: String,
    /// Claimed amount in coin units.
    pub amount: f64,
    #[serde(rename = "amountInSmallUnits")]
    pub amount_in_small_units: u64,
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// Faucet statistics response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(rename = "snapshotBlock")]
    pub snapshot_block: Option<u64>,
    #[serde(rename = "totalAddresses")]
    pub total_addresses: u64,
    #[serde(rename = "availableAddresses")]
    pub available_addresses: u64,
    #[serde(rename = "mintedAddresses")]
    pub minted_addresses: u64,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}
