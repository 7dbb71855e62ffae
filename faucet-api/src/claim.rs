//! Claim coordinator.
//!
//! Runs the full claim pipeline: canonicalize, validate, verify, reserve,
//! relay, finalize. The reservation survives an upstream relay failure by
//! design (the row stays consumed with `relay_tx_id = "pending"`); the claim
//! log is the operator's reconciliation record.

use std::sync::Arc;

use faucet_core::{address, token, verify, ClaimError};
use faucet_db::{BalanceStore, ClaimStatus, ConsumeOutcome, StoreError};
use faucet_mint::{MintRelay, MintRequest};
use tracing::{error, info, warn};

/// Result of a completed claim.
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub l1_address: String,
    pub destination_id: String,
    pub amount: u64,
    pub amount_coins: f64,
    pub relay_tx_id: String,
}

/// Orchestrates claims against the store and the upstream mint.
pub struct ClaimService {
    store: Arc<BalanceStore>,
    mint: Arc<dyn MintRelay>,
    hrp: String,
}

impl ClaimService {
    pub fn new(store: Arc<BalanceStore>, mint: Arc<dyn MintRelay>, hrp: &str) -> Self {
        Self {
            store,
            mint,
            hrp: hrp.to_string(),
        }
    }

    /// Execute a claim end to end.
    pub async fn claim(
        &self,
        addr_raw: &str,
        destination_id: &str,
        amount: u64,
        sig_hex: &str,
    ) -> Result<ClaimOutcome, ClaimError> {
        let addr = address::validate(&self.hrp, addr_raw)
            .map_err(|e| ClaimError::InvalidAddress(e.to_string()))?;
        if destination_id.trim().is_empty() {
            return Err(ClaimError::InvalidInput(
                "destination id must not be empty".to_string(),
            ));
        }
        if amount == 0 {
            return Err(ClaimError::InvalidInput(
                "amount must be positive".to_string(),
            ));
        }

        let req_id = self
            .store
            .log_claim_request(&addr, destination_id, amount, sig_hex)
            .map_err(store_failure)?;

        match self.execute(&addr, destination_id, amount, sig_hex).await {
            Ok((outcome, upstream_response)) => {
                let response_json = upstream_response.to_string();
                if let Err(e) = self.store.update_claim_request(
                    req_id,
                    ClaimStatus::Success,
                    None,
                    Some(&response_json),
                ) {
                    error!(claim_log_id = req_id, error = %e, "failed to resolve claim log");
                }
                info!(
                    claim_log_id = req_id,
                    address = %outcome.l1_address,
                    relay_tx_id = %outcome.relay_tx_id,
                    "claim completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(e) = self.store.update_claim_request(
                    req_id,
                    ClaimStatus::Failed,
                    Some(&err.to_string()),
                    None,
                ) {
                    error!(claim_log_id = req_id, error = %e, "failed to resolve claim log");
                }
                warn!(claim_log_id = req_id, error = %err, "claim failed");
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        addr: &str,
        destination_id: &str,
        amount: u64,
        sig_hex: &str,
    ) -> Result<(ClaimOutcome, serde_json::Value), ClaimError> {
        let row = self
            .store
            .find(addr)
            .map_err(store_failure)?
            .ok_or_else(|| ClaimError::NotFound(addr.to_string()))?;

        if row.consumed {
            return Err(ClaimError::AlreadyConsumed {
                destination_id: row.destination_id,
            });
        }
        if amount != row.initial_amount {
            return Err(ClaimError::AmountMismatch {
                requested: amount,
                available: row.initial_amount,
            });
        }

        verify::verify_claim(&self.hrp, addr, destination_id, amount, sig_hex)?;

        match self
            .store
            .atomic_consume(addr, destination_id, "pending")
            .map_err(store_failure)?
        {
            ConsumeOutcome::Consumed(_) => {}
            ConsumeOutcome::AlreadyConsumed(row) => {
                return Err(ClaimError::AlreadyConsumed {
                    destination_id: row.destination_id,
                });
            }
            ConsumeOutcome::Raced => {
                return Err(ClaimError::AlreadyConsumed {
                    destination_id: None,
                });
            }
            ConsumeOutcome::NotFound => {
                return Err(ClaimError::NotFound(addr.to_string()));
            }
        }

        // The reservation is now held. An upstream failure leaves it in
        // place; double-credit is worse than a stuck pending row.
        let request = MintRequest {
            unicity_id: destination_id.to_string(),
            coin: token::TOKEN_NAME.to_string(),
            amount: token::satoshis_to_coins(amount),
        };
        let receipt = self
            .mint
            .request_mint(&request)
            .await
            .map_err(|e| ClaimError::UpstreamFailure(e.to_string()))?;

        self.store
            .finalize_relay_tx_id(addr, destination_id, &receipt.tx_id)
            .map_err(store_failure)?;

        Ok((
            ClaimOutcome {
                l1_address: addr.to_string(),
                destination_id: destination_id.to_string(),
                amount,
                amount_coins: token::satoshis_to_coins(amount),
                relay_tx_id: receipt.tx_id,
            },
            receipt.response,
        ))
    }
}

fn store_failure(err: StoreError) -> ClaimError {
    ClaimError::StoreFailure(err.to_string())
}
