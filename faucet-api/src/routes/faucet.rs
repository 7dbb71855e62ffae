//! Faucet endpoints: balance lookup, claim submission, statistics.

use axum::{
    extract::{Path, State},
    Json,
};
use faucet_core::{address, token, ClaimError};

use crate::dto::{BalanceResponse, ClaimRequestDto, ClaimResponse, StatsResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Look up the balance of an L1 address.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(addr): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let normalized = address::validate(&state.hrp, &addr)
        .map_err(|e| ApiError(ClaimError::InvalidAddress(e.to_string())))?;

    let row = state.store.find(&normalized)?;
    let response = match row {
        Some(row) => {
            let remaining = if row.consumed { 0 } else { row.initial_amount };
            BalanceResponse {
                success: true,
                id: token::TOKEN_ID.to_string(),
                name: token::TOKEN_NAME.to_string(),
                symbol: token::TOKEN_SYMBOL.to_string(),
                decimals: token::TOKEN_DECIMALS,
                description: token::TOKEN_DESCRIPTION.to_string(),
                l1_addr: row.l1_address.clone(),
                unicity_id: row.destination_id.clone(),
                amount: token::satoshis_to_coins(remaining),
                amount_in_small_units: remaining,
                initial_amount: token::satoshis_to_coins(row.initial_amount),
                initial_amount_in_small_units: row.initial_amount,
                spent: row.consumed,
                in_snapshot: true,
                minted_at: row.consumed_at,
            }
        }
        None => BalanceResponse {
            success: true,
            id: token::TOKEN_ID.to_string(),
            name: token::TOKEN_NAME.to_string(),
            symbol: token::TOKEN_SYMBOL.to_string(),
            decimals: token::TOKEN_DECIMALS,
            description: token::TOKEN_DESCRIPTION.to_string(),
            l1_addr: normalized,
            unicity_id: None,
            amount: 0.0,
            amount_in_small_units: 0,
            initial_amount: 0.0,
            initial_amount_in_small_units: 0,
            spent: false,
            in_snapshot: false,
            minted_at: None,
        },
    };
    Ok(Json(response))
}

/// Submit a claim.
///
/// The body is parsed by hand so that shape failures map to the invalid-input
/// kind rather than the framework's default rejection.
pub async fn request_claim(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<ClaimResponse>> {
    let request: ClaimRequestDto = serde_json::from_value(body)
        .map_err(|e| ApiError(ClaimError::InvalidInput(e.to_string())))?;
    if request.amount == 0 {
        return Err(ApiError(ClaimError::InvalidInput(
            "amount must be an integer >= 1".to_string(),
        )));
    }

    let outcome = state
        .claims
        .claim(
            &request.l1_addr,
            &request.unicity_id,
            request.amount,
            &request.signature,
        )
        .await?;

    Ok(Json(ClaimResponse {
        success: true,
        l1_addr: outcome.l1_address,
        unicity_id: outcome.destination_id,
        amount: outcome.amount_coins,
        amount_in_small_units: outcome.amount,
        tx_id: outcome.relay_tx_id,
    }))
}

/// Faucet statistics.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let meta = state.store.get_snapshot_meta()?;
    let total = state.store.count_total()?;
    let available = state.store.count_unconsumed()?;

    Ok(Json(StatsResponse {
        success: true,
        snapshot_block: meta.as_ref().map(|m| m.block_height),
        total_addresses: total,
        available_addresses: available,
        minted_addresses: total - available,
        created_at: meta.map(|m| m.created_at),
    }))
}
