//! One-shot UTXO snapshot builder.
//!
//! Walks the L1 UTXO set at a target height, aggregates per-address satoshi
//! sums, and seeds a fresh balance database. The builder never runs against
//! an existing database file and is not incremental.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::Utc;
use faucet_db::{BalanceStore, SnapshotMeta};
use tracing::{info, warn};

use crate::error::{SnapshotError, SnapshotResult};
use crate::rpc::{ChainSource, ScanUtxo};

/// Satoshis per coin unit.
const SATOSHIS_PER_COIN: f64 = 100_000_000.0;

/// Snapshot build parameters.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Snapshot block height.
    pub block_height: u64,
    /// Address prefix of the tracked family.
    pub hrp: String,
    /// Output database path; must not exist.
    pub output: PathBuf,
    /// Balance insert batch size.
    pub batch_size: usize,
    /// Chain RPC endpoint recorded in the metadata row.
    pub chain_endpoint: String,
    /// Upstream mint endpoint recorded in the metadata row.
    pub mint_endpoint: String,
}

/// Snapshot build result.
#[derive(Debug, Clone)]
pub struct SnapshotSummary {
    pub block_height: u64,
    pub block_hash: String,
    pub address_count: u64,
    pub total_amount: u64,
}

/// Convert a coin-unit amount to satoshis.
fn to_satoshis(coins: f64) -> u64 {
    (coins * SATOSHIS_PER_COIN).round() as u64
}

/// Aggregate a UTXO-set scan into per-address satoshi sums.
///
/// Discards outputs confirmed after `max_height`, outputs without an address,
/// and addresses outside the `<hrp>1` family.
pub fn aggregate_utxos(
    utxos: &[ScanUtxo],
    hrp: &str,
    max_height: u64,
) -> BTreeMap<String, u64> {
    let prefix = format!("{hrp}1");
    let mut balances: BTreeMap<String, u64> = BTreeMap::new();
    for utxo in utxos {
        if utxo.height > max_height {
            continue;
        }
        let Some(addr) = utxo.address.as_deref() else {
            continue;
        };
        if !addr.to_lowercase().starts_with(&prefix) {
            continue;
        }
        *balances.entry(addr.to_lowercase()).or_insert(0) += to_satoshis(utxo.amount);
    }
    balances
}

/// Aggregate via the primary whole-UTXO-set scan.
pub async fn aggregate_from_scan(
    chain: &dyn ChainSource,
    hrp: &str,
    max_height: u64,
) -> SnapshotResult<BTreeMap<String, u64>> {
    let utxos = chain.scan_utxo_set().await?;
    Ok(aggregate_utxos(&utxos, hrp, max_height))
}

/// Aggregate via block-by-block replay of heights `0..=max_height`.
///
/// Maintains the live UTXO set keyed by `(txid, vout)`; inputs are processed
/// before outputs within each block so intra-block spends resolve, and spends
/// of earlier blocks' outputs remove their entries before the final fold.
pub async fn aggregate_from_replay(
    chain: &dyn ChainSource,
    hrp: &str,
    max_height: u64,
) -> SnapshotResult<BTreeMap<String, u64>> {
    let prefix = format!("{hrp}1");
    let mut live: HashMap<(String, u32), (String, u64)> = HashMap::new();

    for height in 0..=max_height {
        let hash = chain.block_hash(height).await?;
        let block = chain.block_transactions(&hash).await?;
        for tx in &block.tx {
            for vin in &tx.vin {
                if let (Some(prev_txid), Some(prev_vout)) = (&vin.txid, vin.vout) {
                    live.remove(&(prev_txid.clone(), prev_vout));
                }
            }
            for vout in &tx.vout {
                let Some(addr) = vout.address() else {
                    continue;
                };
                if !addr.to_lowercase().starts_with(&prefix) {
                    continue;
                }
                let satoshis = to_satoshis(vout.value);
                if satoshis > 0 {
                    live.insert(
                        (tx.txid.clone(), vout.n),
                        (addr.to_lowercase(), satoshis),
                    );
                }
            }
        }
    }

    let mut balances: BTreeMap<String, u64> = BTreeMap::new();
    for (addr, satoshis) in live.into_values() {
        *balances.entry(addr).or_insert(0) += satoshis;
    }
    Ok(balances)
}

/// Build the snapshot database.
///
/// Refuses an existing output path, verifies the height against the chain
/// tip, aggregates balances (UTXO scan first, block replay when the node
/// does not support scanning), and writes the rows plus the metadata
/// singleton. RPC failures abort before any file is written.
pub async fn build_snapshot(
    chain: &dyn ChainSource,
    opts: &SnapshotOptions,
) -> SnapshotResult<SnapshotSummary> {
    if opts.output.exists() {
        return Err(SnapshotError::OutputExists(
            opts.output.display().to_string(),
        ));
    }

    let tip = chain.chain_height().await?;
    if opts.block_height > tip {
        return Err(SnapshotError::HeightBeyondTip {
            requested: opts.block_height,
            tip,
        });
    }
    let block_hash = chain.block_hash(opts.block_height).await?;

    info!(
        height = opts.block_height,
        block_hash = %block_hash,
        "building UTXO snapshot"
    );

    let balances = match aggregate_from_scan(chain, &opts.hrp, opts.block_height).await {
        Ok(balances) => balances,
        Err(SnapshotError::RpcResponse { code, message }) => {
            warn!(code, message = %message, "UTXO scan unavailable, replaying blocks");
            aggregate_from_replay(chain, &opts.hrp, opts.block_height).await?
        }
        Err(e) => return Err(e),
    };

    let entries: Vec<(String, u64)> = balances
        .into_iter()
        .filter(|(_, amount)| *amount > 0)
        .collect();
    let address_count = entries.len() as u64;
    let total_amount: u64 = entries.iter().map(|(_, amount)| amount).sum();

    let store = BalanceStore::create(&opts.output)?;
    for chunk in entries.chunks(opts.batch_size.max(1)) {
        store.bulk_insert_balances(chunk)?;
    }
    store.set_snapshot_meta(&SnapshotMeta {
        block_height: opts.block_height,
        address_count,
        total_amount,
        chain_rpc_endpoint: opts.chain_endpoint.clone(),
        mint_endpoint: opts.mint_endpoint.clone(),
        created_at: Utc::now(),
    })?;

    info!(
        addresses = address_count,
        total_amount,
        "snapshot written"
    );

    Ok(SnapshotSummary {
        block_height: opts.block_height,
        block_hash,
        address_count,
        total_amount,
    })
}
