//! Command handlers for the CLI.

use std::path::PathBuf;
use std::sync::Arc;

use faucet_api::{run_server, ApiConfig, AppState};
use faucet_core::FaucetConfig;
use faucet_db::BalanceStore;
use faucet_mint::{HttpMintClient, MintRelay, DEFAULT_RELAY_TIMEOUT};
use faucet_snapshot::{build_snapshot, ChainRpcConfig, HttpChainRpc, SnapshotOptions};
use tracing::{info, warn};

type CmdResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Start the claim API server.
pub async fn handle_serve(
    config: FaucetConfig,
    port: Option<u16>,
    db: Option<PathBuf>,
    mint_url: Option<String>,
    cors_origin: Option<String>,
) -> CmdResult {
    let db_path = db.unwrap_or_else(|| PathBuf::from(&config.db_path));
    let store = Arc::new(BalanceStore::open(&db_path)?);

    match store.get_snapshot_meta()? {
        Some(meta) => info!(
            block_height = meta.block_height,
            addresses = meta.address_count,
            total_amount = meta.total_amount,
            "loaded snapshot database"
        ),
        None => warn!(
            db = %db_path.display(),
            "database has no snapshot metadata; run `faucet snapshot` first"
        ),
    }

    let mint_url = mint_url.unwrap_or_else(|| config.mint_url.clone());
    let mint: Arc<dyn MintRelay> =
        Arc::new(HttpMintClient::new(&mint_url, DEFAULT_RELAY_TIMEOUT)?);

    let state = AppState::new(store, mint, &config.hrp);
    let api_config = ApiConfig {
        host: "0.0.0.0".to_string(),
        port: port.unwrap_or(config.port),
        cors_origin: cors_origin.unwrap_or_else(|| config.cors_origin.clone()),
    };

    run_server(&api_config, state).await
}

/// Build the one-shot UTXO snapshot database.
#[allow(clippy::too_many_arguments)]
pub async fn handle_snapshot(
    config: FaucetConfig,
    rpc: String,
    block: u64,
    rpc_user: String,
    rpc_pass: String,
    output: PathBuf,
    batch_size: usize,
    mint_url: Option<String>,
    hrp: Option<String>,
) -> CmdResult {
    let chain = HttpChainRpc::new(ChainRpcConfig::new(&rpc, &rpc_user, &rpc_pass))?;
    let opts = SnapshotOptions {
        block_height: block,
        hrp: hrp.unwrap_or_else(|| config.hrp.clone()),
        output,
        batch_size,
        chain_endpoint: rpc.clone(),
        mint_endpoint: mint_url.unwrap_or_else(|| config.mint_url.clone()),
    };

    let summary = build_snapshot(&chain, &opts).await?;

    println!("Snapshot written successfully!");
    println!("  Block height: {}", summary.block_height);
    println!("  Block hash:   {}", summary.block_hash);
    println!("  Addresses:    {}", summary.address_count);
    println!("  Total amount: {} satoshis", summary.total_amount);
    Ok(())
}
