//! Alpha Faucet Command Line Interface
//!
//! Usage:
//!   faucet serve     - Start the claim API server
//!   faucet snapshot  - Build the one-shot UTXO snapshot database

use clap::{Parser, Subcommand};
use faucet_core::FaucetConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "faucet")]
#[command(about = "Alpha L1 to L3 proxy faucet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the claim API server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Balance database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Upstream mint base URL
        #[arg(long)]
        mint_url: Option<String>,
        /// Allowed CORS origin (`*` allows any)
        #[arg(long)]
        cors_origin: Option<String>,
    },

    /// Build the one-shot UTXO snapshot database
    Snapshot {
        /// Source-chain JSON-RPC endpoint
        #[arg(long)]
        rpc: String,
        /// Snapshot block height
        #[arg(long)]
        block: u64,
        /// RPC username
        #[arg(long, default_value = "")]
        rpc_user: String,
        /// RPC password
        #[arg(long, default_value = "")]
        rpc_pass: String,
        /// Output database path (must not exist)
        #[arg(long)]
        output: PathBuf,
        /// Balance insert batch size
        #[arg(long, default_value_t = 500)]
        batch_size: usize,
        /// Upstream mint endpoint recorded in snapshot metadata
        #[arg(long)]
        mint_url: Option<String>,
        /// L1 address prefix
        #[arg(long)]
        hrp: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = FaucetConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let result = match cli.command {
        Commands::Serve {
            port,
            db,
            mint_url,
            cors_origin,
        } => commands::handle_serve(config, port, db, mint_url, cors_origin).await,
        Commands::Snapshot {
            rpc,
            block,
            rpc_user,
            rpc_pass,
            output,
            batch_size,
            mint_url,
            hrp,
        } => {
            commands::handle_snapshot(
                config, rpc, block, rpc_user, rpc_pass, output, batch_size, mint_url, hrp,
            )
            .await
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
