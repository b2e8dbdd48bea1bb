// crates/mekgold-daemon/src/main.rs
//
// Binary entrypoint for the income daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens the
// configured store, imports the optional seed file, and serves the income
// engine over JSON-RPC until interrupted.

mod config;
mod seed;

use std::sync::Arc;

use clap::Parser;
use config::{DaemonConfig, StorageBackend};

use mekgold_core::IncomeStore;
use mekgold_income::IncomePolicy;
use mekgold_rpc::{MekGoldRpcServer, RpcConfig};
use mekgold_store::{InMemoryStore, RocksStore};

/// MekGold daemon: serves job-slot income accrual and settlement.
#[derive(Parser, Debug)]
#[command(name = "mekgold-daemon", version = "0.1.0", about = "Mek job-slot income daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.mekgold/config.toml")]
    config: String,

    /// Storage backend, overriding the config file.
    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,

    /// Seed file to import at start-up, overriding the config file.
    #[arg(long)]
    seed: Option<String>,

    /// RPC port, overriding the config file.
    #[arg(long)]
    port: Option<u16>,

    /// Settle the outgoing Mek's income on reassignment.
    #[arg(long)]
    settle_on_reassign: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Tracing is not up yet, so the outcome is logged below.
    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match &loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI flags override the config file values.
    if let Some(storage) = args.storage {
        daemon_config.storage = storage;
    }
    if let Some(seed) = args.seed {
        daemon_config.seed_file = Some(seed);
    }
    if let Some(port) = args.port {
        daemon_config.rpc_port = port;
    }
    if args.settle_on_reassign {
        daemon_config.settle_on_reassign = true;
    }

    tracing::info!("MekGold Daemon v0.1.0");
    tracing::info!("Storage backend: {:?}", daemon_config.storage);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!(
        "Settle on reassign: {}",
        daemon_config.settle_on_reassign
    );

    let store = open_store(&daemon_config)?;

    if let Some(seed_file) = &daemon_config.seed_file {
        let seed_path = expand_tilde(seed_file);
        let data = seed::load(&seed_path)?;
        seed::import(store.as_ref(), &data).await?;
    }

    if store.current_rate_config().await?.is_none() {
        tracing::warn!("No rate curve config published; new Meks use the fallback curve");
    }

    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let server = MekGoldRpcServer::new(rpc_config, store).with_policy(IncomePolicy {
        settle_on_reassign: daemon_config.settle_on_reassign,
    });

    tokio::select! {
        result = server.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping daemon");
        }
    }

    Ok(())
}

/// Open the configured store backend.
fn open_store(config: &DaemonConfig) -> Result<Arc<dyn IncomeStore>, Box<dyn std::error::Error>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on exit");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::Rocksdb => {
            let data_dir = expand_tilde(&config.data_dir);
            std::fs::create_dir_all(&data_dir)?;
            let db_path = format!("{}/income_rocksdb", data_dir);
            let store = RocksStore::open(&db_path)?;
            tracing::info!("RocksDB store opened at {}", db_path);
            Ok(Arc::new(store))
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
