// crates/mekgold-daemon/src/seed.rs
//
// Start-up import of Meks, accounts and the rate curve config from a JSON file.
//
// Existing Meks and accounts are left untouched so restarting a persistent
// daemon with the same seed file does not reset balances or earnings. The
// rate config in the file, if any, is always published as the current one.

use std::fs;

use serde::Deserialize;
use thiserror::Error;

use mekgold_core::{IncomeStore, Mek, MekGoldError, RateCurveConfig, UserAccount};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse seed file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to import seed data: {0}")]
    Store(#[from] MekGoldError),
}

/// Contents of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub rate_config: Option<RateCurveConfig>,
    #[serde(default)]
    pub meks: Vec<Mek>,
    #[serde(default)]
    pub accounts: Vec<UserAccount>,
}

/// What an import actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub meks_added: usize,
    pub accounts_added: usize,
    pub rate_config_published: bool,
}

pub fn load(path: &str) -> Result<SeedData, SeedError> {
    let contents = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
        path: path.to_string(),
        source,
    })
}

pub async fn import(store: &dyn IncomeStore, seed: &SeedData) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    if let Some(config) = &seed.rate_config {
        store.put_rate_config(config).await?;
        summary.rate_config_published = true;
    }

    for mek in &seed.meks {
        if store.get_mek(&mek.asset_id).await?.is_none() {
            store.put_mek(mek).await?;
            summary.meks_added += 1;
        }
    }

    for account in &seed.accounts {
        if store.get_account(&account.stake_address).await?.is_none() {
            store.put_account(account).await?;
            summary.accounts_added += 1;
        }
    }

    tracing::info!(
        "Seed import: {} Meks, {} accounts added, rate config {}",
        summary.meks_added,
        summary.accounts_added,
        if summary.rate_config_published {
            "published"
        } else {
            "unchanged"
        }
    );
    Ok(summary)
}
