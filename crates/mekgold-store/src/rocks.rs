// crates/mekgold-store/src/rocks.rs
//
// RocksDB-backed persistent storage for the income engine.
//
// Key format:
//   - `slot:{owner}:{slot_type}:{slot_index:010}` -> JSON-serialized JobSlot
//   - `mek:{asset_id}`                            -> JSON-serialized Mek
//   - `account:{stake_address}`                   -> JSON-serialized UserAccount
//   - `rate_config:current`                       -> JSON-serialized RateCurveConfig
//
// Slot keys are prefixed by owner, so listing a user's slots is a prefix scan.
// The zero-padded index keeps slots of one type in numeric order.
//
// Ledger commits are serialized by `commit_lock` and written with a single
// `WriteBatch`, so a transaction is either fully visible or not at all.

use std::sync::Mutex;

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use serde::de::DeserializeOwned;
use serde::Serialize;

use mekgold_core::error::MekGoldError;
use mekgold_core::ledger::LedgerTransaction;
use mekgold_core::traits::IncomeStore;
use mekgold_core::{JobSlot, Mek, RateCurveConfig, SlotKey, UserAccount};

use crate::staging;

const RATE_CONFIG_KEY: &[u8] = b"rate_config:current";

/// RocksDB wrapper implementing the `IncomeStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
    commit_lock: Mutex<()>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, MekGoldError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            MekGoldError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        Ok(Self {
            db,
            commit_lock: Mutex::new(()),
        })
    }

    fn slot_prefix(owner: &str) -> String {
        format!("slot:{}:", owner)
    }

    fn slot_key(key: &SlotKey) -> Vec<u8> {
        format!(
            "{}{}:{:010}",
            Self::slot_prefix(&key.owner),
            key.slot_type,
            key.slot_index
        )
        .into_bytes()
    }

    fn mek_key(asset_id: &str) -> Vec<u8> {
        format!("mek:{}", asset_id).into_bytes()
    }

    fn account_key(stake_address: &str) -> Vec<u8> {
        format!("account:{}", stake_address).into_bytes()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, MekGoldError> {
        self.commit_lock
            .lock()
            .map_err(|e| MekGoldError::Storage(format!("Commit lock poisoned: {}", e)))
    }

    /// Get and deserialize a JSON value, mapping errors to MekGoldError.
    fn get_json<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, MekGoldError> {
        let bytes = self
            .db
            .get(key)
            .map_err(|e| MekGoldError::Storage(format!("RocksDB get failed: {}", e)))?;
        match bytes {
            Some(b) => Ok(Some(serde_json::from_slice(&b)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, key: &[u8], value: &T) -> Result<(), MekGoldError> {
        let json = serde_json::to_vec(value)?;
        self.db
            .put(key, json)
            .map_err(|e| MekGoldError::Storage(format!("RocksDB put failed: {}", e)))
    }

    pub fn get_slot_sync(&self, key: &SlotKey) -> Result<Option<JobSlot>, MekGoldError> {
        self.get_json(&Self::slot_key(key))
    }

    pub fn get_mek_sync(&self, asset_id: &str) -> Result<Option<Mek>, MekGoldError> {
        self.get_json(&Self::mek_key(asset_id))
    }

    pub fn get_account_sync(&self, stake_address: &str) -> Result<Option<UserAccount>, MekGoldError> {
        self.get_json(&Self::account_key(stake_address))
    }

    /// Stage and write a transaction. Caller must hold `commit_lock`.
    fn commit_locked(&self, tx: &LedgerTransaction) -> Result<(), MekGoldError> {
        let staged = staging::stage(
            tx,
            |key| self.get_slot_sync(key),
            |id| self.get_mek_sync(id),
            |addr| self.get_account_sync(addr),
        )?;

        let mut batch = WriteBatch::default();
        for (key, slot) in &staged.slots {
            batch.put(Self::slot_key(key), serde_json::to_vec(slot)?);
        }
        for (id, mek) in &staged.meks {
            batch.put(Self::mek_key(id), serde_json::to_vec(mek)?);
        }
        for (addr, account) in &staged.accounts {
            batch.put(Self::account_key(addr), serde_json::to_vec(account)?);
        }

        self.db
            .write(batch)
            .map_err(|e| MekGoldError::Storage(format!("RocksDB batch write failed: {}", e)))
    }
}

#[async_trait]
impl IncomeStore for RocksStore {
    async fn get_slot(&self, key: &SlotKey) -> Result<Option<JobSlot>, MekGoldError> {
        self.get_slot_sync(key)
    }

    async fn list_slots(&self, owner: &str) -> Result<Vec<JobSlot>, MekGoldError> {
        let prefix_str = Self::slot_prefix(owner);
        let prefix = prefix_str.as_bytes();
        let mut slots = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item
                .map_err(|e| MekGoldError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }

            // An owner containing ':' can share this prefix.
            let slot: JobSlot = serde_json::from_slice(&value)?;
            if slot.owner == owner {
                slots.push(slot);
            }
        }

        // Keys sort by type then zero-padded index already; keep the order explicit.
        slots.sort_by(|a, b| {
            a.slot_type
                .cmp(&b.slot_type)
                .then(a.slot_index.cmp(&b.slot_index))
        });
        Ok(slots)
    }

    async fn get_mek(&self, asset_id: &str) -> Result<Option<Mek>, MekGoldError> {
        self.get_mek_sync(asset_id)
    }

    async fn get_account(&self, stake_address: &str) -> Result<Option<UserAccount>, MekGoldError> {
        self.get_account_sync(stake_address)
    }

    async fn current_rate_config(&self) -> Result<Option<RateCurveConfig>, MekGoldError> {
        self.get_json(RATE_CONFIG_KEY)
    }

    async fn put_mek(&self, mek: &Mek) -> Result<(), MekGoldError> {
        let _guard = self.lock()?;
        self.put_json(&Self::mek_key(&mek.asset_id), mek)
    }

    async fn delete_mek(&self, asset_id: &str) -> Result<(), MekGoldError> {
        let _guard = self.lock()?;
        self.db
            .delete(Self::mek_key(asset_id))
            .map_err(|e| MekGoldError::Storage(format!("RocksDB delete failed: {}", e)))
    }

    async fn put_account(&self, account: &UserAccount) -> Result<(), MekGoldError> {
        let _guard = self.lock()?;
        self.put_json(&Self::account_key(&account.stake_address), account)
    }

    async fn put_rate_config(&self, config: &RateCurveConfig) -> Result<(), MekGoldError> {
        config.validate()?;
        let mut current = config.clone();
        current.is_current = true;
        let _guard = self.lock()?;
        self.put_json(RATE_CONFIG_KEY, &current)
    }

    async fn commit(&self, tx: LedgerTransaction) -> Result<(), MekGoldError> {
        let _guard = self.lock()?;
        let result = self.commit_locked(&tx);
        if let Err(ref e) = result {
            tracing::debug!("Ledger commit rejected: {}", e);
        }
        result
    }
}
