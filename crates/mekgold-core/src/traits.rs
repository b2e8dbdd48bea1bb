// crates/mekgold-core/src/traits.rs

use async_trait::async_trait;

use crate::account::UserAccount;
use crate::error::MekGoldError;
use crate::ledger::LedgerTransaction;
use crate::mek::Mek;
use crate::rate_config::RateCurveConfig;
use crate::slot::{JobSlot, SlotKey};

/// Trait for the persistent document store behind the income engine.
///
/// Implemented by mekgold-store (RocksDB and in-memory backends). Lookups are
/// indexed; all engine mutations go through `commit`.
#[async_trait]
pub trait IncomeStore: Send + Sync {
    /// Retrieve a slot by its `(owner, slot_type, slot_index)` key.
    async fn get_slot(&self, key: &SlotKey) -> Result<Option<JobSlot>, MekGoldError>;

    /// List every slot owned by a stake address, ordered by type then index.
    async fn list_slots(&self, owner: &str) -> Result<Vec<JobSlot>, MekGoldError>;

    /// Retrieve a Mek by asset id.
    async fn get_mek(&self, asset_id: &str) -> Result<Option<Mek>, MekGoldError>;

    /// Retrieve a user account by stake address.
    async fn get_account(&self, stake_address: &str) -> Result<Option<UserAccount>, MekGoldError>;

    /// The single current rate curve configuration, if one has been published.
    async fn current_rate_config(&self) -> Result<Option<RateCurveConfig>, MekGoldError>;

    /// Insert or replace a Mek record (admin/seed path).
    async fn put_mek(&self, mek: &Mek) -> Result<(), MekGoldError>;

    /// Delete a Mek record (admin path, e.g. burned or transferred out).
    async fn delete_mek(&self, asset_id: &str) -> Result<(), MekGoldError>;

    /// Insert or replace a user account (admin/seed path).
    async fn put_account(&self, account: &UserAccount) -> Result<(), MekGoldError>;

    /// Publish a rate curve configuration as the current one, replacing any previous.
    async fn put_rate_config(&self, config: &RateCurveConfig) -> Result<(), MekGoldError>;

    /// Apply a ledger transaction atomically.
    ///
    /// Returns `MekGoldError::Conflict` if a slot revision or Mek assignment
    /// check fails and
    /// `MekGoldError::NotFound` if an op references a missing Mek or account.
    /// Nothing is written in either case.
    async fn commit(&self, tx: LedgerTransaction) -> Result<(), MekGoldError>;
}
