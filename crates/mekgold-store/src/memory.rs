// crates/mekgold-store/src/memory.rs
//
// In-memory store implementing the `IncomeStore` trait.
//
// Used by tests and by the daemon when `storage = "memory"`. All tables sit
// behind one `RwLock`; `commit` holds the write lock for the whole
// transaction, which makes each commit atomic and serializes concurrent
// settlements of the same slot.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use mekgold_core::error::MekGoldError;
use mekgold_core::ledger::LedgerTransaction;
use mekgold_core::traits::IncomeStore;
use mekgold_core::{JobSlot, Mek, RateCurveConfig, SlotKey, UserAccount};

use crate::staging;

#[derive(Debug, Default)]
struct Tables {
    slots: HashMap<SlotKey, JobSlot>,
    meks: HashMap<String, Mek>,
    accounts: HashMap<String, UserAccount>,
    rate_config: Option<RateCurveConfig>,
}

/// Ephemeral `IncomeStore` backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, MekGoldError> {
        self.tables
            .read()
            .map_err(|e| MekGoldError::Storage(format!("Lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, MekGoldError> {
        self.tables
            .write()
            .map_err(|e| MekGoldError::Storage(format!("Lock poisoned: {}", e)))
    }

    /// Number of slot records held (for inspection in tests).
    pub fn slot_count(&self) -> usize {
        self.read().map(|t| t.slots.len()).unwrap_or(0)
    }
}

#[async_trait]
impl IncomeStore for InMemoryStore {
    async fn get_slot(&self, key: &SlotKey) -> Result<Option<JobSlot>, MekGoldError> {
        Ok(self.read()?.slots.get(key).cloned())
    }

    async fn list_slots(&self, owner: &str) -> Result<Vec<JobSlot>, MekGoldError> {
        let tables = self.read()?;
        let mut slots: Vec<JobSlot> = tables
            .slots
            .values()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        slots.sort_by(|a, b| {
            a.slot_type
                .cmp(&b.slot_type)
                .then(a.slot_index.cmp(&b.slot_index))
        });
        Ok(slots)
    }

    async fn get_mek(&self, asset_id: &str) -> Result<Option<Mek>, MekGoldError> {
        Ok(self.read()?.meks.get(asset_id).cloned())
    }

    async fn get_account(&self, stake_address: &str) -> Result<Option<UserAccount>, MekGoldError> {
        Ok(self.read()?.accounts.get(stake_address).cloned())
    }

    async fn current_rate_config(&self) -> Result<Option<RateCurveConfig>, MekGoldError> {
        Ok(self.read()?.rate_config.clone())
    }

    async fn put_mek(&self, mek: &Mek) -> Result<(), MekGoldError> {
        self.write()?.meks.insert(mek.asset_id.clone(), mek.clone());
        Ok(())
    }

    async fn delete_mek(&self, asset_id: &str) -> Result<(), MekGoldError> {
        self.write()?.meks.remove(asset_id);
        Ok(())
    }

    async fn put_account(&self, account: &UserAccount) -> Result<(), MekGoldError> {
        self.write()?
            .accounts
            .insert(account.stake_address.clone(), account.clone());
        Ok(())
    }

    async fn put_rate_config(&self, config: &RateCurveConfig) -> Result<(), MekGoldError> {
        config.validate()?;
        let mut current = config.clone();
        current.is_current = true;
        self.write()?.rate_config = Some(current);
        Ok(())
    }

    async fn commit(&self, tx: LedgerTransaction) -> Result<(), MekGoldError> {
        let mut tables = self.write()?;

        let staged = {
            let t = &*tables;
            staging::stage(
                &tx,
                |key| Ok(t.slots.get(key).cloned()),
                |id| Ok(t.meks.get(id).cloned()),
                |addr| Ok(t.accounts.get(addr).cloned()),
            )?
        };

        tables.slots.extend(staged.slots);
        tables.meks.extend(staged.meks);
        tables.accounts.extend(staged.accounts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mekgold_core::{CurveType, Gold, SlotRef};

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        {
            let mut t = store.tables.write().unwrap();
            t.meks.insert("mek-1".into(), Mek::new("mek-1", "stake1u", "Mek One"));
            t.accounts
                .insert("stake1u".into(), UserAccount::new("stake1u"));
        }
        store
    }

    #[tokio::test]
    async fn test_commit_creates_slot_at_revision_zero() {
        let store = seeded();
        let key = SlotKey::new("stake1u", "miner", 0);
        let slot = JobSlot::new_assigned(&key, "mek-1", Utc::now());

        store
            .commit(LedgerTransaction::new().put_slot(slot, None))
            .await
            .unwrap();

        let stored = store.get_slot(&key).await.unwrap().unwrap();
        assert_eq!(stored.revision, 0);
    }

    #[tokio::test]
    async fn test_stale_revision_conflicts_and_writes_nothing() {
        let store = seeded();
        let key = SlotKey::new("stake1u", "miner", 0);
        let now = Utc::now();
        let slot = JobSlot::new_assigned(&key, "mek-1", now);
        store
            .commit(LedgerTransaction::new().put_slot(slot.clone(), None))
            .await
            .unwrap();

        // First writer advances the revision.
        let mut first = slot.clone();
        first.last_checkpoint = Some(now + Duration::hours(1));
        store
            .commit(
                LedgerTransaction::new()
                    .put_slot(first, Some(0))
                    .credit_account("stake1u", Gold::from_whole(5)),
            )
            .await
            .unwrap();

        // Second writer still holds revision 0.
        let mut second = slot;
        second.last_checkpoint = Some(now + Duration::hours(1));
        let err = store
            .commit(
                LedgerTransaction::new()
                    .put_slot(second, Some(0))
                    .credit_account("stake1u", Gold::from_whole(5)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MekGoldError::Conflict(_)));

        let account = store.get_account("stake1u").await.unwrap().unwrap();
        assert_eq!(account.gold, Gold::from_whole(5));
    }

    #[tokio::test]
    async fn test_insert_over_existing_slot_conflicts() {
        let store = seeded();
        let key = SlotKey::new("stake1u", "miner", 0);
        let slot = JobSlot::new_assigned(&key, "mek-1", Utc::now());
        store
            .commit(LedgerTransaction::new().put_slot(slot.clone(), None))
            .await
            .unwrap();

        let err = store
            .commit(LedgerTransaction::new().put_slot(slot, None))
            .await
            .unwrap_err();
        assert!(matches!(err, MekGoldError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_checkpoint_cannot_move_backwards() {
        let store = seeded();
        let key = SlotKey::new("stake1u", "miner", 0);
        let now = Utc::now();
        let slot = JobSlot::new_assigned(&key, "mek-1", now);
        store
            .commit(LedgerTransaction::new().put_slot(slot.clone(), None))
            .await
            .unwrap();

        let mut rewound = slot;
        rewound.last_checkpoint = Some(now - Duration::days(1));
        let err = store
            .commit(LedgerTransaction::new().put_slot(rewound, Some(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, MekGoldError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_missing_account_aborts_whole_transaction() {
        let store = seeded();
        let tx = LedgerTransaction::new()
            .record_earnings("mek-1", Gold::from_whole(10))
            .credit_account("stake1nobody", Gold::from_whole(10));
        let err = store.commit(tx).await.unwrap_err();
        assert!(matches!(err, MekGoldError::NotFound(_)));

        let mek = store.get_mek("mek-1").await.unwrap().unwrap();
        assert!(mek.lifetime_earnings_total.is_zero());
    }

    #[tokio::test]
    async fn test_mek_ops_compose_within_transaction() {
        let store = seeded();
        let tx = LedgerTransaction::new()
            .set_mek_base_rate("mek-1", Gold::from_whole(250))
            .set_mek_assignment(
                "mek-1",
                None,
                Some(SlotRef {
                    slot_type: "miner".into(),
                    slot_index: 1,
                }),
            )
            .record_earnings("mek-1", Gold::from_cents(1_050))
            .record_earnings("mek-1", Gold::from_cents(50));
        store.commit(tx).await.unwrap();

        let mek = store.get_mek("mek-1").await.unwrap().unwrap();
        assert_eq!(mek.base_daily_rate, Some(Gold::from_whole(250)));
        assert!(mek.is_assigned());
        assert_eq!(mek.lifetime_earnings_total, Gold::from_whole(11));
        assert_eq!(mek.lifetime_earnings_current_owner, Gold::from_whole(11));
    }

    #[tokio::test]
    async fn test_mek_assignment_is_compare_and_set() {
        let store = seeded();
        let miner = |idx| SlotRef {
            slot_type: "miner".into(),
            slot_index: idx,
        };
        store
            .commit(LedgerTransaction::new().set_mek_assignment("mek-1", None, Some(miner(0))))
            .await
            .unwrap();

        // Built from the unassigned snapshot: rejected along with its slot write.
        let key = SlotKey::new("stake1u", "miner", 1);
        let err = store
            .commit(
                LedgerTransaction::new()
                    .put_slot(JobSlot::new_assigned(&key, "mek-1", Utc::now()), None)
                    .set_mek_assignment("mek-1", None, Some(miner(1))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MekGoldError::Conflict(_)));
        assert!(store.get_slot(&key).await.unwrap().is_none());

        store
            .commit(LedgerTransaction::new().set_mek_assignment("mek-1", Some(miner(0)), None))
            .await
            .unwrap();
        assert!(!store.get_mek("mek-1").await.unwrap().unwrap().is_assigned());
    }

    #[tokio::test]
    async fn test_list_slots_filters_and_orders() {
        let store = seeded();
        let now = Utc::now();
        for (owner, ty, idx) in [("stake1u", "miner", 2), ("stake1u", "miner", 0), ("other", "miner", 1)] {
            let key = SlotKey::new(owner, ty, idx);
            store
                .commit(LedgerTransaction::new().put_slot(JobSlot::new_assigned(&key, "x", now), None))
                .await
                .unwrap();
        }
        let slots = store.list_slots("stake1u").await.unwrap();
        let indices: Vec<u32> = slots.iter().map(|s| s.slot_index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(store.slot_count(), 3);
    }

    #[tokio::test]
    async fn test_put_rate_config_validates() {
        let store = InMemoryStore::new();
        let bad = RateCurveConfig::new(CurveType::Linear, 100.0, 10.0, 10);
        assert!(store.put_rate_config(&bad).await.is_err());
        assert!(store.current_rate_config().await.unwrap().is_none());

        let mut good = RateCurveConfig::new(CurveType::Linear, 10.0, 100.0, 10);
        good.is_current = false;
        store.put_rate_config(&good).await.unwrap();
        assert!(store.current_rate_config().await.unwrap().unwrap().is_current);
    }
}
