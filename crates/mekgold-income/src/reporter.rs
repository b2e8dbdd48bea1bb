// crates/mekgold-income/src/reporter.rs
//
// Read-only income aggregates for one owner. Nothing here writes to the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mekgold_core::{Gold, IncomeStore, JobSlot, Mek, SlotKey};

use crate::accrual::{self, Accrual};
use crate::error::IncomeError;

/// Combined earning rate of an owner's occupied slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRateSummary {
    /// Sum of base rate x bonuses over active slots, floored to the cent.
    pub total_daily_rate: Gold,
    /// Slots holding a Mek that still exists.
    pub active_slots: u32,
    pub total_slots: u32,
}

/// Pending income of one occupied slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPending {
    pub slot_type: String,
    pub slot_index: u32,
    pub asset_id: String,
    /// Display name of the Mek.
    pub asset_name: String,
    pub pending_amount: Gold,
    pub elapsed_days: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingReport {
    /// Sum of the per-slot amounts.
    pub total_pending: Gold,
    pub slots: Vec<SlotPending>,
}

/// Breakdown of a single slot's pending income.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPreview {
    pub accrual: Accrual,
    /// Set when the slot is empty.
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct AggregateReporter {
    store: Arc<dyn IncomeStore>,
}

impl std::fmt::Debug for AggregateReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateReporter").finish()
    }
}

impl AggregateReporter {
    pub fn new(store: Arc<dyn IncomeStore>) -> Self {
        Self { store }
    }

    /// Occupied slots of `owner` paired with their Mek. Slots whose Mek is
    /// missing or now owned by someone else are left out, matching what
    /// `collect_all` would settle. Also returns the total slot count.
    async fn occupied_slots(&self, owner: &str) -> Result<(Vec<(JobSlot, Mek)>, u32), IncomeError> {
        let slots = self.store.list_slots(owner).await?;
        let total = slots.len() as u32;
        let mut occupied = Vec::new();
        for slot in slots {
            let Some(asset_id) = slot.assigned_mek_id.as_deref() else {
                continue;
            };
            match self.store.get_mek(asset_id).await? {
                Some(mek) if mek.owner == owner => occupied.push((slot, mek)),
                Some(_) => tracing::debug!("{} holds Mek {} of another owner", slot.key(), asset_id),
                None => tracing::debug!("{} references missing Mek {}", slot.key(), asset_id),
            }
        }
        Ok((occupied, total))
    }

    pub async fn total_daily_rate(&self, owner: &str) -> Result<DailyRateSummary, IncomeError> {
        let (occupied, total_slots) = self.occupied_slots(owner).await?;
        let scaled: u128 = occupied
            .iter()
            .map(|(slot, mek)| accrual::scaled_daily_rate(slot, mek))
            .sum();

        Ok(DailyRateSummary {
            total_daily_rate: accrual::unscale(scaled),
            active_slots: occupied.len() as u32,
            total_slots,
        })
    }

    pub async fn all_pending_income(
        &self,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingReport, IncomeError> {
        let (occupied, _) = self.occupied_slots(owner).await?;
        let mut report = PendingReport::default();

        for (slot, mek) in occupied {
            let accrual = accrual::pending(&slot, Some(&mek), now);
            report.total_pending += accrual.pending;
            report.slots.push(SlotPending {
                slot_type: slot.slot_type,
                slot_index: slot.slot_index,
                asset_id: mek.asset_id.clone(),
                asset_name: mek.display_name().to_string(),
                pending_amount: accrual.pending,
                elapsed_days: accrual.elapsed_days_display(),
            });
        }
        Ok(report)
    }

    /// Preview one slot. A missing slot or a missing Mek is `NotFound`; an
    /// empty slot previews as zero.
    pub async fn preview_pending(
        &self,
        key: &SlotKey,
        now: DateTime<Utc>,
    ) -> Result<PendingPreview, IncomeError> {
        let slot = self
            .store
            .get_slot(key)
            .await?
            .ok_or_else(|| IncomeError::NotFound(format!("Slot {} of {}", key, key.owner)))?;

        let Some(asset_id) = slot.assigned_mek_id.as_deref() else {
            return Ok(PendingPreview {
                accrual: Accrual::none(&slot),
                message: Some("No Mek assigned to this slot".to_string()),
            });
        };

        let mek = self
            .store
            .get_mek(asset_id)
            .await?
            .ok_or_else(|| IncomeError::NotFound(format!("Assigned Mek {}", asset_id)))?;

        Ok(PendingPreview {
            accrual: accrual::pending(&slot, Some(&mek), now),
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mekgold_core::LedgerTransaction;
    use mekgold_store::InMemoryStore;

    const OWNER: &str = "stake1owner";

    async fn seed(store: &InMemoryStore, idx: u32, mek: Option<&str>, level: u32, since: DateTime<Utc>) {
        let key = SlotKey::new(OWNER, "miner", idx);
        let mut slot = JobSlot::new_assigned(&key, mek.unwrap_or("none"), since);
        slot.assigned_mek_id = mek.map(str::to_string);
        slot.slot_level = level;
        store
            .commit(LedgerTransaction::new().put_slot(slot, None))
            .await
            .unwrap();
    }

    async fn setup() -> (Arc<InMemoryStore>, AggregateReporter, DateTime<Utc>) {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let mut named = Mek::new("mek-a", OWNER, "Mekanism #12").with_base_daily_rate(Gold::from_whole(100));
        named.custom_name = Some("Bolt".into());
        store.put_mek(&named).await.unwrap();
        store
            .put_mek(&Mek::new("mek-b", OWNER, "Mekanism #40").with_base_daily_rate(Gold::from_gold(50.5)))
            .await
            .unwrap();

        seed(&store, 0, Some("mek-a"), 11, now - Duration::days(2)).await;
        seed(&store, 1, Some("mek-b"), 1, now - Duration::hours(12)).await;
        seed(&store, 2, None, 1, now).await;
        seed(&store, 3, Some("mek-gone"), 1, now - Duration::days(1)).await;

        let reporter = AggregateReporter::new(store.clone());
        (store, reporter, now)
    }

    #[tokio::test]
    async fn test_total_daily_rate() {
        let (_store, reporter, _) = setup().await;
        let summary = reporter.total_daily_rate(OWNER).await.unwrap();
        // 100 * 1.10 + 50.5
        assert_eq!(summary.total_daily_rate, Gold::from_cents(16_050));
        assert_eq!(summary.active_slots, 2);
        assert_eq!(summary.total_slots, 4);
    }

    #[tokio::test]
    async fn test_all_pending_income() {
        let (_store, reporter, now) = setup().await;
        let report = reporter.all_pending_income(OWNER, now).await.unwrap();

        assert_eq!(report.slots.len(), 2);
        assert_eq!(report.slots[0].asset_name, "Bolt");
        assert_eq!(report.slots[0].pending_amount, Gold::from_whole(220));
        assert_eq!(report.slots[0].elapsed_days, 2.0);
        assert_eq!(report.slots[1].pending_amount, Gold::from_cents(2_525));
        assert_eq!(report.slots[1].elapsed_days, 0.5);
        assert_eq!(report.total_pending, Gold::from_cents(24_525));
    }

    #[tokio::test]
    async fn test_reports_do_not_write() {
        let (store, reporter, now) = setup().await;
        let before = store.get_slot(&SlotKey::new(OWNER, "miner", 0)).await.unwrap();
        reporter.all_pending_income(OWNER, now).await.unwrap();
        reporter
            .preview_pending(&SlotKey::new(OWNER, "miner", 0), now)
            .await
            .unwrap();
        let after = store.get_slot(&SlotKey::new(OWNER, "miner", 0)).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_preview_pending() {
        let (_store, reporter, now) = setup().await;

        let preview = reporter
            .preview_pending(&SlotKey::new(OWNER, "miner", 0), now)
            .await
            .unwrap();
        assert_eq!(preview.accrual.pending, Gold::from_whole(220));
        assert_eq!(preview.accrual.slot_bonus(), 1.1);
        assert!(preview.message.is_none());

        let empty = reporter
            .preview_pending(&SlotKey::new(OWNER, "miner", 2), now)
            .await
            .unwrap();
        assert!(empty.accrual.pending.is_zero());
        assert!(empty.message.is_some());

        let err = reporter
            .preview_pending(&SlotKey::new(OWNER, "miner", 3), now)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        let err = reporter
            .preview_pending(&SlotKey::new(OWNER, "miner", 9), now)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_transferred_mek_is_not_reported() {
        let (store, reporter, now) = setup().await;
        let mut sold = store.get_mek("mek-b").await.unwrap().unwrap();
        sold.owner = "stake1buyer".into();
        store.put_mek(&sold).await.unwrap();

        let summary = reporter.total_daily_rate(OWNER).await.unwrap();
        assert_eq!(summary.total_daily_rate, Gold::from_whole(110));
        assert_eq!(summary.active_slots, 1);
        assert_eq!(summary.total_slots, 4);

        let report = reporter.all_pending_income(OWNER, now).await.unwrap();
        assert_eq!(report.slots.len(), 1);
        assert_eq!(report.slots[0].asset_id, "mek-a");
        assert_eq!(report.total_pending, Gold::from_whole(220));
    }

    #[tokio::test]
    async fn test_unknown_owner_is_empty() {
        let (_store, reporter, now) = setup().await;
        let summary = reporter.total_daily_rate("stake1nobody").await.unwrap();
        assert_eq!(summary, DailyRateSummary::default());
        let report = reporter.all_pending_income("stake1nobody", now).await.unwrap();
        assert!(report.slots.is_empty());
    }
}
