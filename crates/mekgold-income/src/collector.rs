// crates/mekgold-income/src/collector.rs
//
// CheckpointCollector: assignment lifecycle and checkpoint settlement.
//
// Every mutating operation reads the records it needs, builds one
// `LedgerTransaction` and commits it. Slot writes carry the revision they
// were computed from, so two settlements racing on one slot cannot both
// succeed: the loser gets `IncomeError::Conflict` and nothing is applied.
// Mek assignment writes name the assignment they replace, so two assigns of
// one Mek into different slots cannot both land either.
//
// Settlement of a slot:
//   checkpoint     := now
//   slot_xp        += floor(pending / 10)
//   mek lifetime   += pending
//   owner balance  += pending

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mekgold_core::{
    Gold, IncomeStore, JobSlot, LedgerTransaction, Mek, SlotKey, SlotRef, CENTS_PER_GOLD,
};

use crate::accrual::{self, Accrual};
use crate::curve;
use crate::error::IncomeError;

/// Gold collected per point of slot experience.
pub const GOLD_PER_EXPERIENCE: u64 = 10;

/// Experience earned for collecting `amount`: one point per 10 whole gold.
pub fn experience_for(amount: Gold) -> u64 {
    amount.cents / (GOLD_PER_EXPERIENCE * CENTS_PER_GOLD)
}

/// Behavior switches for the collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomePolicy {
    /// Settle the outgoing Mek's pending income before a reassignment or
    /// unassignment. When off, that income is discarded.
    #[serde(default)]
    pub settle_on_reassign: bool,
}

/// Result of settling one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectReceipt {
    pub slot_type: String,
    pub slot_index: u32,
    pub asset_id: String,
    pub collected: Gold,
    /// Owner balance read back after the commit.
    pub new_balance: Gold,
    pub experience_gained: u64,
}

/// Totals of a `collect_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectAllSummary {
    pub total_collected: Gold,
    pub slots_collected: u32,
    pub total_experience: u64,
    pub new_balance: Gold,
}

/// Result of an assign or unassign.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange {
    pub message: String,
    /// Settlement of the outgoing Mek, when the policy settles on reassignment.
    pub settled: Option<CollectReceipt>,
}

/// Settlement folded into a larger transaction, reported after commit.
#[derive(Debug)]
struct StagedSettlement {
    asset_id: String,
    amount: Gold,
    experience: u64,
}

/// Advance `slot` past a settlement of `accrual` and return the experience gained.
fn advance_checkpoint(slot: &mut JobSlot, accrual: &Accrual, now: DateTime<Utc>) -> u64 {
    let experience = experience_for(accrual.pending);
    slot.last_checkpoint = Some(checkpoint_at(slot, now));
    slot.slot_xp = slot.slot_xp.saturating_add(experience);
    slot.last_xp_update = Some(now);
    experience
}

/// `now`, unless the stored checkpoint is already later.
fn checkpoint_at(slot: &JobSlot, now: DateTime<Utc>) -> DateTime<Utc> {
    slot.last_checkpoint.map_or(now, |c| c.max(now))
}

fn credit(tx: LedgerTransaction, owner: &str, asset_id: &str, amount: Gold) -> LedgerTransaction {
    if amount.is_zero() {
        return tx;
    }
    tx.record_earnings(asset_id, amount)
        .credit_account(owner, amount)
}

/// Stateful income operations over an `IncomeStore`.
#[derive(Clone)]
pub struct CheckpointCollector {
    store: Arc<dyn IncomeStore>,
    policy: IncomePolicy,
}

impl std::fmt::Debug for CheckpointCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointCollector")
            .field("policy", &self.policy)
            .finish()
    }
}

impl CheckpointCollector {
    pub fn new(store: Arc<dyn IncomeStore>) -> Self {
        Self {
            store,
            policy: IncomePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: IncomePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> IncomePolicy {
        self.policy
    }

    async fn load_slot(&self, key: &SlotKey) -> Result<JobSlot, IncomeError> {
        self.store
            .get_slot(key)
            .await?
            .ok_or_else(|| IncomeError::NotFound(format!("Slot {} of {}", key, key.owner)))
    }

    async fn load_mek(&self, asset_id: &str) -> Result<Mek, IncomeError> {
        self.store
            .get_mek(asset_id)
            .await?
            .ok_or_else(|| IncomeError::NotFound(format!("Mek {}", asset_id)))
    }

    async fn balance(&self, stake_address: &str) -> Result<Gold, IncomeError> {
        self.store
            .get_account(stake_address)
            .await?
            .map(|a| a.gold)
            .ok_or_else(|| IncomeError::NotFound(format!("Account {}", stake_address)))
    }

    /// Put `asset_id` into the slot at `key`, creating the slot if needed.
    ///
    /// Replacing a different Mek resets tenure and the checkpoint. The
    /// outgoing Mek's pending income is discarded unless the policy settles
    /// on reassignment.
    pub async fn assign(
        &self,
        key: &SlotKey,
        asset_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SlotChange, IncomeError> {
        let mek = self.load_mek(asset_id).await?;
        if mek.owner != key.owner {
            return Err(IncomeError::Unauthorized {
                stake_address: key.owner.clone(),
                asset_id: asset_id.to_string(),
            });
        }

        let existing = self.store.get_slot(key).await?;
        if let Some(slot) = &existing {
            if slot.assigned_mek_id.as_deref() == Some(asset_id) {
                return Err(IncomeError::NoOp(format!(
                    "Mek {} is already in {} slot {}",
                    mek.display_name(),
                    key.slot_type,
                    key.slot_index
                )));
            }
        }

        // The Mek's own slot reference can go stale; trust the slot record.
        if let Some(current) = &mek.assigned_slot {
            let elsewhere = SlotKey::new(&mek.owner, &current.slot_type, current.slot_index);
            if elsewhere != *key {
                let occupied = self
                    .store
                    .get_slot(&elsewhere)
                    .await?
                    .is_some_and(|s| s.assigned_mek_id.as_deref() == Some(asset_id));
                if occupied {
                    return Err(IncomeError::AlreadyAssigned {
                        asset_id: asset_id.to_string(),
                        slot: elsewhere.to_string(),
                    });
                }
            }
        }

        let mut tx = LedgerTransaction::new();
        let mut staged = None;

        match existing {
            None => {
                tx = tx.put_slot(JobSlot::new_assigned(key, asset_id, now), None);
            }
            Some(mut slot) => {
                let expected = slot.revision;
                if let Some(outgoing_id) = slot.assigned_mek_id.clone() {
                    if let Some(outgoing) = self.store.get_mek(&outgoing_id).await? {
                        staged = self.stage_outgoing_settlement(&mut slot, &outgoing, now).await?;
                        if let Some(s) = &staged {
                            tx = credit(tx, &key.owner, &s.asset_id, s.amount);
                        }
                        tx = tx.set_mek_assignment(
                            &outgoing_id,
                            outgoing.assigned_slot.clone(),
                            None,
                        );
                    }
                }
                slot.last_checkpoint = Some(checkpoint_at(&slot, now));
                slot.assigned_mek_id = Some(asset_id.to_string());
                slot.assigned_at = Some(now);
                slot.tenure_days = 0;
                tx = tx.put_slot(slot, Some(expected));
            }
        }

        tx = tx.set_mek_assignment(
            asset_id,
            mek.assigned_slot.clone(),
            Some(SlotRef {
                slot_type: key.slot_type.clone(),
                slot_index: key.slot_index,
            }),
        );

        if mek.base_daily_rate.is_none() {
            if let Some(rank) = mek.rarity_rank {
                let config = self.store.current_rate_config().await?;
                let rate = Gold::from_gold(curve::evaluate(rank, config.as_ref()));
                tracing::debug!("Base rate for Mek {} (rank {}): {}", asset_id, rank, rate);
                tx = tx.set_mek_base_rate(asset_id, rate);
            }
        }

        self.store.commit(tx).await?;

        tracing::info!(
            "Assigned Mek {} to {} for {}",
            asset_id,
            key,
            key.owner
        );

        Ok(SlotChange {
            message: format!("Mek assigned to {} slot {}", key.slot_type, key.slot_index),
            settled: self.report_staged(key, staged).await?,
        })
    }

    /// Empty the slot at `key`. Level and experience are kept.
    pub async fn unassign(
        &self,
        key: &SlotKey,
        now: DateTime<Utc>,
    ) -> Result<SlotChange, IncomeError> {
        let mut slot = self.load_slot(key).await?;
        let Some(outgoing_id) = slot.assigned_mek_id.clone() else {
            return Err(IncomeError::NoOp(format!(
                "{} slot {} is already empty",
                key.slot_type, key.slot_index
            )));
        };
        let expected = slot.revision;

        let mut tx = LedgerTransaction::new();
        let mut staged = None;
        if let Some(outgoing) = self.store.get_mek(&outgoing_id).await? {
            staged = self.stage_outgoing_settlement(&mut slot, &outgoing, now).await?;
            if let Some(s) = &staged {
                tx = credit(tx, &key.owner, &s.asset_id, s.amount);
            }
            tx = tx.set_mek_assignment(&outgoing_id, outgoing.assigned_slot.clone(), None);
        }

        slot.assigned_mek_id = None;
        slot.assigned_at = None;
        slot.tenure_days = 0;
        tx = tx.put_slot(slot, Some(expected));

        self.store.commit(tx).await?;

        tracing::info!("Removed Mek {} from {} for {}", outgoing_id, key, key.owner);

        Ok(SlotChange {
            message: format!("Mek removed from {} slot {}", key.slot_type, key.slot_index),
            settled: self.report_staged(key, staged).await?,
        })
    }

    /// Settle the pending income of one slot into the owner's balance.
    pub async fn collect_one(
        &self,
        key: &SlotKey,
        now: DateTime<Utc>,
    ) -> Result<CollectReceipt, IncomeError> {
        let slot = self.load_slot(key).await?;
        let asset_id = slot
            .assigned_mek_id
            .clone()
            .ok_or_else(|| IncomeError::Empty(key.to_string()))?;
        let mek = self.load_mek(&asset_id).await?;
        if mek.owner != key.owner {
            return Err(IncomeError::Unauthorized {
                stake_address: key.owner.clone(),
                asset_id,
            });
        }
        self.balance(&key.owner).await?;

        let accrual = accrual::pending(&slot, Some(&mek), now);
        if !accrual.is_collectable() {
            return Err(IncomeError::TooSoon {
                elapsed_ms: accrual.elapsed_ms,
            });
        }

        let experience = self.commit_settlement(slot, &accrual, now).await?;
        let new_balance = self.balance(&key.owner).await?;

        Ok(CollectReceipt {
            slot_type: key.slot_type.clone(),
            slot_index: key.slot_index,
            asset_id,
            collected: accrual.pending,
            new_balance,
            experience_gained: experience,
        })
    }

    /// Settle every collectable slot of `owner`.
    ///
    /// Empty slots, slots collected too recently and slots whose Mek is
    /// missing or owned by someone else are skipped. A slot that loses a
    /// concurrent update is skipped too; the others still settle. Only
    /// store faults abort the pass.
    pub async fn collect_all(
        &self,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<CollectAllSummary, IncomeError> {
        self.balance(owner).await?;

        let mut summary = CollectAllSummary::default();
        for slot in self.store.list_slots(owner).await? {
            let Some(asset_id) = slot.assigned_mek_id.clone() else {
                continue;
            };
            let mek = match self.store.get_mek(&asset_id).await? {
                Some(m) if m.owner == owner => m,
                Some(_) => {
                    tracing::debug!("Skipping {}: Mek {} changed owner", slot.key(), asset_id);
                    continue;
                }
                None => {
                    tracing::debug!("Skipping {}: Mek {} not found", slot.key(), asset_id);
                    continue;
                }
            };

            let accrual = accrual::pending(&slot, Some(&mek), now);
            if !accrual.is_collectable() {
                continue;
            }

            let key = slot.key();
            match self.commit_settlement(slot, &accrual, now).await {
                Ok(experience) => {
                    summary.total_collected += accrual.pending;
                    summary.total_experience += experience;
                    summary.slots_collected += 1;
                }
                Err(e) if !e.is_fatal() => {
                    tracing::warn!("Skipping {} of {}: {}", key, owner, e);
                }
                Err(e) => return Err(e),
            }
        }

        summary.new_balance = self.balance(owner).await?;
        tracing::info!(
            "Collected {} from {} slots for {}",
            summary.total_collected,
            summary.slots_collected,
            owner
        );
        Ok(summary)
    }

    /// Commit one slot's settlement as a single revision-checked transaction.
    async fn commit_settlement(
        &self,
        mut slot: JobSlot,
        accrual: &Accrual,
        now: DateTime<Utc>,
    ) -> Result<u64, IncomeError> {
        let expected = slot.revision;
        let key = slot.key();
        let asset_id = slot.assigned_mek_id.clone().unwrap_or_default();
        let experience = advance_checkpoint(&mut slot, accrual, now);

        let tx = credit(LedgerTransaction::new(), &key.owner, &asset_id, accrual.pending)
            .put_slot(slot, Some(expected));
        self.store.commit(tx).await?;

        tracing::info!(
            "Collected {} from {} (Mek {}) for {}, +{} xp",
            accrual.pending,
            key,
            asset_id,
            key.owner,
            experience
        );
        Ok(experience)
    }

    /// Fold the outgoing Mek's settlement into `slot` when the policy asks for it.
    async fn stage_outgoing_settlement(
        &self,
        slot: &mut JobSlot,
        outgoing: &Mek,
        now: DateTime<Utc>,
    ) -> Result<Option<StagedSettlement>, IncomeError> {
        if !self.policy.settle_on_reassign || outgoing.owner != slot.owner {
            return Ok(None);
        }
        let accrual = accrual::pending(slot, Some(outgoing), now);
        if !accrual.is_collectable() || accrual.pending.is_zero() {
            return Ok(None);
        }
        if self.store.get_account(&slot.owner).await?.is_none() {
            return Ok(None);
        }
        let experience = advance_checkpoint(slot, &accrual, now);
        Ok(Some(StagedSettlement {
            asset_id: outgoing.asset_id.clone(),
            amount: accrual.pending,
            experience,
        }))
    }

    async fn report_staged(
        &self,
        key: &SlotKey,
        staged: Option<StagedSettlement>,
    ) -> Result<Option<CollectReceipt>, IncomeError> {
        let Some(s) = staged else {
            return Ok(None);
        };
        tracing::info!(
            "Settled {} for outgoing Mek {} in {}",
            s.amount,
            s.asset_id,
            key
        );
        Ok(Some(CollectReceipt {
            slot_type: key.slot_type.clone(),
            slot_index: key.slot_index,
            asset_id: s.asset_id,
            collected: s.amount,
            new_balance: self.balance(&key.owner).await?,
            experience_gained: s.experience,
        }))
    }
}
