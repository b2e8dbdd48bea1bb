// crates/mekgold-core/src/ledger.rs
//
// Ledger transactions: the unit of atomic mutation handed to an `IncomeStore`.
//
// A transaction is a list of ops applied all-or-nothing. Slot writes carry the
// revision they were computed from; the store rejects the whole transaction
// with `MekGoldError::Conflict` if any slot changed in the meantime. Mek
// assignment changes likewise name the assignment they replace. Balance
// and earnings changes are expressed as credits (deltas) so they compose with
// concurrent settlements of other slots.

use crate::gold::Gold;
use crate::mek::SlotRef;
use crate::slot::JobSlot;

/// A single mutation inside a `LedgerTransaction`.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOp {
    /// Write a slot record. `expected_revision: None` requires that no slot
    /// with this key exists yet; `Some(r)` requires the stored revision to be `r`.
    PutSlot {
        slot: JobSlot,
        expected_revision: Option<u64>,
    },
    /// Add `amount` to an existing account balance.
    CreditAccount { stake_address: String, amount: Gold },
    /// Add `amount` to both lifetime earnings counters of an existing Mek.
    RecordEarnings { asset_id: String, amount: Gold },
    /// Set or clear the slot an existing Mek is assigned to. The stored
    /// assignment must equal `expected`.
    SetMekAssignment {
        asset_id: String,
        expected: Option<SlotRef>,
        slot: Option<SlotRef>,
    },
    /// Persist a Mek's base daily rate.
    SetMekBaseRate { asset_id: String, rate: Gold },
}

/// An ordered batch of `LedgerOp`s applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerTransaction {
    ops: Vec<LedgerOp>,
}

impl LedgerTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_slot(mut self, slot: JobSlot, expected_revision: Option<u64>) -> Self {
        self.ops.push(LedgerOp::PutSlot {
            slot,
            expected_revision,
        });
        self
    }

    pub fn credit_account(mut self, stake_address: &str, amount: Gold) -> Self {
        self.ops.push(LedgerOp::CreditAccount {
            stake_address: stake_address.to_string(),
            amount,
        });
        self
    }

    pub fn record_earnings(mut self, asset_id: &str, amount: Gold) -> Self {
        self.ops.push(LedgerOp::RecordEarnings {
            asset_id: asset_id.to_string(),
            amount,
        });
        self
    }

    pub fn set_mek_assignment(
        mut self,
        asset_id: &str,
        expected: Option<SlotRef>,
        slot: Option<SlotRef>,
    ) -> Self {
        self.ops.push(LedgerOp::SetMekAssignment {
            asset_id: asset_id.to_string(),
            expected,
            slot,
        });
        self
    }

    pub fn set_mek_base_rate(mut self, asset_id: &str, rate: Gold) -> Self {
        self.ops.push(LedgerOp::SetMekBaseRate {
            asset_id: asset_id.to_string(),
            rate,
        });
        self
    }

    pub fn ops(&self) -> &[LedgerOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
