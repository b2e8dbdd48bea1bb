// crates/mekgold-core/src/slot.rs
//
// Job slots: the unit of accrual.
//
// Slot lifecycle:
//   Empty --assign--> Assigned --unassign--> Empty
//   Assigned --assign(other Mek)--> Assigned (tenure and checkpoint reset)
//
// A slot record is created lazily on its first assignment and is never
// deleted; unassigning clears the Mek but keeps level and experience.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique key of a job slot: `(owner, slot_type, slot_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    /// Stake address of the slot owner.
    pub owner: String,
    pub slot_type: String,
    pub slot_index: u32,
}

impl SlotKey {
    pub fn new(owner: &str, slot_type: &str, slot_index: u32) -> Self {
        Self {
            owner: owner.to_string(),
            slot_type: slot_type.to_string(),
            slot_index,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.slot_type, self.slot_index)
    }
}

/// Whether a slot currently holds a Mek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Assigned,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Empty => write!(f, "Empty"),
            SlotState::Assigned => write!(f, "Assigned"),
        }
    }
}

/// A persisted job slot record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSlot {
    pub owner: String,
    pub slot_type: String,
    pub slot_index: u32,
    /// Asset id of the assigned Mek. `Some` iff the slot is Assigned.
    #[serde(default)]
    pub assigned_mek_id: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    /// Point up to which income has been settled. Never moves backwards.
    #[serde(default)]
    pub last_checkpoint: Option<DateTime<Utc>>,
    /// Progression level of the slot itself, starting at 1.
    pub slot_level: u32,
    #[serde(default)]
    pub slot_xp: u64,
    #[serde(default)]
    pub last_xp_update: Option<DateTime<Utc>>,
    /// Consecutive days the current Mek has held this slot.
    #[serde(default)]
    pub tenure_days: u32,
    #[serde(default)]
    pub pit_stops_completed: u32,
    /// Optimistic-concurrency revision, maintained by the store.
    #[serde(default)]
    pub revision: u64,
}

impl JobSlot {
    /// A freshly created slot holding `asset_id`, checkpointed at `now`.
    pub fn new_assigned(key: &SlotKey, asset_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            owner: key.owner.clone(),
            slot_type: key.slot_type.clone(),
            slot_index: key.slot_index,
            assigned_mek_id: Some(asset_id.to_string()),
            assigned_at: Some(now),
            last_checkpoint: Some(now),
            slot_level: 1,
            slot_xp: 0,
            last_xp_update: Some(now),
            tenure_days: 0,
            pit_stops_completed: 0,
            revision: 0,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(&self.owner, &self.slot_type, self.slot_index)
    }

    pub fn state(&self) -> SlotState {
        if self.assigned_mek_id.is_some() {
            SlotState::Assigned
        } else {
            SlotState::Empty
        }
    }

    /// The timestamp accrual is measured from: the later of the last
    /// checkpoint and the assignment time, or `None` if neither is set.
    pub fn accrual_anchor(&self) -> Option<DateTime<Utc>> {
        match (self.last_checkpoint, self.assigned_at) {
            (Some(c), Some(a)) => Some(c.max(a)),
            (Some(c), None) => Some(c),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }
}
