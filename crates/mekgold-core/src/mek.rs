// crates/mekgold-core/src/mek.rs

use serde::{Deserialize, Serialize};

use crate::gold::Gold;

/// Base daily rate for a Mek that has no stored rate yet: 100 gold/day.
pub const DEFAULT_BASE_DAILY_RATE: Gold = Gold { cents: 10_000 };

/// The slot a Mek currently sits in, scoped to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub slot_type: String,
    pub slot_index: u32,
}

/// A Mek: the owned asset placed in a job slot to earn gold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mek {
    /// Immutable, globally unique asset id.
    pub asset_id: String,
    /// Stake address of the current owner.
    pub owner: String,
    /// Canonical asset name.
    pub asset_name: String,
    /// Optional owner-chosen name. Preferred for display.
    #[serde(default)]
    pub custom_name: Option<String>,
    /// 1-based rarity rank (1 = rarest).
    #[serde(default)]
    pub rarity_rank: Option<u32>,
    /// Base earning rate in gold/day, derived from the rate curve and persisted
    /// so accrual does not re-evaluate the curve on every read.
    #[serde(default)]
    pub base_daily_rate: Option<Gold>,
    /// Slot this Mek is assigned to, if any.
    #[serde(default)]
    pub assigned_slot: Option<SlotRef>,
    /// Gold earned across all owners.
    #[serde(default)]
    pub lifetime_earnings_total: Gold,
    /// Gold earned for the current owner.
    #[serde(default)]
    pub lifetime_earnings_current_owner: Gold,
}

impl Mek {
    pub fn new(asset_id: &str, owner: &str, asset_name: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            owner: owner.to_string(),
            asset_name: asset_name.to_string(),
            custom_name: None,
            rarity_rank: None,
            base_daily_rate: None,
            assigned_slot: None,
            lifetime_earnings_total: Gold::zero(),
            lifetime_earnings_current_owner: Gold::zero(),
        }
    }

    pub fn with_rarity_rank(mut self, rank: u32) -> Self {
        self.rarity_rank = Some(rank);
        self
    }

    pub fn with_base_daily_rate(mut self, rate: Gold) -> Self {
        self.base_daily_rate = Some(rate);
        self
    }

    /// Stored base rate, or `DEFAULT_BASE_DAILY_RATE` when none is stored.
    pub fn effective_daily_rate(&self) -> Gold {
        self.base_daily_rate.unwrap_or(DEFAULT_BASE_DAILY_RATE)
    }

    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.asset_name)
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_slot.is_some()
    }
}
