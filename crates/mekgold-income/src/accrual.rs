// crates/mekgold-income/src/accrual.rs
//
// Pending income of a single slot.
//
//   elapsed_days = (now - max(last_checkpoint, assigned_at)) / ms_per_day
//   slot_bonus   = 1 + (slot_level - 1) * 0.01
//   tenure_bonus = 1 + min(tenure_days * 0.005, 0.5)
//   pending      = base_daily_rate * elapsed_days * slot_bonus * tenure_bonus
//
// Evaluated in integer arithmetic: both bonuses are exact ratios
// ((99 + level) / 100 and (1000 + min(5 * tenure, 500)) / 1000), so
//
//   pending_cents = floor(rate_cents * elapsed_ms * slot_num * tenure_num
//                         / (MS_PER_DAY * 100 * 1000))
//
// is the exact floor of the real-valued formula at cent precision.

use chrono::{DateTime, Utc};

use mekgold_core::{Gold, JobSlot, Mek};

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Minimum time between collections of one slot: 0.001 day (86.4 s).
pub const MIN_COLLECT_INTERVAL_MS: i64 = MS_PER_DAY / 1000;

const SLOT_BONUS_SCALE: u128 = 100;
const TENURE_BONUS_SCALE: u128 = 1000;
/// Tenure bonus per day in thousandths (0.5%).
const TENURE_BONUS_PER_DAY: u128 = 5;
/// Tenure bonus cap in thousandths (+50%).
const TENURE_BONUS_CAP: u128 = 500;

/// Multiplier from the slot's own level: +1% per level above 1.
pub fn slot_bonus(slot_level: u32) -> f64 {
    slot_bonus_numerator(slot_level) as f64 / SLOT_BONUS_SCALE as f64
}

/// Multiplier from tenure: +0.5% per day, capped at +50%.
pub fn tenure_bonus(tenure_days: u32) -> f64 {
    tenure_bonus_numerator(tenure_days) as f64 / TENURE_BONUS_SCALE as f64
}

fn slot_bonus_numerator(slot_level: u32) -> u128 {
    SLOT_BONUS_SCALE + slot_level.max(1) as u128 - 1
}

fn tenure_bonus_numerator(tenure_days: u32) -> u128 {
    TENURE_BONUS_SCALE + (tenure_days as u128 * TENURE_BONUS_PER_DAY).min(TENURE_BONUS_CAP)
}

/// Daily rate with bonuses applied, scaled by `SLOT_BONUS_SCALE * TENURE_BONUS_SCALE`.
pub(crate) fn scaled_daily_rate(slot: &JobSlot, mek: &Mek) -> u128 {
    mek.effective_daily_rate().cents as u128
        * slot_bonus_numerator(slot.slot_level)
        * tenure_bonus_numerator(slot.tenure_days)
}

pub(crate) fn unscale(scaled: u128) -> Gold {
    let cents = scaled / (SLOT_BONUS_SCALE * TENURE_BONUS_SCALE);
    Gold::from_cents(u64::try_from(cents).unwrap_or(u64::MAX))
}

/// Instantaneous earning rate of a slot in gold/day: base rate times bonuses,
/// floored to the cent.
pub fn instantaneous_rate(slot: &JobSlot, mek: &Mek) -> Gold {
    unscale(scaled_daily_rate(slot, mek))
}

/// Result of evaluating a slot's pending income at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Accrual {
    /// Income accrued since the checkpoint, floored to the cent.
    pub pending: Gold,
    /// Milliseconds since the accrual anchor, never negative.
    pub elapsed_ms: i64,
    pub base_daily_rate: Gold,
    pub slot_level: u32,
    pub tenure_days: u32,
}

impl Accrual {
    /// An accrual of nothing, carrying the slot's stats.
    pub fn none(slot: &JobSlot) -> Self {
        Self {
            pending: Gold::zero(),
            elapsed_ms: 0,
            base_daily_rate: Gold::zero(),
            slot_level: slot.slot_level,
            tenure_days: slot.tenure_days,
        }
    }

    pub fn elapsed_days(&self) -> f64 {
        self.elapsed_ms as f64 / MS_PER_DAY as f64
    }

    /// Elapsed days floored to two decimals, for reporting.
    pub fn elapsed_days_display(&self) -> f64 {
        (self.elapsed_ms.max(0) as f64 * 100.0 / MS_PER_DAY as f64).floor() / 100.0
    }

    pub fn slot_bonus(&self) -> f64 {
        slot_bonus(self.slot_level)
    }

    pub fn tenure_bonus(&self) -> f64 {
        tenure_bonus(self.tenure_days)
    }

    /// Whether enough time has passed for the slot to be collected.
    pub fn is_collectable(&self) -> bool {
        self.elapsed_ms >= MIN_COLLECT_INTERVAL_MS
    }
}

/// Compute the pending income of `slot` at `now`.
///
/// An empty slot, a missing Mek, or a Mek that is not the one the slot
/// references yields a zero accrual. A `now` before the checkpoint (clock
/// skew) counts as zero elapsed time.
pub fn pending(slot: &JobSlot, mek: Option<&Mek>, now: DateTime<Utc>) -> Accrual {
    let mek = match (slot.assigned_mek_id.as_deref(), mek) {
        (Some(id), Some(m)) if m.asset_id == id => m,
        _ => return Accrual::none(slot),
    };

    let anchor = slot.accrual_anchor().unwrap_or(now);
    let elapsed_ms = (now - anchor).num_milliseconds().max(0);

    let numerator = scaled_daily_rate(slot, mek) * elapsed_ms as u128;
    let pending = unscale(numerator / MS_PER_DAY as u128);

    Accrual {
        pending,
        elapsed_ms,
        base_daily_rate: mek.effective_daily_rate(),
        slot_level: slot.slot_level,
        tenure_days: slot.tenure_days,
    }
}
