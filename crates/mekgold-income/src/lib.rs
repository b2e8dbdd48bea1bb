// crates/mekgold-income/src/lib.rs
//
// mekgold-income: the income accrual and rate-curve engine.
//
//   curve:     rarity rank -> base daily rate (pure)
//   accrual:   slot + Mek + now -> pending gold (pure, fixed point)
//   collector: assignment lifecycle and checkpoint settlement
//   reporter:  read-only aggregates across a user's slots
//
// All gold amounts are integer cents (`mekgold_core::Gold`). Pending income is
// floored to the cent and never rounded up.

pub mod accrual;
pub mod collector;
pub mod curve;
pub mod error;
pub mod reporter;

// Re-export key types for ergonomic access from downstream crates.
pub use accrual::{
    instantaneous_rate, pending, slot_bonus, tenure_bonus, Accrual, MIN_COLLECT_INTERVAL_MS,
    MS_PER_DAY,
};
pub use collector::{
    experience_for, CheckpointCollector, CollectAllSummary, CollectReceipt, IncomePolicy,
    SlotChange,
};
pub use curve::{evaluate, evaluate_rates, MekRank, MekRate};
pub use error::IncomeError;
pub use reporter::{AggregateReporter, DailyRateSummary, PendingPreview, PendingReport, SlotPending};
