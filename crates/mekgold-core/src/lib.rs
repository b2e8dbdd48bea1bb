// crates/mekgold-core/src/lib.rs
//
// mekgold-core: Core types and trait interfaces for the Mek job-slot income engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the persisted records (Meks, job slots, user accounts, the rate
// curve configuration), the fixed-point `Gold` amount, the store-level error
// type, and the `IncomeStore` trait that storage backends implement.

pub mod account;
pub mod error;
pub mod gold;
pub mod ledger;
pub mod mek;
pub mod rate_config;
pub mod slot;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use mekgold_core::JobSlot;`

pub use account::UserAccount;
pub use error::MekGoldError;
pub use gold::{Gold, CENTS_PER_GOLD};
pub use ledger::{LedgerOp, LedgerTransaction};
pub use mek::{Mek, SlotRef, DEFAULT_BASE_DAILY_RATE};
pub use rate_config::{CurveType, RateCurveConfig, RoundingMode};
pub use slot::{JobSlot, SlotKey, SlotState};
pub use traits::IncomeStore;
