// crates/mekgold-store/src/lib.rs
//
// mekgold-store: Storage layer for the Mek income engine.
//
// Provides a RocksDB-backed `IncomeStore` for the daemon and an in-memory
// `IncomeStore` for tests and ephemeral runs. Both apply ledger transactions
// through the same staging logic, so revision checks and credit semantics
// are identical across backends.

pub mod memory;
pub mod rocks;
mod staging;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::InMemoryStore;
pub use rocks::RocksStore;
