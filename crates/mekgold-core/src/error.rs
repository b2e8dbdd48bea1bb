// crates/mekgold-core/src/error.rs

use thiserror::Error;

/// Store-level error types for the income engine.
///
/// These describe faults of the persistence layer. Expected business outcomes
/// (too soon to collect, empty slot, ...) live in `mekgold_income::IncomeError`.
#[derive(Debug, Error)]
pub enum MekGoldError {
    /// Storage layer error (RocksDB, lock poisoning).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A record referenced by a transaction does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Optimistic concurrency check failed: the record changed since it was read.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed stored data or an invalid configuration value.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for MekGoldError {
    fn from(e: serde_json::Error) -> Self {
        MekGoldError::Serialization(e.to_string())
    }
}
