// crates/mekgold-income/src/error.rs
//
// Outcomes of engine operations that are not a success.
//
// Everything except `Store` is an expected business result that the RPC layer
// reports as `success: false` with an `error_kind`. `Store` wraps a fault of
// the persistence layer and is propagated as a request failure.

use thiserror::Error;

use mekgold_core::MekGoldError;

#[derive(Debug, Error)]
pub enum IncomeError {
    /// Slot, Mek or account does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the Mek or slot.
    #[error("{stake_address} does not own Mek {asset_id}")]
    Unauthorized {
        stake_address: String,
        asset_id: String,
    },

    /// The slot holds no Mek.
    #[error("Slot {0} is empty")]
    Empty(String),

    /// Less than `MIN_COLLECT_INTERVAL_MS` since the last checkpoint.
    #[error("Too soon to collect: only {elapsed_ms} ms since the last checkpoint")]
    TooSoon { elapsed_ms: i64 },

    /// The request would not change anything.
    #[error("{0}")]
    NoOp(String),

    /// The Mek already sits in another slot.
    #[error("Mek {asset_id} is already assigned to slot {slot}")]
    AlreadyAssigned { asset_id: String, slot: String },

    /// The slot changed between read and write; nothing was applied.
    #[error("Concurrent update: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(MekGoldError),
}

impl IncomeError {
    /// Stable snake_case identifier used in RPC responses.
    pub fn kind(&self) -> &'static str {
        match self {
            IncomeError::NotFound(_) => "not_found",
            IncomeError::Unauthorized { .. } => "unauthorized",
            IncomeError::Empty(_) => "empty",
            IncomeError::TooSoon { .. } => "too_soon",
            IncomeError::NoOp(_) => "no_op",
            IncomeError::AlreadyAssigned { .. } => "already_assigned",
            IncomeError::Conflict(_) => "conflict",
            IncomeError::Store(_) => "store",
        }
    }

    /// Whether this is a persistence fault rather than an expected outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IncomeError::Store(_))
    }
}

impl From<MekGoldError> for IncomeError {
    fn from(e: MekGoldError) -> Self {
        match e {
            MekGoldError::Conflict(msg) => IncomeError::Conflict(msg),
            MekGoldError::NotFound(msg) => IncomeError::NotFound(msg),
            other => IncomeError::Store(other),
        }
    }
}
