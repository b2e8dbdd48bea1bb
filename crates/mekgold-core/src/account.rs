// crates/mekgold-core/src/account.rs

use serde::{Deserialize, Serialize};

use crate::gold::Gold;

/// A player account keyed by stake address.
///
/// The balance is only ever credited by income settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub stake_address: String,
    #[serde(default)]
    pub gold: Gold,
}

impl UserAccount {
    pub fn new(stake_address: &str) -> Self {
        Self {
            stake_address: stake_address.to_string(),
            gold: Gold::zero(),
        }
    }

    pub fn with_gold(mut self, gold: Gold) -> Self {
        self.gold = gold;
        self
    }
}
