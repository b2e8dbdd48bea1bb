// crates/mekgold-cli/src/commands/mod.rs
//
// Command module declarations for the MekGold CLI, plus the slot and owner
// arguments the income and slot commands share.

pub mod income;
pub mod rates;
pub mod slots;

use clap::Args;

use mekgold_rpc::handlers::income::{OwnerRequest, SlotRequest};

/// Identifies one job slot.
#[derive(Debug, Clone, Args)]
pub struct SlotArgs {
    /// Stake address of the slot owner.
    #[arg(long, alias = "owner")]
    pub stake_address: String,
    /// Slot type (e.g. "miner").
    #[arg(long)]
    pub slot_type: String,
    /// Slot index within the type.
    #[arg(long)]
    pub slot_index: u32,
}

impl SlotArgs {
    pub fn request(&self) -> SlotRequest {
        SlotRequest {
            stake_address: self.stake_address.clone(),
            slot_type: self.slot_type.clone(),
            slot_index: self.slot_index,
        }
    }
}

/// Identifies one account.
#[derive(Debug, Clone, Args)]
pub struct OwnerArgs {
    /// Stake address of the account.
    #[arg(long, alias = "owner")]
    pub stake_address: String,
}

impl OwnerArgs {
    pub fn request(&self) -> OwnerRequest {
        OwnerRequest {
            stake_address: self.stake_address.clone(),
        }
    }
}
