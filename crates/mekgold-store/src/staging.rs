// crates/mekgold-store/src/staging.rs
//
// Backend-independent application of a `LedgerTransaction`.
//
// `stage` resolves every op against the current records (loaded lazily through
// the supplied closures), checks slot revisions, Mek assignments and
// checkpoint monotonicity, and returns the full set of records to write.
// Backends call it while holding their commit lock and then persist the
// result in one step.

use std::collections::HashMap;

use mekgold_core::error::MekGoldError;
use mekgold_core::ledger::{LedgerOp, LedgerTransaction};
use mekgold_core::{JobSlot, Mek, SlotKey, UserAccount};

/// Records produced by staging a transaction, ready to be written.
#[derive(Debug, Default)]
pub(crate) struct StagedWrites {
    pub slots: HashMap<SlotKey, JobSlot>,
    pub meks: HashMap<String, Mek>,
    pub accounts: HashMap<String, UserAccount>,
}

pub(crate) fn stage<FS, FM, FA>(
    tx: &LedgerTransaction,
    mut load_slot: FS,
    mut load_mek: FM,
    mut load_account: FA,
) -> Result<StagedWrites, MekGoldError>
where
    FS: FnMut(&SlotKey) -> Result<Option<JobSlot>, MekGoldError>,
    FM: FnMut(&str) -> Result<Option<Mek>, MekGoldError>,
    FA: FnMut(&str) -> Result<Option<UserAccount>, MekGoldError>,
{
    let mut staged = StagedWrites::default();

    for op in tx.ops() {
        match op {
            LedgerOp::PutSlot {
                slot,
                expected_revision,
            } => {
                let key = slot.key();
                let current = match staged.slots.get(&key) {
                    Some(s) => Some(s.clone()),
                    None => load_slot(&key)?,
                };

                let next_revision = match (&current, expected_revision) {
                    (None, None) => 0,
                    (Some(existing), Some(expected)) if existing.revision == *expected => {
                        if let (Some(old), Some(new)) =
                            (existing.last_checkpoint, slot.last_checkpoint)
                        {
                            if new < old {
                                return Err(MekGoldError::InvalidState(format!(
                                    "Checkpoint for slot {} would move backwards",
                                    key
                                )));
                            }
                        }
                        existing.revision + 1
                    }
                    (Some(existing), _) => {
                        return Err(MekGoldError::Conflict(format!(
                            "Slot {} of {} is at revision {}, expected {:?}",
                            key, key.owner, existing.revision, expected_revision
                        )));
                    }
                    (None, Some(expected)) => {
                        return Err(MekGoldError::Conflict(format!(
                            "Slot {} of {} no longer exists (expected revision {})",
                            key, key.owner, expected
                        )));
                    }
                };

                let mut written = slot.clone();
                written.revision = next_revision;
                staged.slots.insert(key, written);
            }
            LedgerOp::CreditAccount {
                stake_address,
                amount,
            } => {
                let account = staged_account(&mut staged, stake_address, &mut load_account)?;
                account.gold += *amount;
            }
            LedgerOp::RecordEarnings { asset_id, amount } => {
                let mek = staged_mek(&mut staged, asset_id, &mut load_mek)?;
                mek.lifetime_earnings_total += *amount;
                mek.lifetime_earnings_current_owner += *amount;
            }
            LedgerOp::SetMekAssignment {
                asset_id,
                expected,
                slot,
            } => {
                let mek = staged_mek(&mut staged, asset_id, &mut load_mek)?;
                if mek.assigned_slot != *expected {
                    return Err(MekGoldError::Conflict(format!(
                        "Mek {} is assigned to {:?}, expected {:?}",
                        asset_id, mek.assigned_slot, expected
                    )));
                }
                mek.assigned_slot = slot.clone();
            }
            LedgerOp::SetMekBaseRate { asset_id, rate } => {
                let mek = staged_mek(&mut staged, asset_id, &mut load_mek)?;
                mek.base_daily_rate = Some(*rate);
            }
        }
    }

    Ok(staged)
}

fn staged_mek<'a, FM>(
    staged: &'a mut StagedWrites,
    asset_id: &str,
    load_mek: &mut FM,
) -> Result<&'a mut Mek, MekGoldError>
where
    FM: FnMut(&str) -> Result<Option<Mek>, MekGoldError>,
{
    if !staged.meks.contains_key(asset_id) {
        let mek = load_mek(asset_id)?
            .ok_or_else(|| MekGoldError::NotFound(format!("Mek {}", asset_id)))?;
        staged.meks.insert(asset_id.to_string(), mek);
    }
    staged
        .meks
        .get_mut(asset_id)
        .ok_or_else(|| MekGoldError::NotFound(format!("Mek {}", asset_id)))
}

fn staged_account<'a, FA>(
    staged: &'a mut StagedWrites,
    stake_address: &str,
    load_account: &mut FA,
) -> Result<&'a mut UserAccount, MekGoldError>
where
    FA: FnMut(&str) -> Result<Option<UserAccount>, MekGoldError>,
{
    if !staged.accounts.contains_key(stake_address) {
        let account = load_account(stake_address)?
            .ok_or_else(|| MekGoldError::NotFound(format!("Account {}", stake_address)))?;
        staged.accounts.insert(stake_address.to_string(), account);
    }
    staged
        .accounts
        .get_mut(stake_address)
        .ok_or_else(|| MekGoldError::NotFound(format!("Account {}", stake_address)))
}
