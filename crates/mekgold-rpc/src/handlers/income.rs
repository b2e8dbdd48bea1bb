// crates/mekgold-rpc/src/handlers/income.rs
//
// Income handlers: Preview, Collect, CollectAll, DailyRate, Pending.
// Amounts are reported in gold as floating-point values derived from cents.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use mekgold_core::SlotKey;
use mekgold_income::{AggregateReporter, CheckpointCollector};

use super::into_failure;

/// Identifies one slot of one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    /// Stake address of the slot owner (the caller).
    pub stake_address: String,
    pub slot_type: String,
    pub slot_index: u32,
}

impl SlotRequest {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(&self.stake_address, &self.slot_type, self.slot_index)
    }
}

/// Request scoped to one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRequest {
    pub stake_address: String,
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub pending_amount: f64,
    pub elapsed_days: f64,
    pub base_daily_rate: f64,
    pub slot_level: u32,
    pub slot_bonus: f64,
    pub tenure_days: u32,
    pub tenure_bonus: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// Handle a Preview request: pending income of one slot, without collecting.
pub async fn handle_preview(
    reporter: &AggregateReporter,
    request: SlotRequest,
) -> Result<PreviewResponse, String> {
    match reporter.preview_pending(&request.key(), Utc::now()).await {
        Ok(preview) => {
            let a = preview.accrual;
            Ok(PreviewResponse {
                success: true,
                pending_amount: a.pending.to_gold(),
                elapsed_days: a.elapsed_days_display(),
                base_daily_rate: a.base_daily_rate.to_gold(),
                slot_level: a.slot_level,
                slot_bonus: a.slot_bonus(),
                tenure_days: a.tenure_days,
                tenure_bonus: a.tenure_bonus(),
                message: preview.message,
                ..Default::default()
            })
        }
        Err(e) => {
            let f = into_failure(e)?;
            Ok(PreviewResponse {
                error: Some(f.error),
                error_kind: Some(f.error_kind),
                ..Default::default()
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Collect
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectResponse {
    pub success: bool,
    pub collected_amount: f64,
    pub new_balance: f64,
    pub experience_gained: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// Handle a Collect request: settle one slot into the owner's balance.
pub async fn handle_collect(
    collector: &CheckpointCollector,
    request: SlotRequest,
) -> Result<CollectResponse, String> {
    match collector.collect_one(&request.key(), Utc::now()).await {
        Ok(receipt) => Ok(CollectResponse {
            success: true,
            collected_amount: receipt.collected.to_gold(),
            new_balance: receipt.new_balance.to_gold(),
            experience_gained: receipt.experience_gained,
            ..Default::default()
        }),
        Err(e) => {
            let f = into_failure(e)?;
            Ok(CollectResponse {
                error: Some(f.error),
                error_kind: Some(f.error_kind),
                ..Default::default()
            })
        }
    }
}

// ---------------------------------------------------------------------------
// CollectAll
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectAllResponse {
    pub success: bool,
    pub total_collected: f64,
    pub slots_collected: u32,
    pub total_experience: u64,
    pub new_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// Handle a CollectAll request: settle every collectable slot of the owner.
pub async fn handle_collect_all(
    collector: &CheckpointCollector,
    request: OwnerRequest,
) -> Result<CollectAllResponse, String> {
    match collector.collect_all(&request.stake_address, Utc::now()).await {
        Ok(summary) => Ok(CollectAllResponse {
            success: true,
            total_collected: summary.total_collected.to_gold(),
            slots_collected: summary.slots_collected,
            total_experience: summary.total_experience,
            new_balance: summary.new_balance.to_gold(),
            ..Default::default()
        }),
        Err(e) => {
            let f = into_failure(e)?;
            Ok(CollectAllResponse {
                error: Some(f.error),
                error_kind: Some(f.error_kind),
                ..Default::default()
            })
        }
    }
}

// ---------------------------------------------------------------------------
// DailyRate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRateResponse {
    pub total_daily_rate: f64,
    pub active_slots: u32,
    pub total_slots: u32,
}

/// Handle a DailyRate request.
pub async fn handle_daily_rate(
    reporter: &AggregateReporter,
    request: OwnerRequest,
) -> Result<DailyRateResponse, String> {
    let summary = reporter
        .total_daily_rate(&request.stake_address)
        .await
        .map_err(|e| e.to_string())?;
    Ok(DailyRateResponse {
        total_daily_rate: summary.total_daily_rate.to_gold(),
        active_slots: summary.active_slots,
        total_slots: summary.total_slots,
    })
}

// ---------------------------------------------------------------------------
// Pending
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotPendingInfo {
    pub slot_type: String,
    pub slot_index: u32,
    pub asset_id: String,
    pub asset_name: String,
    pub pending_amount: f64,
    pub elapsed_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingResponse {
    pub total_pending: f64,
    pub slots: Vec<SlotPendingInfo>,
}

/// Handle a Pending request: pending income across all of the owner's slots.
pub async fn handle_pending(
    reporter: &AggregateReporter,
    request: OwnerRequest,
) -> Result<PendingResponse, String> {
    let report = reporter
        .all_pending_income(&request.stake_address, Utc::now())
        .await
        .map_err(|e| e.to_string())?;

    Ok(PendingResponse {
        total_pending: report.total_pending.to_gold(),
        slots: report
            .slots
            .into_iter()
            .map(|s| SlotPendingInfo {
                slot_type: s.slot_type,
                slot_index: s.slot_index,
                asset_id: s.asset_id,
                asset_name: s.asset_name,
                pending_amount: s.pending_amount.to_gold(),
                elapsed_days: s.elapsed_days,
            })
            .collect(),
    })
}
