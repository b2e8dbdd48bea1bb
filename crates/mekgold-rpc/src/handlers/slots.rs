// crates/mekgold-rpc/src/handlers/slots.rs
//
// Slot assignment handlers: Assign, Unassign.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use mekgold_core::SlotKey;
use mekgold_income::{CheckpointCollector, IncomeError, SlotChange};

use super::income::SlotRequest;
use super::into_failure;

/// Request to place a Mek into a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub stake_address: String,
    pub slot_type: String,
    pub slot_index: u32,
    pub asset_id: String,
}

/// Response from an assign or unassign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotChangeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Gold settled for the outgoing Mek, when the daemon settles on reassignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

fn slot_change_response(result: Result<SlotChange, IncomeError>) -> Result<SlotChangeResponse, String> {
    match result {
        Ok(change) => Ok(SlotChangeResponse {
            success: true,
            message: Some(change.message),
            settled_amount: change.settled.map(|r| r.collected.to_gold()),
            ..Default::default()
        }),
        Err(e) => {
            let f = into_failure(e)?;
            Ok(SlotChangeResponse {
                error: Some(f.error),
                error_kind: Some(f.error_kind),
                ..Default::default()
            })
        }
    }
}

/// Handle an Assign request.
pub async fn handle_assign(
    collector: &CheckpointCollector,
    request: AssignRequest,
) -> Result<SlotChangeResponse, String> {
    let key = SlotKey::new(&request.stake_address, &request.slot_type, request.slot_index);
    slot_change_response(collector.assign(&key, &request.asset_id, Utc::now()).await)
}

/// Handle an Unassign request.
pub async fn handle_unassign(
    collector: &CheckpointCollector,
    request: SlotRequest,
) -> Result<SlotChangeResponse, String> {
    slot_change_response(collector.unassign(&request.key(), Utc::now()).await)
}
