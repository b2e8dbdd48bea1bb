// crates/mekgold-cli/src/commands/slots.rs
//
// `mekgold assign` and `mekgold unassign`: move Meks in and out of job slots.

use clap::Args;

use mekgold_rpc::handlers::slots::{AssignRequest, SlotChangeResponse};

use super::SlotArgs;
use crate::output::{self, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Args)]
pub struct AssignCmd {
    #[command(flatten)]
    pub slot: SlotArgs,
    /// Asset id of the Mek to place in the slot.
    #[arg(long)]
    pub asset_id: String,
}

impl AssignCmd {
    fn request(&self) -> AssignRequest {
        AssignRequest {
            stake_address: self.slot.stake_address.clone(),
            slot_type: self.slot.slot_type.clone(),
            slot_index: self.slot.slot_index,
            asset_id: self.asset_id.clone(),
        }
    }
}

pub async fn assign(endpoint: &str, format: OutputFormat, cmd: &AssignCmd) -> Result<(), Box<dyn std::error::Error>> {
    let response: SlotChangeResponse = rpc_client::call(endpoint, "slots/assign", &cmd.request()).await?;
    print_change(format, &response);
    Ok(())
}

pub async fn unassign(endpoint: &str, format: OutputFormat, cmd: &SlotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let response: SlotChangeResponse = rpc_client::call(endpoint, "slots/unassign", &cmd.request()).await?;
    print_change(format, &response);
    Ok(())
}

fn print_change(format: OutputFormat, response: &SlotChangeResponse) {
    if format == OutputFormat::Json {
        println!("{}", output::format_json(response));
        return;
    }
    if !response.success {
        println!(
            "{}",
            output::failure(response.error.as_deref(), response.error_kind.as_deref())
        );
        return;
    }
    if let Some(message) = &response.message {
        println!("{}", message);
    }
    if let Some(settled) = response.settled_amount {
        println!("  Settled: {} gold", output::gold(settled));
    }
}
