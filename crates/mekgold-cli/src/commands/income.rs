// crates/mekgold-cli/src/commands/income.rs
//
// Income commands: preview, collect, collect-all, daily-rate, pending.

use tabled::Tabled;

use mekgold_rpc::handlers::income::{
    CollectAllResponse, CollectResponse, DailyRateResponse, PendingResponse, PreviewResponse,
};

use super::{OwnerArgs, SlotArgs};
use crate::output::{self, OutputFormat};
use crate::rpc_client;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Mek")]
    asset_name: String,
    #[tabled(rename = "Asset")]
    asset_id: String,
    #[tabled(rename = "Days")]
    elapsed_days: String,
    #[tabled(rename = "Pending")]
    pending: String,
}

pub async fn preview(endpoint: &str, format: OutputFormat, cmd: &SlotArgs) -> CmdResult {
    let r: PreviewResponse = rpc_client::call(endpoint, "income/preview", &cmd.request()).await?;
    if format == OutputFormat::Json {
        println!("{}", output::format_json(&r));
        return Ok(());
    }
    if !r.success {
        println!("{}", output::failure(r.error.as_deref(), r.error_kind.as_deref()));
        return Ok(());
    }

    println!("Pending income for {} slot {}", cmd.slot_type, cmd.slot_index);
    println!("-------------------------------");
    println!("  Pending:      {} gold", output::gold(r.pending_amount));
    println!("  Elapsed:      {:.2} days", r.elapsed_days);
    println!("  Base rate:    {} gold/day", output::gold(r.base_daily_rate));
    println!("  Slot level:   {} (x{:.2})", r.slot_level, r.slot_bonus);
    println!("  Tenure:       {} days (x{:.3})", r.tenure_days, r.tenure_bonus);
    if let Some(message) = &r.message {
        println!();
        println!("{}", message);
    }
    Ok(())
}

pub async fn collect(endpoint: &str, format: OutputFormat, cmd: &SlotArgs) -> CmdResult {
    let r: CollectResponse = rpc_client::call(endpoint, "income/collect", &cmd.request()).await?;
    if format == OutputFormat::Json {
        println!("{}", output::format_json(&r));
        return Ok(());
    }
    if !r.success {
        println!("{}", output::failure(r.error.as_deref(), r.error_kind.as_deref()));
        return Ok(());
    }

    println!("Collected {} gold", output::gold(r.collected_amount));
    println!("  New balance:  {} gold", output::gold(r.new_balance));
    println!("  Experience:   +{}", r.experience_gained);
    Ok(())
}

pub async fn collect_all(endpoint: &str, format: OutputFormat, cmd: &OwnerArgs) -> CmdResult {
    let r: CollectAllResponse = rpc_client::call(endpoint, "income/collect_all", &cmd.request()).await?;
    if format == OutputFormat::Json {
        println!("{}", output::format_json(&r));
        return Ok(());
    }
    if !r.success {
        println!("{}", output::failure(r.error.as_deref(), r.error_kind.as_deref()));
        return Ok(());
    }

    println!(
        "Collected {} gold from {} slot(s)",
        output::gold(r.total_collected),
        r.slots_collected
    );
    println!("  New balance:  {} gold", output::gold(r.new_balance));
    println!("  Experience:   +{}", r.total_experience);
    Ok(())
}

pub async fn daily_rate(endpoint: &str, format: OutputFormat, cmd: &OwnerArgs) -> CmdResult {
    let r: DailyRateResponse = rpc_client::call(endpoint, "income/daily_rate", &cmd.request()).await?;
    if format == OutputFormat::Json {
        println!("{}", output::format_json(&r));
        return Ok(());
    }

    println!("Daily income for {}", cmd.stake_address);
    println!("  Rate:         {} gold/day", output::gold(r.total_daily_rate));
    println!("  Active slots: {} of {}", r.active_slots, r.total_slots);
    Ok(())
}

pub async fn pending(endpoint: &str, format: OutputFormat, cmd: &OwnerArgs) -> CmdResult {
    let r: PendingResponse = rpc_client::call(endpoint, "income/pending", &cmd.request()).await?;
    if format == OutputFormat::Json {
        println!("{}", output::format_json(&r));
        return Ok(());
    }

    println!("{}", pending_table(&r));
    println!("Total pending: {} gold", output::gold(r.total_pending));
    Ok(())
}

fn pending_table(r: &PendingResponse) -> String {
    let rows: Vec<PendingRow> = r
        .slots
        .iter()
        .map(|s| PendingRow {
            slot: format!("{} {}", s.slot_type, s.slot_index),
            asset_name: s.asset_name.clone(),
            asset_id: s.asset_id.clone(),
            elapsed_days: format!("{:.2}", s.elapsed_days),
            pending: output::gold(s.pending_amount),
        })
        .collect();
    output::format_table(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mekgold_rpc::handlers::income::SlotPendingInfo;

    #[test]
    fn test_pending_table_rows() {
        let report = PendingResponse {
            total_pending: 245.25,
            slots: vec![SlotPendingInfo {
                slot_type: "miner".to_string(),
                slot_index: 2,
                asset_id: "mek-7".to_string(),
                asset_name: "Mekanism #7".to_string(),
                pending_amount: 245.25,
                elapsed_days: 1.5,
            }],
        };
        let table = pending_table(&report);
        assert!(table.contains("miner 2"));
        assert!(table.contains("Mekanism #7"));
        assert!(table.contains("245.25"));
        assert!(table.contains("1.50"));
    }
}
