// crates/mekgold-cli/src/main.rs
//
// CLI entrypoint for the MekGold operator tools.
//
// Talks to a running mekgold-daemon over JSON-RPC: evaluate rates, manage
// slot assignments, preview and collect income.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::rates::RatesCmd;
use commands::slots::AssignCmd;
use commands::{OwnerArgs, SlotArgs};
use output::OutputFormat;

/// MekGold CLI: job-slot income tools.
#[derive(Parser, Debug)]
#[command(
    name = "mekgold",
    version = "0.1.0",
    about = "MekGold CLI for Mek job-slot income accrual and collection"
)]
struct Cli {
    /// RPC endpoint for the mekgold-daemon.
    #[arg(long, global = true, default_value = "http://localhost:50051")]
    rpc: String,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate base daily rates for Meks by rarity rank.
    Rates(RatesCmd),

    /// Show the income a slot has accrued since its last checkpoint.
    Preview(SlotArgs),

    /// Collect one slot's pending income.
    Collect(SlotArgs),

    /// Collect every collectable slot of an account.
    CollectAll(OwnerArgs),

    /// Place a Mek into a job slot.
    Assign(AssignCmd),

    /// Remove the Mek from a job slot.
    Unassign(SlotArgs),

    /// Show an account's combined gold per day.
    DailyRate(OwnerArgs),

    /// List pending income across an account's occupied slots.
    Pending(OwnerArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);
    let rpc = cli.rpc.as_str();

    match &cli.command {
        Commands::Rates(cmd) => commands::rates::run(rpc, format, cmd).await?,
        Commands::Preview(cmd) => commands::income::preview(rpc, format, cmd).await?,
        Commands::Collect(cmd) => commands::income::collect(rpc, format, cmd).await?,
        Commands::CollectAll(cmd) => commands::income::collect_all(rpc, format, cmd).await?,
        Commands::Assign(cmd) => commands::slots::assign(rpc, format, cmd).await?,
        Commands::Unassign(cmd) => commands::slots::unassign(rpc, format, cmd).await?,
        Commands::DailyRate(cmd) => commands::income::daily_rate(rpc, format, cmd).await?,
        Commands::Pending(cmd) => commands::income::pending(rpc, format, cmd).await?,
    }

    Ok(())
}
