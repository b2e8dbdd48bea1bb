// crates/mekgold-cli/src/commands/rates.rs
//
// `mekgold rates ASSET[:RANK]...` evaluates base daily rates against the
// daemon's published curve.

use clap::Args;
use tabled::Tabled;

use mekgold_income::MekRank;
use mekgold_rpc::handlers::rates::{EvaluateRatesRequest, EvaluateRatesResponse};

use crate::output::{self, OutputFormat};
use crate::rpc_client;

#[derive(Debug, Args)]
pub struct RatesCmd {
    /// Meks to evaluate, as `asset_id` or `asset_id:rank`.
    #[arg(required = true, value_parser = parse_mek_rank)]
    pub meks: Vec<MekRank>,
}

/// Parse `asset_id[:rank]`.
pub fn parse_mek_rank(s: &str) -> Result<MekRank, String> {
    match s.rsplit_once(':') {
        Some((asset_id, rank)) if !asset_id.is_empty() => {
            let rank = rank
                .parse::<u32>()
                .map_err(|e| format!("invalid rank '{}': {}", rank, e))?;
            Ok(MekRank {
                asset_id: asset_id.to_string(),
                rarity_rank: Some(rank),
            })
        }
        Some(_) => Err(format!("missing asset id in '{}'", s)),
        None if s.is_empty() => Err("empty asset id".to_string()),
        None => Ok(MekRank {
            asset_id: s.to_string(),
            rarity_rank: None,
        }),
    }
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Asset")]
    asset_id: String,
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "Gold/day")]
    daily_rate: String,
}

/// Run the rates subcommand.
pub async fn run(endpoint: &str, format: OutputFormat, cmd: &RatesCmd) -> Result<(), Box<dyn std::error::Error>> {
    let request = EvaluateRatesRequest {
        meks: cmd.meks.clone(),
    };
    let response: EvaluateRatesResponse = rpc_client::call(endpoint, "rates/evaluate", &request).await?;

    if format == OutputFormat::Json {
        println!("{}", output::format_json(&response));
        return Ok(());
    }

    let rows: Vec<RateRow> = response
        .rates
        .iter()
        .zip(cmd.meks.iter())
        .map(|(rate, mek)| RateRow {
            asset_id: rate.asset_id.clone(),
            rank: mek
                .rarity_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            daily_rate: output::gold(rate.daily_rate),
        })
        .collect();
    println!("{}", output::format_table(&rows));
    if !response.configured {
        println!("No rate curve published; rates come from the fallback curve.");
    }
    Ok(())
}
