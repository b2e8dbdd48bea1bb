// crates/mekgold-income/src/curve.rs
//
// Rarity rank -> base daily rate.
//
// Rank 1 is the rarest Mek and earns the most. Ranks are normalized onto
// [0, 1] over the configured population:
//
//   n = (rank - 1) / max(1, total - 1), clamped to [0, 1]
//
// Curves (min/max are the configured daily bounds):
//   linear:       max - (max - min) * n
//   exponential:  max * e^(-s * n)
//   logarithmic:  max - (max - min) * ln(1 + s * n) / ln(1 + s)
//   sigmoid:      min + (max - min) / (1 + e^(s * x)),  x = (rank - mid) / (total / 10)
//
// The result is clamped to [min, max] and rounded per the config's rounding
// mode. Without a config the rate falls linearly from 2400/day at rank 1 to
// a floor of 240/day at rank 4000 (about 0.54 per rank step) and stays there.

use serde::{Deserialize, Serialize};

use mekgold_core::rate_config::{CurveType, RateCurveConfig, RoundingMode};

/// Fallback rate for rank 1 when no curve config exists (gold/day).
pub const FALLBACK_MAX_DAILY_RATE: f64 = 2400.0;

/// Fallback floor when no curve config exists (gold/day).
pub const FALLBACK_MIN_DAILY_RATE: f64 = 240.0;

/// Rank at which the fallback reaches its floor.
pub const FALLBACK_TOTAL_MEKS: u32 = 4000;

/// Rank assumed for a Mek without one when no curve config exists.
pub const FALLBACK_DEFAULT_RANK: u32 = 2000;

/// A Mek whose rate should be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MekRank {
    pub asset_id: String,
    #[serde(default)]
    pub rarity_rank: Option<u32>,
}

/// Evaluated base daily rate for a Mek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MekRate {
    pub asset_id: String,
    pub daily_rate: f64,
}

/// Evaluate the base daily rate for a rarity rank.
///
/// Total for every rank: out-of-range ranks clamp, degenerate curve
/// parameters fall back to the linear curve, and the result always lies
/// within the configured bounds.
pub fn evaluate(rarity_rank: u32, config: Option<&RateCurveConfig>) -> f64 {
    match config {
        Some(c) => evaluate_configured(rarity_rank.max(1) as f64, c),
        None => fallback_rate(rarity_rank),
    }
}

/// Evaluate rates for a batch of Meks against one config.
///
/// A Mek without a rank is evaluated at the population midpoint
/// (`total_meks / 2`) when a config exists, and at `FALLBACK_DEFAULT_RANK`
/// otherwise.
pub fn evaluate_rates(meks: &[MekRank], config: Option<&RateCurveConfig>) -> Vec<MekRate> {
    meks.iter()
        .map(|mek| {
            let daily_rate = match (mek.rarity_rank, config) {
                (Some(rank), _) => evaluate(rank, config),
                (None, Some(c)) => evaluate_configured(c.total_meks as f64 / 2.0, c),
                (None, None) => fallback_rate(FALLBACK_DEFAULT_RANK),
            };
            MekRate {
                asset_id: mek.asset_id.clone(),
                daily_rate,
            }
        })
        .collect()
}

/// Linear from 2400 (rank 1) to 240 (rank 4000), rounded to two decimals.
pub fn fallback_rate(rarity_rank: u32) -> f64 {
    let n = normalized_rank(rarity_rank.max(1) as f64, FALLBACK_TOTAL_MEKS);
    let rate = FALLBACK_MAX_DAILY_RATE - (FALLBACK_MAX_DAILY_RATE - FALLBACK_MIN_DAILY_RATE) * n;
    RoundingMode::TwoDecimal.apply(rate.max(FALLBACK_MIN_DAILY_RATE))
}

/// Position of a rank on [0, 1] within a population of `total` ranked Meks.
pub fn normalized_rank(rank: f64, total: u32) -> f64 {
    let span = (total as f64 - 1.0).max(1.0);
    ((rank - 1.0) / span).clamp(0.0, 1.0)
}

fn evaluate_configured(rank: f64, config: &RateCurveConfig) -> f64 {
    let min = config.min_daily_rate();
    let max = config.max_daily_rate();
    let n = normalized_rank(rank, config.total_meks);
    let s = config.steepness;

    let linear = max - (max - min) * n;

    let raw = match config.curve_type {
        CurveType::Linear => linear,
        CurveType::Exponential => max * (-s * n).exp(),
        CurveType::Logarithmic => {
            // ln(1 + 0) = 0: the formula's limit as s -> 0 is the linear curve.
            let denom = (1.0 + s).ln();
            if s > 0.0 && denom > 0.0 {
                max - (max - min) * (1.0 + s * n).ln() / denom
            } else {
                linear
            }
        }
        CurveType::Sigmoid => {
            let scale = (config.total_meks as f64 / 10.0).max(1.0);
            let x = (rank - config.mid_point) / scale;
            let value = 1.0 / (1.0 + (s * x).exp());
            min + (max - min) * value
        }
    };

    let raw = if raw.is_finite() { raw } else { linear };
    let clamped = clamp_rate(raw, min, max);
    clamp_rate(config.rounding_mode().apply(clamped), min, max)
}

/// Clamp into [min, max]. Tolerates `min > max` by clamping to `max` last.
fn clamp_rate(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
