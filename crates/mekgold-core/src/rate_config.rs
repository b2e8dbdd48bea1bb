// crates/mekgold-core/src/rate_config.rs
//
// Rate curve configuration, authored by the admin tool and read-only to the
// engine. Bounds are stored in gold per hour (the unit the admin tool edits);
// the engine works in gold per day.

use serde::{Deserialize, Serialize};

use crate::error::MekGoldError;

/// Hours per day, used to convert hourly bounds into daily rates.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Hourly lower bound applied when the config omits one.
pub const DEFAULT_MIN_GOLD_PER_HOUR: f64 = 10.0;

/// Hourly upper bound applied when the config omits one.
pub const DEFAULT_MAX_GOLD_PER_HOUR: f64 = 100.0;

/// Shape of the rank → rate curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
    Sigmoid,
}

/// Precision the evaluated rate is rounded to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingMode {
    #[serde(rename = "whole")]
    Whole,
    #[serde(rename = "1decimal")]
    OneDecimal,
    #[default]
    #[serde(rename = "2decimal")]
    TwoDecimal,
}

impl RoundingMode {
    /// Round half away from zero at this precision.
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            RoundingMode::Whole => value.round(),
            RoundingMode::OneDecimal => (value * 10.0).round() / 10.0,
            RoundingMode::TwoDecimal => (value * 100.0).round() / 100.0,
        }
    }
}

/// The rate curve configuration. Exactly one is current at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurveConfig {
    pub curve_type: CurveType,
    /// Lower bound in gold per hour. `None` → `DEFAULT_MIN_GOLD_PER_HOUR`.
    #[serde(default)]
    pub min_gold: Option<f64>,
    /// Upper bound in gold per hour. `None` → `DEFAULT_MAX_GOLD_PER_HOUR`.
    #[serde(default)]
    pub max_gold: Option<f64>,
    /// Curve steepness (>= 0).
    #[serde(default)]
    pub steepness: f64,
    /// Rank the sigmoid curve centers on.
    #[serde(default)]
    pub mid_point: f64,
    /// Population size used to normalize ranks.
    pub total_meks: u32,
    #[serde(default)]
    pub rounding: Option<RoundingMode>,
    #[serde(default = "default_is_current")]
    pub is_current: bool,
}

fn default_is_current() -> bool {
    true
}

impl RateCurveConfig {
    pub fn new(curve_type: CurveType, min_gold: f64, max_gold: f64, total_meks: u32) -> Self {
        Self {
            curve_type,
            min_gold: Some(min_gold),
            max_gold: Some(max_gold),
            steepness: 0.0,
            mid_point: total_meks as f64 / 2.0,
            total_meks,
            rounding: None,
            is_current: true,
        }
    }

    pub fn with_steepness(mut self, steepness: f64) -> Self {
        self.steepness = steepness;
        self
    }

    pub fn with_mid_point(mut self, mid_point: f64) -> Self {
        self.mid_point = mid_point;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = Some(rounding);
        self
    }

    pub fn min_daily_rate(&self) -> f64 {
        self.min_gold.unwrap_or(DEFAULT_MIN_GOLD_PER_HOUR) * HOURS_PER_DAY
    }

    pub fn max_daily_rate(&self) -> f64 {
        self.max_gold.unwrap_or(DEFAULT_MAX_GOLD_PER_HOUR) * HOURS_PER_DAY
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding.unwrap_or_default()
    }

    /// Check the invariants the evaluator relies on.
    ///
    /// # Errors
    /// Returns `MekGoldError::InvalidState` for non-finite values, a negative
    /// steepness, a negative lower bound, or `min > max`.
    pub fn validate(&self) -> Result<(), MekGoldError> {
        let min = self.min_daily_rate();
        let max = self.max_daily_rate();
        if !min.is_finite() || !max.is_finite() {
            return Err(MekGoldError::InvalidState(
                "Rate bounds must be finite".to_string(),
            ));
        }
        if min < 0.0 {
            return Err(MekGoldError::InvalidState(format!(
                "Minimum daily rate {} is negative",
                min
            )));
        }
        if min > max {
            return Err(MekGoldError::InvalidState(format!(
                "Minimum daily rate {} exceeds maximum daily rate {}",
                min, max
            )));
        }
        if !self.steepness.is_finite() || self.steepness < 0.0 {
            return Err(MekGoldError::InvalidState(format!(
                "Steepness must be a finite value >= 0, got {}",
                self.steepness
            )));
        }
        if !self.mid_point.is_finite() {
            return Err(MekGoldError::InvalidState(
                "Sigmoid mid point must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
