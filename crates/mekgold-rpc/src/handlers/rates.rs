// crates/mekgold-rpc/src/handlers/rates.rs
//
// Rate curve handlers: EvaluateRates.

use serde::{Deserialize, Serialize};

use mekgold_core::IncomeStore;
use mekgold_income::{evaluate_rates, MekRank, MekRate};

/// Request to evaluate base daily rates for a batch of Meks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRatesRequest {
    pub meks: Vec<MekRank>,
}

/// Evaluated rates, in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRatesResponse {
    pub rates: Vec<MekRate>,
    /// Whether a published curve config was used (otherwise the fallback curve).
    pub configured: bool,
}

/// Handle an EvaluateRates request against the current curve config.
pub async fn handle_evaluate_rates(
    store: &dyn IncomeStore,
    request: EvaluateRatesRequest,
) -> Result<EvaluateRatesResponse, String> {
    let config = store
        .current_rate_config()
        .await
        .map_err(|e| format!("Failed to load rate config: {}", e))?;

    Ok(EvaluateRatesResponse {
        rates: evaluate_rates(&request.meks, config.as_ref()),
        configured: config.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mekgold_core::{CurveType, RateCurveConfig};
    use mekgold_store::InMemoryStore;

    fn ranks(ranks: &[Option<u32>]) -> Vec<MekRank> {
        ranks
            .iter()
            .enumerate()
            .map(|(i, r)| MekRank {
                asset_id: format!("mek-{}", i),
                rarity_rank: *r,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fallback_without_config() {
        let store = InMemoryStore::new();
        let resp = handle_evaluate_rates(
            &store,
            EvaluateRatesRequest {
                meks: ranks(&[Some(1), Some(4500)]),
            },
        )
        .await
        .unwrap();
        assert!(!resp.configured);
        assert_eq!(resp.rates[0].daily_rate, 2400.0);
        assert_eq!(resp.rates[1].daily_rate, 240.0);
    }

    #[tokio::test]
    async fn test_uses_current_config() {
        let store = InMemoryStore::new();
        store
            .put_rate_config(&RateCurveConfig::new(CurveType::Linear, 10.0, 100.0, 10))
            .await
            .unwrap();
        let resp = handle_evaluate_rates(
            &store,
            EvaluateRatesRequest {
                meks: ranks(&[Some(1), Some(10)]),
            },
        )
        .await
        .unwrap();
        assert!(resp.configured);
        assert_eq!(resp.rates[0].asset_id, "mek-0");
        assert_eq!(resp.rates[0].daily_rate, 2400.0);
        assert_eq!(resp.rates[1].daily_rate, 240.0);
    }
}
