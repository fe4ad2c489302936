use analysis_core::numeric::{as_percent, present, round2};
use analysis_core::{
    AnalysisError, FairValueAnalyzer, FundamentalSummary, Fundamentals, ModelKey, Valuation,
    ValuationMethodResult,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::health::assess_financial_health;
use crate::models;
use crate::rating::compute_overall_rating;

/// Aggregation weights. DCF is trusted most, PER/PBR are market-based, PEG
/// and Graham are supporting views.
pub fn model_weight(key: ModelKey) -> f64 {
    match key {
        ModelKey::DcfBased => 0.30,
        ModelKey::PerBased => 0.25,
        ModelKey::PbrBased => 0.15,
        ModelKey::PegBased => 0.15,
        ModelKey::Graham => 0.15,
    }
}

/// Stateless valuation engine: runs every applicable pricing model against a
/// fundamentals snapshot and folds the results into a fair value and rating.
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Value `ticker` from its latest snapshot. Fails with
    /// [`AnalysisError::InsufficientData`] only when there is no snapshot at
    /// all; skipped models simply do not appear in the result.
    pub fn calculate_valuation(
        &self,
        ticker: &str,
        snapshot: Option<&Fundamentals>,
    ) -> Result<Valuation, AnalysisError> {
        let fundamentals = match snapshot {
            Some(f) => f,
            None => {
                tracing::warn!("{}: no fundamentals snapshot, cannot value", ticker);
                return Err(AnalysisError::InsufficientData(
                    "No fundamental data available".to_string(),
                ));
            }
        };

        let current_price = fundamentals.current_price;

        let valuations: BTreeMap<ModelKey, ValuationMethodResult> = ModelKey::ALL
            .iter()
            .filter_map(|&key| models::evaluate(key, fundamentals).map(|result| (key, result)))
            .collect();

        let average_fair_value = self.weighted_fair_value(&valuations);
        let overall_rating = compute_overall_rating(current_price, average_fair_value, fundamentals);

        let upside_potential = match (present(average_fair_value), present(current_price)) {
            (Some(fair), Some(price)) => Some(round2((fair - price) / price * 100.0)),
            _ => None,
        };

        tracing::debug!(
            "{}: {} of {} models, fair value {:?}, upside {:?}%",
            ticker,
            valuations.len(),
            ModelKey::ALL.len(),
            average_fair_value,
            upside_potential
        );

        Ok(Valuation {
            ticker: ticker.to_string(),
            current_price,
            valuations,
            average_fair_value: present(average_fair_value).map(round2),
            upside_potential,
            overall_rating,
            fundamental_summary: self.fundamental_summary(fundamentals),
            financial_health: assess_financial_health(fundamentals),
        })
    }

    /// Value `ticker` against the most recent of its snapshots.
    pub fn value_latest(
        &self,
        ticker: &str,
        snapshots: &[Fundamentals],
    ) -> Result<Valuation, AnalysisError> {
        self.calculate_valuation(ticker, latest_snapshot(ticker, snapshots))
    }

    /// Weighted mean of the (rounded) fair values that were produced. The
    /// divisor is the total weight of the contributing models only.
    pub fn weighted_fair_value(
        &self,
        valuations: &BTreeMap<ModelKey, ValuationMethodResult>,
    ) -> Option<f64> {
        let (weighted_sum, total_weight) = valuations.iter().fold(
            (0.0, 0.0),
            |(sum, total), (key, result)| {
                let weight = model_weight(*key);
                (sum + result.fair_value * weight, total + weight)
            },
        );

        if total_weight > 0.0 {
            Some(weighted_sum / total_weight)
        } else {
            None
        }
    }

    pub fn fundamental_summary(&self, fundamentals: &Fundamentals) -> FundamentalSummary {
        FundamentalSummary {
            market_cap: fundamentals.market_cap,
            pe_ratio: fundamentals.pe_ratio,
            forward_pe: fundamentals.forward_pe,
            pb_ratio: fundamentals.pb_ratio,
            ps_ratio: fundamentals.ps_ratio,
            ev_ebitda: fundamentals.ev_ebitda,
            roe: as_percent(fundamentals.roe),
            profit_margin: as_percent(fundamentals.profit_margin),
            revenue_growth: as_percent(fundamentals.revenue_growth),
            eps: fundamentals.eps,
            dividend_yield: as_percent(fundamentals.dividend_yield),
        }
    }
}

/// Most recent snapshot for `ticker` (case-insensitive). Snapshots without a
/// date rank below dated ones.
pub fn latest_snapshot<'a>(ticker: &str, snapshots: &'a [Fundamentals]) -> Option<&'a Fundamentals> {
    snapshots
        .iter()
        .filter(|f| f.ticker.eq_ignore_ascii_case(ticker))
        .max_by_key(|f| f.date)
}

#[async_trait]
impl FairValueAnalyzer for ValuationEngine {
    async fn value(
        &self,
        ticker: &str,
        snapshot: Option<&Fundamentals>,
    ) -> Result<Valuation, AnalysisError> {
        self.calculate_valuation(ticker, snapshot)
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Assessment;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn method(fair_value: f64) -> ValuationMethodResult {
        ValuationMethodResult::new("test", fair_value, Assessment::NotAvailable)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = ModelKey::ALL.iter().map(|k| model_weight(*k)).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_mean_over_available_models() {
        let engine = ValuationEngine::new();
        let mut valuations = BTreeMap::new();
        valuations.insert(ModelKey::PerBased, method(100.0));
        valuations.insert(ModelKey::Graham, method(120.0));

        // (100*0.25 + 120*0.15) / 0.40
        let avg = engine.weighted_fair_value(&valuations).unwrap();
        assert_relative_eq!(avg, 107.5, epsilon = 1e-9);
    }

    #[test]
    fn test_weighted_mean_empty_is_none() {
        let engine = ValuationEngine::new();
        assert!(engine.weighted_fair_value(&BTreeMap::new()).is_none());
    }

    #[test]
    fn test_single_model_average_equals_its_value() {
        let engine = ValuationEngine::new();
        let mut valuations = BTreeMap::new();
        valuations.insert(ModelKey::DcfBased, method(42.0));
        assert_relative_eq!(engine.weighted_fair_value(&valuations).unwrap(), 42.0);
    }

    #[test]
    fn test_missing_snapshot_is_insufficient_data() {
        let engine = ValuationEngine::new();
        let err = engine.calculate_valuation("NONE", None).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData("No fundamental data available".to_string())
        );
    }

    #[test]
    fn test_summary_scales_fractions() {
        let engine = ValuationEngine::new();
        let f = Fundamentals {
            roe: Some(0.2237),
            profit_margin: Some(0.0),
            revenue_growth: Some(-0.051),
            dividend_yield: Some(0.0044),
            pe_ratio: Some(31.5),
            market_cap: Some(3.1e12),
            ..Fundamentals::new("AAPL")
        };
        let summary = engine.fundamental_summary(&f);
        assert_eq!(summary.roe, Some(22.37));
        assert_eq!(summary.profit_margin, None);
        assert_eq!(summary.revenue_growth, Some(-5.1));
        assert_eq!(summary.dividend_yield, Some(0.44));
        assert_eq!(summary.pe_ratio, Some(31.5));
        assert_eq!(summary.market_cap, Some(3.1e12));
    }

    #[test]
    fn test_latest_snapshot_picks_newest_date() {
        let older = Fundamentals {
            date: NaiveDate::from_ymd_opt(2026, 1, 26),
            eps: Some(1.0),
            ..Fundamentals::new("MSFT")
        };
        let newer = Fundamentals {
            date: NaiveDate::from_ymd_opt(2026, 1, 28),
            eps: Some(2.0),
            ..Fundamentals::new("MSFT")
        };
        let other = Fundamentals {
            date: NaiveDate::from_ymd_opt(2026, 2, 1),
            ..Fundamentals::new("AAPL")
        };
        let snapshots = vec![newer.clone(), older, other];

        let latest = latest_snapshot("msft", &snapshots).unwrap();
        assert_eq!(latest, &newer);
        assert!(latest_snapshot("GOOGL", &snapshots).is_none());
    }
}
