//! Cross-sectional views over the latest snapshots of a stock universe:
//! market overview, cheap-multiple screen, side-by-side comparison and
//! per-sector averages.

use analysis_core::numeric::{mean_of, round2};
use analysis_core::{AnalysisError, Fundamentals, ValuationResponse};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::engine::ValuationEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub total_stocks: usize,
    pub average_pe: f64,
    pub average_pb: f64,
    pub average_ps: f64,
    pub total_market_cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenFilters {
    pub max_pe: f64,
    pub max_pb: f64,
}

impl Default for ScreenFilters {
    fn default() -> Self {
        Self {
            max_pe: 15.0,
            max_pb: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndervaluedScreen {
    pub stocks: Vec<Fundamentals>,
    pub filters: ScreenFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub sector: String,
    pub stock_count: usize,
    pub average_pe: f64,
    pub average_pb: f64,
    pub average_ps: f64,
    pub total_market_cap: f64,
    pub tickers: Vec<String>,
}

/// Universe-wide averages. Each ratio is averaged over the snapshots that
/// report it, 0 when none do.
pub fn overview(snapshots: &[Fundamentals]) -> MarketOverview {
    let (average_pe, average_pb, average_ps) = ratio_averages(snapshots.iter());
    MarketOverview {
        total_stocks: snapshots.len(),
        average_pe,
        average_pb,
        average_ps,
        total_market_cap: total_market_cap(snapshots.iter()),
    }
}

/// Snapshots with a reported P/E where either P/E or P/B is at or under its
/// ceiling, cheapest P/E first.
pub fn undervalued(snapshots: &[Fundamentals], filters: ScreenFilters) -> UndervaluedScreen {
    let mut stocks: Vec<Fundamentals> = snapshots
        .iter()
        .filter(|f| match f.pe_ratio {
            Some(pe) => pe <= filters.max_pe || f.pb_ratio.map_or(false, |pb| pb <= filters.max_pb),
            None => false,
        })
        .cloned()
        .collect();

    stocks.sort_by(|a, b| {
        a.pe_ratio
            .partial_cmp(&b.pe_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::info!(
        "Undervalued screen: {}/{} stocks passed (max P/E {}, max P/B {})",
        stocks.len(),
        snapshots.len(),
        filters.max_pe,
        filters.max_pb
    );

    UndervaluedScreen { stocks, filters }
}

/// Split a comma-separated ticker list, trimming and upper-casing each entry.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    normalize_tickers(raw.split(','))
}

pub fn normalize_tickers<I, S>(tickers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tickers
        .into_iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Value each requested ticker against its latest snapshot, in request
/// order. Tickers without data yield an error response in their slot.
pub fn compare<S: AsRef<str>>(
    engine: &ValuationEngine,
    tickers: &[S],
    snapshots: &[Fundamentals],
) -> Result<Vec<ValuationResponse>, AnalysisError> {
    let tickers = normalize_tickers(tickers);
    if tickers.is_empty() {
        return Err(AnalysisError::InvalidData(
            "Please provide tickers to compare".to_string(),
        ));
    }

    Ok(tickers
        .iter()
        .map(|ticker| engine.value_latest(ticker, snapshots).into())
        .collect())
}

/// Per-sector averages. `sector_of` maps ticker (any case) to sector name;
/// tickers without a sector are left out. Sectors come back sorted by name.
pub fn sector_analysis(
    snapshots: &[Fundamentals],
    sector_of: &HashMap<String, String>,
) -> Vec<SectorSummary> {
    let sector_of: HashMap<String, &str> = sector_of
        .iter()
        .map(|(ticker, sector)| (ticker.trim().to_uppercase(), sector.as_str()))
        .collect();

    let mut by_sector: BTreeMap<&str, Vec<&Fundamentals>> = BTreeMap::new();
    for snapshot in snapshots {
        match sector_of.get(&snapshot.ticker.trim().to_uppercase()) {
            Some(sector) => by_sector.entry(*sector).or_default().push(snapshot),
            None => tracing::debug!("{}: no sector assigned, skipping", snapshot.ticker),
        }
    }

    by_sector
        .into_iter()
        .map(|(sector, members)| {
            let (average_pe, average_pb, average_ps) = ratio_averages(members.iter().copied());
            SectorSummary {
                sector: sector.to_string(),
                stock_count: members.len(),
                average_pe,
                average_pb,
                average_ps,
                total_market_cap: total_market_cap(members.iter().copied()),
                tickers: members.iter().map(|f| f.ticker.clone()).collect(),
            }
        })
        .collect()
}

fn ratio_averages<'a, I>(snapshots: I) -> (f64, f64, f64)
where
    I: Iterator<Item = &'a Fundamentals> + Clone,
{
    let avg = |field: fn(&Fundamentals) -> Option<f64>| {
        round2(mean_of(snapshots.clone().map(field)).unwrap_or(0.0))
    };
    (avg(|f| f.pe_ratio), avg(|f| f.pb_ratio), avg(|f| f.ps_ratio))
}

fn total_market_cap<'a, I>(snapshots: I) -> f64
where
    I: Iterator<Item = &'a Fundamentals>,
{
    snapshots.filter_map(|f| f.market_cap).sum()
}
