//! valuation: value tracked equities from fundamentals snapshots.
//!
//! Snapshots are read from a JSON array (one object per ticker and date, as
//! written by the data-sync jobs). Results are printed as JSON on stdout.
//!
//! Usage:
//!   valuation --input snapshots.json                     # every ticker in the file
//!   valuation --input snapshots.json --tickers AAPL MSFT
//!   valuation --input snapshots.json --mode compare --tickers aapl,msft
//!   valuation --input snapshots.json --mode undervalued --max-pe 12
//!   valuation --input snapshots.json --mode sectors --sectors sectors.json

use analysis_core::{FairValueAnalyzer, Fundamentals, ValuationResponse};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use valuation_engine::{latest_snapshot, ScreenFilters, ValuationEngine};

mod config;

use config::{CliConfig, Mode};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "valuation=info,valuation_engine=info".into())
    };
    // Logs go to stderr so stdout stays pure JSON
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = CliConfig::from_env()?;
    config.apply_args(&args)?;

    let input = config
        .input
        .clone()
        .context("no input file: pass --input PATH or set VALUATION_INPUT")?;
    let snapshots = load_snapshots(&input).await?;
    tracing::info!("Loaded {} snapshots from {}", snapshots.len(), input.display());

    let engine = ValuationEngine::new();

    let output = match config.mode {
        Mode::Valuation => {
            let tickers = if config.tickers.is_empty() {
                distinct_tickers(&snapshots)
            } else {
                config.tickers.clone()
            };
            let mut responses: Vec<ValuationResponse> = Vec::with_capacity(tickers.len());
            for ticker in &tickers {
                let result = engine.value(ticker, latest_snapshot(ticker, &snapshots)).await;
                if let Err(e) = &result {
                    tracing::warn!("{}: {}", ticker, e);
                }
                responses.push(result.into());
            }
            serde_json::to_value(responses)?
        }
        Mode::Compare => {
            let responses = valuation_engine::compare(&engine, &config.tickers, &snapshots)?;
            serde_json::to_value(responses)?
        }
        Mode::Overview => {
            let latest = latest_per_ticker(&snapshots);
            serde_json::to_value(valuation_engine::overview(&latest))?
        }
        Mode::Undervalued => {
            let latest = latest_per_ticker(&snapshots);
            let filters = ScreenFilters {
                max_pe: config.max_pe,
                max_pb: config.max_pb,
            };
            serde_json::to_value(valuation_engine::undervalued(&latest, filters))?
        }
        Mode::Sectors => {
            let path = config
                .sectors
                .clone()
                .context("sectors mode needs --sectors PATH or VALUATION_SECTORS")?;
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let sector_of: HashMap<String, String> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a ticker-to-sector JSON object", path.display()))?;
            let latest = latest_per_ticker(&snapshots);
            serde_json::to_value(valuation_engine::sector_analysis(&latest, &sector_of))?
        }
    };

    let rendered = if config.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}

async fn load_snapshots(path: &Path) -> Result<Vec<Fundamentals>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of fundamentals", path.display()))
}

/// Tickers in order of first appearance.
fn distinct_tickers(snapshots: &[Fundamentals]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut tickers = Vec::new();
    for f in snapshots {
        let ticker = f.ticker.to_uppercase();
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }
    tickers
}

fn latest_per_ticker(snapshots: &[Fundamentals]) -> Vec<Fundamentals> {
    distinct_tickers(snapshots)
        .iter()
        .filter_map(|t| latest_snapshot(t, snapshots).cloned())
        .collect()
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  valuation --input PATH                      Value every ticker in the file");
    eprintln!("  valuation --input PATH --tickers A B,C      Value specific tickers");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --mode MODE        valuation | compare | overview | undervalued | sectors");
    eprintln!("  --max-pe N         Undervalued screen P/E ceiling (default 15)");
    eprintln!("  --max-pb N         Undervalued screen P/B ceiling (default 2)");
    eprintln!("  --sectors PATH     Ticker-to-sector JSON map (sectors mode)");
    eprintln!("  --compact          Single-line JSON output");
}
