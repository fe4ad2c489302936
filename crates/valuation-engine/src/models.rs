//! Pricing models. Each one maps a few fundamental fields to a per-share fair
//! value plus an assessment of the current price against it.
//!
//! [`evaluate`] owns the preconditions: a model whose inputs are missing or
//! non-positive is skipped (returns `None`), never fed a substitute value.

use analysis_core::numeric::{present, round2};
use analysis_core::{Assessment, Fundamentals, ModelKey, ValuationMethodResult};

// PER multiples (conservative / fair / optimistic)
const PER_MULTIPLES: (f64, f64, f64) = (15.0, 20.0, 25.0);
// PBR multiples
const PBR_MULTIPLES: (f64, f64, f64) = (2.0, 3.0, 5.0);

const DCF_DISCOUNT_RATE: f64 = 0.10;
const DCF_GROWTH_RATE: f64 = 0.05;
const DCF_TERMINAL_GROWTH_RATE: f64 = 0.02;
const DCF_YEARS: i32 = 10;

const FAIR_PEG: f64 = 1.0;

const GRAHAM_BASE_PE: f64 = 8.5;
const GRAHAM_DEFAULT_EARNINGS_GROWTH: f64 = 0.05;
/// AAA corporate bond yield. The formula multiplies and divides by the same
/// figure, so the yield has no effect on the result.
const GRAHAM_BOND_YIELD: f64 = 4.4;

/// Run the model identified by `key` against a snapshot, or `None` if its
/// preconditions are not met.
pub fn evaluate(key: ModelKey, fundamentals: &Fundamentals) -> Option<ValuationMethodResult> {
    let price = present(fundamentals.current_price);
    let eps = positive(fundamentals.eps);

    let result = match key {
        ModelKey::PerBased => eps.map(|eps| per_based(eps, price)),
        ModelKey::PbrBased => positive(fundamentals.book_value).map(|bv| pbr_based(bv, price)),
        ModelKey::DcfBased => match (
            positive(fundamentals.free_cashflow),
            shares_outstanding(fundamentals),
        ) {
            (Some(fcf), Some(shares)) => Some(dcf_based(fcf, shares, price)),
            _ => None,
        },
        ModelKey::PegBased => match (eps, fundamentals.forward_eps) {
            (Some(eps), Some(forward_eps)) if forward_eps > eps => {
                Some(peg_based(eps, forward_eps, price))
            }
            _ => None,
        },
        ModelKey::Graham => eps.map(|eps| {
            let growth = fundamentals
                .earnings_growth
                .unwrap_or(GRAHAM_DEFAULT_EARNINGS_GROWTH);
            graham(eps, growth, price)
        }),
    };

    if result.is_none() {
        tracing::debug!(
            "{}: skipping {} model, preconditions not met",
            fundamentals.ticker,
            key.as_str()
        );
    }
    result
}

/// `market_cap / current_price`, when both are reported.
pub fn shares_outstanding(fundamentals: &Fundamentals) -> Option<f64> {
    match (
        present(fundamentals.market_cap),
        present(fundamentals.current_price),
    ) {
        (Some(market_cap), Some(price)) => Some(market_cap / price),
        _ => None,
    }
}

/// Classify the current price against a fair value. Without a price the
/// result is always `NotAvailable`.
pub fn assess_value(current_price: Option<f64>, fair_value: f64) -> Assessment {
    match present(current_price) {
        Some(price) => Assessment::from_ratio(price / fair_value),
        None => Assessment::NotAvailable,
    }
}

pub fn per_based(eps: f64, current_price: Option<f64>) -> ValuationMethodResult {
    let (conservative, fair, optimistic) = PER_MULTIPLES;
    let fair_value = eps * fair;

    let mut result =
        ValuationMethodResult::new("PER based", round2(fair_value), assess_value(current_price, fair_value));
    result.conservative = Some(round2(eps * conservative));
    result.optimistic = Some(round2(eps * optimistic));
    result.current_per = present(current_price).map(|p| round2(p / eps));
    result
}

pub fn pbr_based(book_value: f64, current_price: Option<f64>) -> ValuationMethodResult {
    let (conservative, fair, optimistic) = PBR_MULTIPLES;
    let fair_value = book_value * fair;

    let mut result =
        ValuationMethodResult::new("PBR based", round2(fair_value), assess_value(current_price, fair_value));
    result.conservative = Some(round2(book_value * conservative));
    result.optimistic = Some(round2(book_value * optimistic));
    result.current_pbr = present(current_price).map(|p| round2(p / book_value));
    result
}

/// Single-path DCF: ten years of FCF growing at 5% discounted at 10%, plus a
/// Gordon-growth terminal value at 2% discounted back ten years.
pub fn dcf_based(
    free_cashflow: f64,
    shares_outstanding: f64,
    current_price: Option<f64>,
) -> ValuationMethodResult {
    let mut projected_fcf = free_cashflow;
    let mut present_value = 0.0;
    for year in 1..=DCF_YEARS {
        projected_fcf *= 1.0 + DCF_GROWTH_RATE;
        present_value += projected_fcf / (1.0 + DCF_DISCOUNT_RATE).powi(year);
    }

    let terminal_value = projected_fcf * (1.0 + DCF_TERMINAL_GROWTH_RATE)
        / (DCF_DISCOUNT_RATE - DCF_TERMINAL_GROWTH_RATE);
    let present_terminal_value = terminal_value / (1.0 + DCF_DISCOUNT_RATE).powi(DCF_YEARS);

    let fair_value = (present_value + present_terminal_value) / shares_outstanding;

    let mut result = ValuationMethodResult::new(
        "DCF (discounted cash flow)",
        round2(fair_value),
        assess_value(current_price, fair_value),
    );
    result.fcf_per_share = Some(round2(free_cashflow / shares_outstanding));
    result
}

/// Fair P/E equals the implied EPS growth rate (in percent) at a PEG of 1.0.
pub fn peg_based(eps: f64, forward_eps: f64, current_price: Option<f64>) -> ValuationMethodResult {
    let growth_rate = (forward_eps - eps) / eps * 100.0;
    let fair_per = growth_rate * FAIR_PEG;
    let fair_value = eps * fair_per;

    let current_peg = match present(current_price) {
        Some(price) if growth_rate > 0.0 => Some(round2(price / eps / growth_rate)),
        _ => None,
    };

    let mut result =
        ValuationMethodResult::new("PEG based", round2(fair_value), assess_value(current_price, fair_value));
    result.growth_rate = Some(round2(growth_rate));
    result.current_peg = current_peg;
    result
}

/// Graham's `V = EPS x (8.5 + 2g) x 4.4 / Y` with `g` in percent.
///
/// Growth below -4.25% gives a negative value. It is reported and averaged
/// as is; a zero value assesses as very overvalued.
pub fn graham(eps: f64, earnings_growth: f64, current_price: Option<f64>) -> ValuationMethodResult {
    let g = earnings_growth * 100.0;
    let y = GRAHAM_BOND_YIELD;
    let fair_value = eps * (GRAHAM_BASE_PE + 2.0 * g) * 4.4 / y;

    let mut result =
        ValuationMethodResult::new("Graham formula", round2(fair_value), assess_value(current_price, fair_value));
    result.formula = Some(format!(
        "EPS({}) × ({} + 2×{}%) × 4.4 / {}",
        eps,
        GRAHAM_BASE_PE,
        round2(g),
        y
    ));
    result
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}
