use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::AnalysisError;

/// Point-in-time fundamentals snapshot for one security, as delivered by the
/// data-sync layer. Every figure may be missing; ratios such as `roe` are
/// fractions (0.15 = 15%) while `debt_to_equity` is a percentage number
/// (120 = 120%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,

    // Valuation ratios
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub forward_pe: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub ps_ratio: Option<f64>,
    #[serde(default)]
    pub ev_ebitda: Option<f64>,

    // Per-share
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub forward_eps: Option<f64>,
    #[serde(default)]
    pub book_value: Option<f64>,

    // Profitability and growth (fractions)
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    #[serde(default)]
    pub earnings_growth: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,

    // Leverage / liquidity
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub quick_ratio: Option<f64>,

    // Cash flow
    #[serde(default)]
    pub free_cashflow: Option<f64>,
}

impl Fundamentals {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }
}

/// Price versus fair value classification shared by every pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assessment {
    #[serde(rename = "very undervalued")]
    VeryUndervalued,
    #[serde(rename = "undervalued")]
    Undervalued,
    #[serde(rename = "fair")]
    Fair,
    #[serde(rename = "overvalued")]
    Overvalued,
    #[serde(rename = "very overvalued")]
    VeryOvervalued,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Assessment {
    /// Classify `current_price / fair_value`.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.80 {
            Assessment::VeryUndervalued
        } else if ratio < 0.95 {
            Assessment::Undervalued
        } else if ratio <= 1.05 {
            Assessment::Fair
        } else if ratio <= 1.20 {
            Assessment::Overvalued
        } else {
            Assessment::VeryOvervalued
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Assessment::VeryUndervalued => "very undervalued",
            Assessment::Undervalued => "undervalued",
            Assessment::Fair => "fair",
            Assessment::Overvalued => "overvalued",
            Assessment::VeryOvervalued => "very overvalued",
            Assessment::NotAvailable => "N/A",
        }
    }
}

/// Investment rating derived from the 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "strong buy")]
    StrongBuy,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "strong sell")]
    StrongSell,
}

impl Rating {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 80 => Rating::StrongBuy,
            s if s >= 60 => Rating::Buy,
            s if s >= 40 => Rating::Hold,
            s if s >= 20 => Rating::Sell,
            _ => Rating::StrongSell,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Rating::StrongBuy => "strong buy",
            Rating::Buy => "buy",
            Rating::Hold => "hold",
            Rating::Sell => "sell",
            Rating::StrongSell => "strong sell",
        }
    }
}

/// Bucket for a single liquidity or leverage ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "fair")]
    Fair,
    #[serde(rename = "caution")]
    Caution,
    #[serde(rename = "N/A")]
    NotAvailable,
}

/// Aggregate balance-sheet health, driven by how many ratios scored `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthGrade {
    Healthy,
    Good,
    Fair,
    Caution,
}

impl HealthGrade {
    pub fn from_good_count(good: usize) -> Self {
        match good {
            n if n >= 3 => HealthGrade::Healthy,
            2 => HealthGrade::Good,
            1 => HealthGrade::Fair,
            _ => HealthGrade::Caution,
        }
    }
}

/// Identifier of a pricing model in the valuation map. Declaration order is
/// the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKey {
    PerBased,
    PbrBased,
    DcfBased,
    PegBased,
    Graham,
}

impl ModelKey {
    pub const ALL: [ModelKey; 5] = [
        ModelKey::PerBased,
        ModelKey::PbrBased,
        ModelKey::DcfBased,
        ModelKey::PegBased,
        ModelKey::Graham,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::PerBased => "per_based",
            ModelKey::PbrBased => "pbr_based",
            ModelKey::DcfBased => "dcf_based",
            ModelKey::PegBased => "peg_based",
            ModelKey::Graham => "graham",
        }
    }
}

/// Output of one pricing model.
///
/// `conservative` and `optimistic` are only produced by the multiple-based
/// models. The remaining optional fields are model-specific diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationMethodResult {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservative: Option<f64>,
    pub fair_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<f64>,
    pub assessment: Assessment,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_per: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_pbr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcf_per_share: Option<f64>,
    /// Implied EPS growth in percent (PEG model).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_peg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl ValuationMethodResult {
    pub fn new(method: impl Into<String>, fair_value: f64, assessment: Assessment) -> Self {
        Self {
            method: method.into(),
            conservative: None,
            fair_value,
            optimistic: None,
            assessment,
            current_per: None,
            current_pbr: None,
            fcf_per_share: None,
            growth_rate: None,
            current_peg: None,
            formula: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRating {
    pub score: u8,
    pub rating: Rating,
    /// One entry per adjustment applied, in evaluation order.
    pub reasons: Vec<String>,
}

/// Display-oriented copy of the key ratios. Fractional fields are already
/// multiplied by 100 and rounded to 2 decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSummary {
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub roe: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthItem {
    pub value: Option<f64>,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub current_ratio: HealthItem,
    pub debt_to_equity: HealthItem,
    pub quick_ratio: HealthItem,
    pub overall: HealthGrade,
}

/// Result of valuing one security. Built fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub ticker: String,
    pub current_price: Option<f64>,
    pub valuations: BTreeMap<ModelKey, ValuationMethodResult>,
    pub average_fair_value: Option<f64>,
    /// Percent gap between the weighted fair value and the current price.
    pub upside_potential: Option<f64>,
    pub overall_rating: OverallRating,
    pub fundamental_summary: FundamentalSummary,
    pub financial_health: FinancialHealth,
}

/// Wire shape handed to the presentation layer: either the full valuation or
/// an object carrying only an `error` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValuationResponse {
    Valuation(Box<Valuation>),
    Error { error: String },
}

impl ValuationResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ValuationResponse::Error { .. })
    }

    pub fn valuation(&self) -> Option<&Valuation> {
        match self {
            ValuationResponse::Valuation(v) => Some(v),
            ValuationResponse::Error { .. } => None,
        }
    }
}

impl From<Result<Valuation, AnalysisError>> for ValuationResponse {
    fn from(result: Result<Valuation, AnalysisError>) -> Self {
        match result {
            Ok(valuation) => ValuationResponse::Valuation(Box::new(valuation)),
            Err(AnalysisError::InsufficientData(msg)) | Err(AnalysisError::InvalidData(msg)) => {
                ValuationResponse::Error { error: msg }
            }
        }
    }
}
