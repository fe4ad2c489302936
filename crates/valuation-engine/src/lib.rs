pub mod engine;
pub mod health;
pub mod models;
pub mod rating;
pub mod screener;

pub use engine::{latest_snapshot, model_weight, ValuationEngine};
pub use health::assess_financial_health;
pub use rating::compute_overall_rating;
pub use screener::{
    compare, overview, parse_tickers, sector_analysis, undervalued, MarketOverview,
    ScreenFilters, SectorSummary, UndervaluedScreen,
};
