use async_trait::async_trait;
use crate::{AnalysisError, Fundamentals, Valuation};

/// Trait for fair value engines
#[async_trait]
pub trait FairValueAnalyzer: Send + Sync {
    async fn value(
        &self,
        ticker: &str,
        snapshot: Option<&Fundamentals>,
    ) -> Result<Valuation, AnalysisError>;
}
