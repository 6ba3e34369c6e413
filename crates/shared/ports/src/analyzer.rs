use async_trait::async_trait;
use meridian_core::{MarketSnapshot, Recommendation};

/// Port for the analysis collaborator that turns a snapshot into a trading signal
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produce a recommendation, or `None` when no signal is available
    async fn analyze(&self, snapshot: &MarketSnapshot) -> Option<Recommendation>;

    fn name(&self) -> &str {
        "Analyzer"
    }
}
