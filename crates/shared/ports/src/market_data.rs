use async_trait::async_trait;
use meridian_core::{CandleSeries, Ticker};

use crate::error::FetchResult;

/// Port for exchange market data
///
/// Implementations talk to an exchange (REST, websocket, fixtures...) and
/// return raw inputs; all derivations happen in the market data crate.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Lightweight 24h ticker for a symbol
    async fn ticker(&self, symbol: &str) -> FetchResult<Ticker>;

    /// Recent candle closes for a symbol, oldest first
    async fn closes(&self, symbol: &str) -> FetchResult<CandleSeries>;

    /// Release the underlying connection/handle.
    ///
    /// Calls made after `close` fail with [`FetchError::Closed`](crate::FetchError::Closed).
    async fn close(&self) -> FetchResult<()>;
}
