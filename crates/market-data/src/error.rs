use meridian_ports::FetchError;
use thiserror::Error;

/// Errors surfaced by the snapshot pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// The fetch failed and no cached snapshot exists for the symbol
    #[error("No market data available for {symbol}: {source}")]
    DataUnavailable {
        symbol: String,
        #[source]
        source: FetchError,
    },
}

impl MarketDataError {
    pub fn symbol(&self) -> &str {
        match self {
            MarketDataError::DataUnavailable { symbol, .. } => symbol,
        }
    }
}
