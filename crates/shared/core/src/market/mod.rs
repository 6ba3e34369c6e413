mod candles;
mod live;
mod snapshot;
mod ticker;

pub use candles::CandleSeries;
pub use live::LiveTicker;
pub use snapshot::{Indicators, MarketSnapshot, Trend};
pub use ticker::Ticker;
