use chrono::{DateTime, Utc};

/// Price value as reported by the exchange
pub type Price = f64;

/// Percentage value (e.g. `1.5` means 1.5%)
pub type Percent = f64;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Symbol identifier for a trading pair (e.g. `BTCUSDT`)
pub type Symbol = String;
