mod bot;
mod recommendation;
mod status;

pub use bot::{BotHandle, BotId, BotStats, TradeRecord};
pub use recommendation::{Direction, Recommendation};
pub use status::{StatusRecord, UNKNOWN_PROFIT};
