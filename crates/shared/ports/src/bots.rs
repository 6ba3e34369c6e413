use async_trait::async_trait;
use meridian_core::{BotHandle, BotId, BotStats, Recommendation};

/// Port for a bot backend
///
/// Two implementations exist (in-memory mock and remote REST backend); the
/// variant is chosen once at construction. Backend failures never escape
/// this interface: they surface as `None`/`false` and are logged by the
/// implementation.
#[async_trait]
pub trait BotRegistry: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Create a bot for `pair` and make it the pair's active bot
    async fn create_bot(&mut self, pair: &str) -> Option<BotHandle>;

    /// Apply a recommendation to a bot's settings.
    ///
    /// Returns `false` when the recommendation is declined (`should_trade`
    /// unset, or a backend that needs take profit / stop loss got neither)
    /// or the backend failed.
    async fn apply_recommendation(
        &mut self,
        bot_id: BotId,
        recommendation: &Recommendation,
    ) -> bool;

    /// Performance summary for a bot
    async fn get_stats(&self, bot_id: BotId) -> Option<BotStats>;

    /// The active bot for a pair, if one was created
    fn active_bot(&self, pair: &str) -> Option<BotId>;
}
