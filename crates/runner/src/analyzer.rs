//! Rule-based analyzer
//!
//! A deterministic stand-in for the external analysis service: direction from
//! the trend, confidence from how strongly RSI and price-vs-SMA agree with it,
//! targets scaled by volatility.

use async_trait::async_trait;
use meridian_core::{Direction, MarketSnapshot, Recommendation, Trend};
use meridian_ports::Analyzer;

#[derive(Debug, Clone)]
pub struct RuleBasedAnalyzer {
    /// Minimum confidence (percent) for `should_trade`
    pub min_confidence: f64,
}

impl Default for RuleBasedAnalyzer {
    fn default() -> Self {
        Self {
            min_confidence: 60.0,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl RuleBasedAnalyzer {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    fn confidence(&self, direction: Direction, snapshot: &MarketSnapshot) -> f64 {
        let ind = &snapshot.indicators;
        let sign = match direction {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
            Direction::Neutral => return 0.0,
        };

        // RSI below 50 supports longs, above 50 supports shorts
        let rsi_support = (50.0 - ind.rsi_14) / 50.0 * sign;
        let sma_support = (ind.price_vs_sma * sign).clamp(-5.0, 5.0) / 5.0;
        let volatility_penalty = (snapshot.volatility * 5.0).min(20.0);

        let confidence = 60.0 + rsi_support * 20.0 + sma_support * 20.0 - volatility_penalty;
        round2(confidence.clamp(0.0, 100.0))
    }
}

#[async_trait]
impl Analyzer for RuleBasedAnalyzer {
    async fn analyze(&self, snapshot: &MarketSnapshot) -> Option<Recommendation> {
        if snapshot.current_price <= 0.0 {
            return None;
        }

        let direction = match snapshot.trend {
            Trend::Bullish => Direction::Long,
            Trend::Bearish => Direction::Short,
            Trend::Neutral => Direction::Neutral,
        };
        let confidence = self.confidence(direction, snapshot);
        let should_trade = direction != Direction::Neutral && confidence >= self.min_confidence;

        let (take_profit, stop_loss) = if direction == Direction::Neutral {
            (None, None)
        } else {
            (
                Some(round2((snapshot.volatility * 2.0).clamp(1.0, 10.0))),
                Some(round2((snapshot.volatility * 1.5).clamp(0.5, 5.0))),
            )
        };

        Some(Recommendation {
            symbol: snapshot.symbol.clone(),
            direction,
            confidence,
            should_trade,
            take_profit,
            stop_loss,
            price: snapshot.current_price,
            timestamp: snapshot.timestamp,
        })
    }

    fn name(&self) -> &str {
        "RuleBasedAnalyzer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meridian_core::Indicators;

    fn snapshot(trend: Trend, rsi: f64, price_vs_sma: f64, volatility: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "BTCUSDT".to_string(),
            current_price: 50000.0,
            price_change_24h: 1.0,
            volume_24h: 100.0,
            high_24h: 51000.0,
            low_24h: 49000.0,
            timestamp: Utc::now(),
            trend,
            volatility,
            indicators: Indicators {
                sma_20: 49500.0,
                rsi_14: rsi,
                price_vs_sma,
            },
        }
    }

    #[tokio::test]
    async fn test_neutral_trend_never_trades() {
        let rec = RuleBasedAnalyzer::default()
            .analyze(&snapshot(Trend::Neutral, 20.0, 3.0, 0.2))
            .await
            .unwrap();
        assert_eq!(rec.direction, Direction::Neutral);
        assert!(!rec.should_trade);
        assert!(rec.targets().is_none());
    }

    #[tokio::test]
    async fn test_supported_bullish_trend_trades() {
        // 60 + 0.4*20 + 0.4*20 - 1 = 75
        let rec = RuleBasedAnalyzer::default()
            .analyze(&snapshot(Trend::Bullish, 30.0, 2.0, 0.2))
            .await
            .unwrap();
        assert_eq!(rec.direction, Direction::Long);
        assert_eq!(rec.confidence, 75.0);
        assert!(rec.should_trade);
        assert_eq!(rec.targets(), Some((1.0, 0.5)));
        assert_eq!(rec.price, 50000.0);
    }

    #[tokio::test]
    async fn test_overbought_bullish_trend_is_declined() {
        // 60 - 0.6*20 - 0.4*20 - 10 = 30
        let rec = RuleBasedAnalyzer::default()
            .analyze(&snapshot(Trend::Bullish, 80.0, -2.0, 2.0))
            .await
            .unwrap();
        assert_eq!(rec.confidence, 30.0);
        assert!(!rec.should_trade);
        assert_eq!(rec.targets(), Some((4.0, 3.0)));
    }

    #[tokio::test]
    async fn test_bearish_trend_goes_short() {
        let rec = RuleBasedAnalyzer::default()
            .analyze(&snapshot(Trend::Bearish, 75.0, -3.0, 0.0))
            .await
            .unwrap();
        assert_eq!(rec.direction, Direction::Short);
        assert!(rec.should_trade);
    }
}
