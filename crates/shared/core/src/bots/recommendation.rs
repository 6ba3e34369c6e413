use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{Percent, Price, Symbol, Timestamp};

/// Direction suggested by the analysis collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

/// Trading signal produced outside this system and consumed by the bot registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: Symbol,
    pub direction: Direction,
    /// Confidence in percent (0-100)
    pub confidence: f64,
    pub should_trade: bool,
    /// Take profit in percent
    #[serde(default)]
    pub take_profit: Option<Percent>,
    /// Stop loss in percent
    #[serde(default)]
    pub stop_loss: Option<Percent>,
    pub price: Price,
    pub timestamp: Timestamp,
}

impl Recommendation {
    /// Take profit and stop loss, if both are present
    pub fn targets(&self) -> Option<(Percent, Percent)> {
        Some((self.take_profit?, self.stop_loss?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn recommendation(take_profit: Option<f64>, stop_loss: Option<f64>) -> Recommendation {
        Recommendation {
            symbol: "ETHUSDT".to_string(),
            direction: Direction::Long,
            confidence: 70.0,
            should_trade: true,
            take_profit,
            stop_loss,
            price: 3000.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_targets_require_both_fields() {
        assert_eq!(recommendation(Some(2.0), Some(1.0)).targets(), Some((2.0, 1.0)));
        assert_eq!(recommendation(Some(2.0), None).targets(), None);
        assert_eq!(recommendation(None, Some(1.0)).targets(), None);
    }

    #[test]
    fn test_missing_targets_deserialize_as_none() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "direction": "short",
            "confidence": 90.0,
            "should_trade": false,
            "price": 50000.0,
            "timestamp": "2024-01-01T00:00:00Z"
        }"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.direction, Direction::Short);
        assert!(rec.take_profit.is_none());
        assert!(rec.stop_loss.is_none());
    }
}
