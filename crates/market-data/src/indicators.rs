//! Pure derivations over candle closes
//!
//! Stateless functions of the close series, testable without I/O.

use meridian_core::{Indicators, Price, Trend};

/// Closes considered when classifying the trend
pub const TREND_WINDOW: usize = 6;
/// Closes considered when measuring volatility
pub const VOLATILITY_WINDOW: usize = 12;
/// Minimum closes before indicators are computed at all
pub const MIN_INDICATOR_CLOSES: usize = 14;
pub const SMA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
/// Percent move over the trend window needed to call a direction
pub const TREND_THRESHOLD: f64 = 1.0;

fn tail(closes: &[Price], n: usize) -> &[Price] {
    &closes[closes.len().saturating_sub(n)..]
}

fn pct_change(from: Price, to: Price) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

/// Classify the trend from the first and last of the newest 6 closes.
///
/// Above +1% is bullish, below -1% is bearish, anything else (including a
/// series too short to compare) is neutral.
pub fn trend(closes: &[Price]) -> Trend {
    if closes.len() < 2 {
        return Trend::Neutral;
    }

    let window = tail(closes, TREND_WINDOW);
    let Some(change) = pct_change(window[0], window[window.len() - 1]) else {
        return Trend::Neutral;
    };

    if change > TREND_THRESHOLD {
        Trend::Bullish
    } else if change < -TREND_THRESHOLD {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

/// Mean absolute close-to-close percent change over the newest 12 closes
pub fn volatility(closes: &[Price]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }

    let changes: Vec<f64> = tail(closes, VOLATILITY_WINDOW)
        .windows(2)
        .filter_map(|pair| pct_change(pair[0], pair[1]))
        .map(f64::abs)
        .collect();

    if changes.is_empty() {
        return 0.0;
    }
    changes.iter().sum::<f64>() / changes.len() as f64
}

/// Simple moving average of the newest `period` closes.
///
/// Shorter series average everything available; an empty series is 0.0.
pub fn sma(closes: &[Price], period: usize) -> Price {
    let window = tail(closes, period);
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Relative strength index over the newest `period` deltas, rounded to 2 decimals.
///
/// rsi = 100 - 100 / (1 + avg_gain / avg_loss)
///
/// Returns the neutral 50.0 without `period + 1` closes, and exactly 100.0
/// when there were no losses in the window.
pub fn rsi(closes: &[Price], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let deltas: Vec<f64> = tail(closes, period + 1)
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect();

    let avg_gain = deltas.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let avg_loss = deltas.iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    (value * 100.0).round() / 100.0
}

/// SMA-20, RSI-14 and the last close's distance from the SMA in percent
pub fn indicators(closes: &[Price]) -> Indicators {
    if closes.len() < MIN_INDICATOR_CLOSES {
        return Indicators::default();
    }

    let sma_20 = sma(closes, SMA_PERIOD);
    let price_vs_sma = match closes.last() {
        Some(last) if sma_20 != 0.0 => (last / sma_20 - 1.0) * 100.0,
        _ => 0.0,
    };

    Indicators {
        sma_20,
        rsi_14: rsi(closes, RSI_PERIOD),
        price_vs_sma,
    }
}
