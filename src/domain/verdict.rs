//! Trend verdict and weighted vote aggregation.

use crate::domain::levels::PriceLevels;
use crate::domain::period::Period;
use crate::domain::signal::{Sentiment, SignalName, SignalReading};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Weighted sums at or below this magnitude count as a tie.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Indicator values at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub ema_short: f64,
    pub ema_long: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub rsi: f64,
    pub bollinger_upper: f64,
    pub bollinger_mid: f64,
    pub bollinger_lower: f64,
    pub average_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendVerdict {
    pub symbol: String,
    pub period: Period,
    pub as_of: NaiveDateTime,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub weighted_score: f64,
    pub signals: BTreeMap<SignalName, SignalReading>,
    pub snapshot: IndicatorSnapshot,
    pub levels: PriceLevels,
    pub current_price: f64,
    pub price_change_percent: f64,
    pub bars_analyzed: usize,
    /// Signals that fell back to a neutral vote.
    pub degraded: Vec<SignalName>,
}

impl TrendVerdict {
    pub fn signal(&self, name: SignalName) -> Option<&SignalReading> {
        self.signals.get(&name)
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Outcome of the weighted vote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vote {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub score: f64,
}

/// Combine weighted readings into a sentiment and confidence.
///
/// Confidence is |score| over the total weight, so neutral and degraded
/// readings dilute it.
pub fn aggregate<'a>(readings: impl IntoIterator<Item = &'a SignalReading>) -> Vote {
    let (score, total) = readings
        .into_iter()
        .fold((0.0, 0.0), |(score, total), r| {
            (score + r.contribution(), total + r.weight)
        });

    if score.abs() <= SCORE_EPSILON || total <= 0.0 {
        return Vote {
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
            score: 0.0,
        };
    }

    let sentiment = if score > 0.0 {
        Sentiment::Bullish
    } else {
        Sentiment::Bearish
    };
    Vote {
        sentiment,
        confidence: (score.abs() / total).clamp(0.0, 1.0),
        score,
    }
}
