//! Directional signals read off the latest indicator values.
//!
//! Each evaluator turns one indicator into a [`SignalReading`]: a sentiment
//! vote, a short label, the headline value and a human-readable description.
//! Evaluators return `TrendError::DegenerateSeries` when the input leaves the
//! indicator without meaning (zero band width, no price movement, no
//! volume); the analyzer turns those into neutral, flagged readings.

use crate::domain::error::TrendError;
use crate::domain::indicator::rsi::RsiState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Relative tolerance under which two prices count as equal.
pub const FLAT_TOLERANCE: f64 = 1e-9;

/// Band width relative to the mid-band below which the bands are squeezed.
pub const SQUEEZE_WIDTH: f64 = 0.08;

/// Recent/baseline volume ratio that counts as a spike.
pub const VOLUME_SPIKE_RATIO: f64 = 1.5;

pub(crate) fn is_flat(diff: f64, reference: f64) -> bool {
    diff.abs() <= FLAT_TOLERANCE * reference.abs().max(1.0)
}

/// -1, 0 or +1, with differences inside the tolerance counted as 0.
pub(crate) fn direction(diff: f64, reference: f64) -> i8 {
    if is_flat(diff, reference) {
        0
    } else if diff > 0.0 {
        1
    } else {
        -1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn vote(&self) -> f64 {
        match self {
            Sentiment::Bullish => 1.0,
            Sentiment::Bearish => -1.0,
            Sentiment::Neutral => 0.0,
        }
    }

    fn from_direction(dir: i8) -> Self {
        match dir {
            1 => Sentiment::Bullish,
            -1 => Sentiment::Bearish,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalName {
    Momentum,
    EmaCross,
    Macd,
    Rsi,
    Bollinger,
    Volume,
}

impl SignalName {
    /// Indicator name used in error messages.
    pub fn indicator(&self) -> &'static str {
        match self {
            SignalName::Momentum => "Momentum",
            SignalName::EmaCross => "EMA",
            SignalName::Macd => "MACD",
            SignalName::Rsi => "RSI",
            SignalName::Bollinger => "Bollinger",
            SignalName::Volume => "Volume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReading {
    pub sentiment: Sentiment,
    pub label: String,
    pub value: f64,
    pub weight: f64,
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl SignalReading {
    fn new(sentiment: Sentiment, label: &str, value: f64, description: String) -> Self {
        Self {
            sentiment,
            label: label.to_string(),
            value,
            weight: 0.0,
            description,
            details: BTreeMap::new(),
            degraded: None,
        }
    }

    fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Neutral stand-in for an indicator that had nothing to say.
    pub fn degraded(err: &TrendError) -> Self {
        let mut reading = Self::new(
            Sentiment::Neutral,
            "degenerate",
            0.0,
            "indicator undefined for this series, counted as neutral".to_string(),
        );
        reading.degraded = Some(err.to_string());
        reading
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn contribution(&self) -> f64 {
        self.sentiment.vote() * self.weight
    }
}

fn degenerate(signal: SignalName, reason: &str) -> TrendError {
    TrendError::DegenerateSeries {
        indicator: signal.indicator().to_string(),
        reason: reason.to_string(),
    }
}

/// Price trend over the whole window: latest close against the first close
/// and against the moving average.
pub fn momentum_signal(first_close: f64, last_close: f64, sma: f64) -> SignalReading {
    let change_pct = (last_close - first_close) / first_close * 100.0;
    let vs_start = direction(last_close - first_close, first_close);
    let vs_sma = direction(last_close - sma, sma);

    let dir = if vs_start == vs_sma { vs_start } else { 0 };
    let sentiment = Sentiment::from_direction(dir);
    let description = match dir {
        1 => format!("price up {change_pct:.2}% over the window and above its moving average"),
        -1 => format!(
            "price down {:.2}% over the window and below its moving average",
            change_pct.abs()
        ),
        _ => format!("price change {change_pct:.2}% without moving-average confirmation"),
    };

    SignalReading::new(sentiment, sentiment.as_str(), change_pct, description)
        .with_detail("above_sma", vs_sma > 0)
}

/// EMA crossover.
///
/// `short` and `long` are the EMA values over the bars where both are valid,
/// oldest first. Bullish only when the short EMA sits above the long one and
/// crossed it at most `lookback` bars ago; bearish for the mirror case.
pub fn ema_cross_signal(
    short: &[f64],
    long: &[f64],
    short_period: usize,
    long_period: usize,
    lookback: usize,
) -> Result<SignalReading, TrendError> {
    let n = short.len().min(long.len());
    if n == 0 {
        return Err(degenerate(
            SignalName::EmaCross,
            "no bars with both averages defined",
        ));
    }

    let signs: Vec<i8> = short[short.len() - n..]
        .iter()
        .zip(&long[long.len() - n..])
        .map(|(s, l)| direction(s - l, *l))
        .collect();
    let spread = short[short.len() - 1] - long[long.len() - 1];
    let current = signs[n - 1];

    if current == 0 {
        return Ok(SignalReading::new(
            Sentiment::Neutral,
            "flat",
            spread,
            format!("EMA({short_period}) level with EMA({long_period})"),
        ));
    }

    // A cross k bars ago shows up as a differing sign at index n - 2 - k.
    let start = (n - 1).saturating_sub(lookback + 1);
    let bars_ago = signs[start..n - 1]
        .iter()
        .rposition(|&s| s != current)
        .map(|pos| n - 1 - (start + pos) - 1);

    let side = if current > 0 { "above" } else { "below" };
    let reading = match bars_ago {
        Some(ago) => {
            let sentiment = Sentiment::from_direction(current);
            let label = if current > 0 {
                "bullish_cross"
            } else {
                "bearish_cross"
            };
            SignalReading::new(
                sentiment,
                label,
                spread,
                format!("EMA({short_period}) crossed {side} EMA({long_period}) {ago} bars ago"),
            )
            .with_detail("bars_since_cross", ago as u64)
        }
        None => SignalReading::new(
            Sentiment::Neutral,
            side,
            spread,
            format!(
                "EMA({short_period}) {side} EMA({long_period}) with no cross in the last {lookback} bars"
            ),
        ),
    };

    Ok(reading)
}

/// MACD histogram state over the last `trend_bars` valid points.
///
/// `scale` is a price level used for the flatness tolerance.
pub fn macd_signal(
    histogram: &[f64],
    line: f64,
    signal_line: f64,
    trend_bars: usize,
    scale: f64,
) -> Result<SignalReading, TrendError> {
    let latest = *histogram
        .last()
        .ok_or_else(|| degenerate(SignalName::Macd, "no valid histogram values"))?;

    let window = &histogram[histogram.len() - trend_bars.clamp(1, histogram.len())..];
    let steps: Vec<i8> = window
        .windows(2)
        .map(|w| direction(w[1] - w[0], scale))
        .collect();
    let rising = steps.iter().all(|&d| d > 0);
    let falling = steps.iter().all(|&d| d < 0);

    let sentiment = match direction(latest, scale) {
        1 if rising => Sentiment::Bullish,
        -1 if falling => Sentiment::Bearish,
        _ => Sentiment::Neutral,
    };
    let description = match sentiment {
        Sentiment::Bullish => "histogram positive and rising".to_string(),
        Sentiment::Bearish => "histogram negative and falling".to_string(),
        Sentiment::Neutral => format!("histogram {latest:.4} without a consistent trend"),
    };

    Ok(
        SignalReading::new(sentiment, sentiment.as_str(), latest, description)
            .with_detail("line", line)
            .with_detail("signal", signal_line),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(rsi: f64, overbought: f64, oversold: f64) -> Self {
        if rsi >= overbought {
            RsiZone::Overbought
        } else if rsi <= oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }

    /// Mean-reversion bias of the zone.
    pub fn bias(&self) -> Sentiment {
        match self {
            RsiZone::Overbought => Sentiment::Bearish,
            RsiZone::Oversold => Sentiment::Bullish,
            RsiZone::Neutral => Sentiment::Neutral,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RsiZone::Overbought => "overbought",
            RsiZone::Oversold => "oversold",
            RsiZone::Neutral => "neutral",
        }
    }
}

/// RSI zone read as a mean-reversion vote.
///
/// `scale` is a price level used for the flatness tolerance; average moves
/// inside it leave the RSI undefined.
pub fn rsi_signal(
    state: RsiState,
    period: usize,
    overbought: f64,
    oversold: f64,
    scale: f64,
) -> Result<SignalReading, TrendError> {
    if is_flat(state.movement(), scale) {
        return Err(degenerate(
            SignalName::Rsi,
            "no gains or losses across the smoothing window",
        ));
    }
    let rsi = state.rsi();
    let zone = RsiZone::classify(rsi, overbought, oversold);
    Ok(SignalReading::new(
        zone.bias(),
        zone.label(),
        rsi,
        format!("RSI({period}) at {rsi:.2}"),
    ))
}

/// Close relative to the Bollinger Bands (mean-reversion reading).
pub fn bollinger_signal(
    close: f64,
    upper: f64,
    middle: f64,
    lower: f64,
) -> Result<SignalReading, TrendError> {
    let width = upper - lower;
    if is_flat(width, middle) {
        return Err(degenerate(SignalName::Bollinger, "band width collapsed to zero"));
    }

    let percent_b = (close - lower) / width;
    let (sentiment, label, description) = if close <= lower {
        (
            Sentiment::Bullish,
            "lower_band",
            "close at or below the lower band",
        )
    } else if close >= upper {
        (
            Sentiment::Bearish,
            "upper_band",
            "close at or above the upper band",
        )
    } else {
        (Sentiment::Neutral, "inside", "close inside the bands")
    };
    let position = if percent_b > 0.8 {
        "near top"
    } else if percent_b < 0.2 {
        "near bottom"
    } else {
        "middle"
    };

    Ok(
        SignalReading::new(sentiment, label, percent_b, description.to_string())
            .with_detail("position", position)
            .with_detail("squeeze", width / middle < SQUEEZE_WIDTH),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrend {
    Confirming,
    Diverging,
}

impl VolumeTrend {
    pub fn label(&self) -> &'static str {
        match self {
            VolumeTrend::Confirming => "confirming",
            VolumeTrend::Diverging => "diverging",
        }
    }
}

/// Recent volume against the full-window average, read in the direction of
/// the price move over the same recent bars.
pub fn volume_signal(
    recent_volume: f64,
    baseline_volume: f64,
    price_move: f64,
    reference_price: f64,
) -> Result<SignalReading, TrendError> {
    if baseline_volume <= 0.0 {
        return Err(degenerate(SignalName::Volume, "no traded volume in the window"));
    }

    let ratio = recent_volume / baseline_volume;
    let move_dir = direction(price_move, reference_price);
    let above_average = !is_flat(ratio - 1.0, 1.0) && ratio > 1.0;

    let trend = if above_average && move_dir != 0 {
        VolumeTrend::Confirming
    } else {
        VolumeTrend::Diverging
    };
    let sentiment = match trend {
        VolumeTrend::Confirming => Sentiment::from_direction(move_dir),
        VolumeTrend::Diverging => Sentiment::Neutral,
    };
    let description = match (trend, move_dir) {
        (VolumeTrend::Confirming, 1) => "above-average volume behind a rising price",
        (VolumeTrend::Confirming, _) => "above-average volume behind a falling price",
        (VolumeTrend::Diverging, 0) => "price flat over the recent bars",
        (VolumeTrend::Diverging, _) => "price move on below-average volume",
    };

    Ok(
        SignalReading::new(sentiment, trend.label(), ratio, description.to_string())
            .with_detail("spike", ratio > VOLUME_SPIKE_RATIO),
    )
}
