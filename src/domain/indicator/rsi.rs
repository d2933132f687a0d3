//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n bars
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (no movement at
//! all), which yields the midpoint 50.
//!
//! Warmup: first n bars are invalid (need n price changes to compute initial average).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

/// Wilder averages at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiState {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl RsiState {
    pub fn rsi(&self) -> f64 {
        if self.avg_loss == 0.0 {
            if self.avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            100.0 - (100.0 / (1.0 + self.avg_gain / self.avg_loss))
        }
    }

    /// Average absolute close-to-close change over the smoothing window.
    pub fn movement(&self) -> f64 {
        self.avg_gain + self.avg_loss
    }
}

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let states = rsi_states(bars, period);
    let values = bars
        .iter()
        .zip(states)
        .map(|(bar, state)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: state.is_some(),
            value: IndicatorValue::Simple(state.map(|s| s.rsi()).unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// Wilder state per bar; `None` through the warmup.
pub fn rsi_states(bars: &[OhlcvBar], period: usize) -> Vec<Option<RsiState>> {
    let mut states = vec![None; bars.len()];
    if period == 0 || bars.len() < 2 {
        return states;
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    if gains.len() < period {
        return states;
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    states[period] = Some(RsiState { avg_gain, avg_loss });

    for gain_idx in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[gain_idx]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[gain_idx]) / period as f64;
        states[gain_idx + 1] = Some(RsiState { avg_gain, avg_loss });
    }

    states
}
