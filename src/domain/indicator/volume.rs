//! Rolling average volume.
//!
//! AVGVOL(n)[i] = sum(V[i-n+1..=i]) / n
//! Warmup: first (n-1) bars are invalid. The analyzer passes the full series
//! length as n, so only the latest bar carries a valid value there.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_average_volume(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = period > 0 && i + 1 >= period;
        let average = if valid {
            bars[i + 1 - period..=i].iter().map(|b| b.volume).sum::<f64>() / period as f64
        } else {
            0.0
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Simple(average),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::AverageVolume(period),
        values,
    }
}

/// Mean volume of the last `count` bars, or None when there are fewer.
pub fn recent_average_volume(bars: &[OhlcvBar], count: usize) -> Option<f64> {
    if count == 0 || bars.len() < count {
        return None;
    }
    let window = &bars[bars.len() - count..];
    Some(window.iter().map(|b| b.volume).sum::<f64>() / count as f64)
}
