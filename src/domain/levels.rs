//! Recent support and resistance.

use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;

/// Distance from a level, relative to the close, that counts as "near".
pub const NEAR_LEVEL_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLevels {
    pub support: f64,
    pub resistance: f64,
    pub near_support: bool,
    pub near_resistance: bool,
}

impl PriceLevels {
    /// Lowest low and highest high over the last `window` bars.
    ///
    /// Returns None for an empty slice.
    pub fn from_bars(bars: &[OhlcvBar], window: usize) -> Option<Self> {
        let last = bars.last()?;
        let recent = &bars[bars.len().saturating_sub(window.max(1))..];

        let support = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let resistance = recent
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let near = |level: f64| (last.close - level).abs() / last.close < NEAR_LEVEL_FRACTION;

        Some(Self {
            support,
            resistance,
            near_support: near(support),
            near_resistance: near(resistance),
        })
    }
}
