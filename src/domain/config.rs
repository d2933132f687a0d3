//! Analyzer parameters and their defaults.

use crate::domain::indicator::{bollinger, macd, rsi};
use crate::domain::period::Period;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHORT_EMA: usize = 9;
pub const DEFAULT_LONG_EMA: usize = 21;
pub const DEFAULT_BOLLINGER_K: f64 = 2.0;
pub const DEFAULT_EMA_CROSS_LOOKBACK: usize = 5;
pub const DEFAULT_MACD_TREND_BARS: usize = 3;
pub const DEFAULT_VOLUME_RECENT_BARS: usize = 3;
pub const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;
pub const DEFAULT_RSI_OVERSOLD: f64 = 30.0;
pub const DEFAULT_LEVELS_WINDOW: usize = 20;

/// Vote weight per signal.
///
/// The trend-following readings (momentum, EMA cross) carry more weight than
/// the mean-reversion ones, so a steady one-directional move is never
/// out-voted by the overbought/oversold readings it produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub momentum: f64,
    pub ema_cross: f64,
    pub macd: f64,
    pub rsi: f64,
    pub bollinger: f64,
    pub volume: f64,
}

impl SignalWeights {
    pub fn total(&self) -> f64 {
        self.as_array().iter().map(|(_, w)| w).sum()
    }

    pub fn as_array(&self) -> [(&'static str, f64); 6] {
        [
            ("momentum", self.momentum),
            ("ema_cross", self.ema_cross),
            ("macd", self.macd),
            ("rsi", self.rsi),
            ("bollinger", self.bollinger),
            ("volume", self.volume),
        ]
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            momentum: 4.0,
            ema_cross: 2.0,
            macd: 1.0,
            rsi: 1.0,
            bollinger: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub period: Period,
    pub short_ema: usize,
    pub long_ema: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Bars inside which an EMA cross still counts as fresh.
    pub ema_cross_lookback: usize,
    /// Valid histogram points the MACD trend check looks at.
    pub macd_trend_bars: usize,
    /// Bars averaged for "recent" volume.
    pub volume_recent_bars: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Bars scanned for support and resistance.
    pub levels_window: usize,
    pub weights: SignalWeights,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            short_ema: DEFAULT_SHORT_EMA,
            long_ema: DEFAULT_LONG_EMA,
            rsi_period: rsi::DEFAULT_PERIOD,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_k: DEFAULT_BOLLINGER_K,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            ema_cross_lookback: DEFAULT_EMA_CROSS_LOOKBACK,
            macd_trend_bars: DEFAULT_MACD_TREND_BARS,
            volume_recent_bars: DEFAULT_VOLUME_RECENT_BARS,
            rsi_overbought: DEFAULT_RSI_OVERBOUGHT,
            rsi_oversold: DEFAULT_RSI_OVERSOLD,
            levels_window: DEFAULT_LEVELS_WINDOW,
            weights: SignalWeights::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Bars each indicator needs, slowest first on ties.
    pub fn requirements(&self) -> [(&'static str, usize); 5] {
        [
            (
                "MACD",
                macd::required_bars(self.macd_fast, self.macd_slow, self.macd_signal),
            ),
            ("EMA", self.long_ema.max(self.short_ema)),
            ("Bollinger", self.bollinger_period),
            ("RSI", self.rsi_period + 1),
            ("Volume", self.volume_recent_bars + 1),
        ]
    }

    /// Shortest series the analyzer accepts.
    pub fn minimum_bars(&self) -> usize {
        self.requirements()
            .iter()
            .map(|(_, bars)| *bars)
            .max()
            .unwrap_or(0)
    }
}
