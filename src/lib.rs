//! tickertrend — trend verdicts for hourly stock bars.
//!
//! Hexagonal layout: indicator math and the analyzer in [`domain`], port
//! traits in [`ports`], CSV and INI implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;

pub use domain::analyzer::{TrendAnalyzer, analyze_trend};
pub use domain::config::{AnalyzerConfig, SignalWeights};
pub use domain::error::TrendError;
pub use domain::ohlcv::OhlcvBar;
pub use domain::period::Period;
pub use domain::series::BarSeries;
pub use domain::signal::{Sentiment, SignalName, SignalReading};
pub use domain::verdict::{IndicatorSnapshot, TrendVerdict};
