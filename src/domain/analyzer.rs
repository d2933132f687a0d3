//! Trend analyzer: bar series in, verdict out.
//!
//! Computes every indicator over the whole series, reads a signal off each,
//! and combines the signals with the configured weights. Indicators that are
//! undefined for the series (no movement, no volume) vote neutral and are
//! listed in `TrendVerdict::degraded`.

use crate::domain::config::AnalyzerConfig;
use crate::domain::config_validation::validate_analyzer_config;
use crate::domain::error::TrendError;
use crate::domain::indicator::bollinger::mult_x100;
use crate::domain::indicator::macd::histogram_values;
use crate::domain::indicator::rsi::rsi_states;
use crate::domain::indicator::volume::recent_average_volume;
use crate::domain::indicator::{
    IndicatorSeries, IndicatorValue, calculate_average_volume, calculate_bollinger,
    calculate_ema, calculate_macd,
};
use crate::domain::levels::PriceLevels;
use crate::domain::period::Period;
use crate::domain::series::BarSeries;
use crate::domain::signal::{
    SignalName, SignalReading, bollinger_signal, ema_cross_signal, macd_signal, momentum_signal,
    rsi_signal, volume_signal,
};
use crate::domain::verdict::{IndicatorSnapshot, TrendVerdict, aggregate};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Analyzer with validated parameters. The default instance uses
/// `AnalyzerConfig::default()`.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: AnalyzerConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, TrendError> {
        validate_analyzer_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Fails with `InsufficientData` naming the most demanding indicator
    /// when the series is too short for it.
    pub fn check_sufficient(&self, bars: usize) -> Result<(), TrendError> {
        let (indicator, required) = self
            .config
            .requirements()
            .into_iter()
            .fold(("", 0), |best, req| if req.1 > best.1 { req } else { best });

        if bars < required {
            return Err(TrendError::InsufficientData {
                indicator: indicator.to_string(),
                bars,
                required,
            });
        }
        Ok(())
    }

    pub fn analyze_trend(
        &self,
        series: &BarSeries,
        period: Period,
    ) -> Result<TrendVerdict, TrendError> {
        self.check_sufficient(series.len())?;
        let cfg = &self.config;
        let bars = series.bars();
        let n = bars.len();
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(insufficient("series", 0, 1)),
        };

        let ema_short = calculate_ema(bars, cfg.short_ema);
        let ema_long = calculate_ema(bars, cfg.long_ema);
        let macd = calculate_macd(bars, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        let rsi_state = rsi_states(bars, cfg.rsi_period)
            .last()
            .copied()
            .flatten()
            .ok_or_else(|| insufficient("RSI", n, cfg.rsi_period + 1))?;
        let bollinger = calculate_bollinger(bars, cfg.bollinger_period, mult_x100(cfg.bollinger_k));
        let average_volume = calculate_average_volume(bars, n)
            .latest_simple()
            .ok_or_else(|| insufficient("Volume", n, n))?;

        let short_values = simple_values(&ema_short);
        let long_values = simple_values(&ema_long);
        let (macd_line, macd_signal_line, macd_histogram) = match macd.latest() {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) => (*line, *signal, *histogram),
            _ => return Err(insufficient("MACD", n, cfg.minimum_bars())),
        };
        let (upper, middle, lower) = match bollinger.latest() {
            Some(IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            }) => (*upper, *middle, *lower),
            _ => return Err(insufficient("Bollinger", n, cfg.bollinger_period)),
        };

        let snapshot = IndicatorSnapshot {
            ema_short: short_values.last().copied().unwrap_or_default(),
            ema_long: long_values.last().copied().unwrap_or_default(),
            macd_line,
            macd_signal: macd_signal_line,
            macd_histogram,
            rsi: rsi_state.rsi(),
            bollinger_upper: upper,
            bollinger_mid: middle,
            bollinger_lower: lower,
            average_volume,
        };
        debug!(symbol = %series.symbol(), bars = n, ?snapshot, "Indicators computed");

        let recent_volume = recent_average_volume(bars, cfg.volume_recent_bars)
            .ok_or_else(|| insufficient("Volume", n, cfg.volume_recent_bars + 1))?;
        let price_move = last.close - bars[n - 1 - cfg.volume_recent_bars].close;

        let evaluated = [
            (
                SignalName::Momentum,
                Ok(momentum_signal(first.close, last.close, middle)),
            ),
            (
                SignalName::EmaCross,
                ema_cross_signal(
                    &short_values,
                    &long_values,
                    cfg.short_ema,
                    cfg.long_ema,
                    cfg.ema_cross_lookback,
                ),
            ),
            (
                SignalName::Macd,
                macd_signal(
                    &histogram_values(&macd),
                    macd_line,
                    macd_signal_line,
                    cfg.macd_trend_bars,
                    last.close,
                ),
            ),
            (
                SignalName::Rsi,
                rsi_signal(
                    rsi_state,
                    cfg.rsi_period,
                    cfg.rsi_overbought,
                    cfg.rsi_oversold,
                    last.close,
                ),
            ),
            (
                SignalName::Bollinger,
                bollinger_signal(last.close, upper, middle, lower),
            ),
            (
                SignalName::Volume,
                volume_signal(recent_volume, average_volume, price_move, last.close),
            ),
        ];

        let mut signals = BTreeMap::new();
        let mut degraded = Vec::new();
        for (name, result) in evaluated {
            let reading = match result {
                Ok(reading) => reading,
                Err(err @ TrendError::DegenerateSeries { .. }) => {
                    warn!(symbol = %series.symbol(), signal = ?name, "{err}");
                    degraded.push(name);
                    SignalReading::degraded(&err)
                }
                Err(err) => return Err(err),
            };
            signals.insert(name, reading.weighted(self.weight_of(name)));
        }

        let vote = aggregate(signals.values());
        debug!(
            symbol = %series.symbol(),
            score = vote.score,
            confidence = vote.confidence,
            sentiment = %vote.sentiment,
            "Signals aggregated"
        );

        let levels = PriceLevels::from_bars(bars, cfg.levels_window)
            .ok_or_else(|| insufficient("levels", n, 1))?;

        Ok(TrendVerdict {
            symbol: series.symbol().to_string(),
            period,
            as_of: last.timestamp,
            sentiment: vote.sentiment,
            confidence: vote.confidence,
            weighted_score: vote.score,
            signals,
            snapshot,
            levels,
            current_price: last.close,
            price_change_percent: (last.close - first.close) / first.close * 100.0,
            bars_analyzed: n,
            degraded,
        })
    }

    fn weight_of(&self, name: SignalName) -> f64 {
        let w = &self.config.weights;
        match name {
            SignalName::Momentum => w.momentum,
            SignalName::EmaCross => w.ema_cross,
            SignalName::Macd => w.macd,
            SignalName::Rsi => w.rsi,
            SignalName::Bollinger => w.bollinger,
            SignalName::Volume => w.volume,
        }
    }
}

/// Analyze with the default configuration.
pub fn analyze_trend(series: &BarSeries, period: Period) -> Result<TrendVerdict, TrendError> {
    TrendAnalyzer::default().analyze_trend(series, period)
}

fn insufficient(indicator: &str, bars: usize, required: usize) -> TrendError {
    TrendError::InsufficientData {
        indicator: indicator.to_string(),
        bars,
        required,
    }
}

fn simple_values(series: &IndicatorSeries) -> Vec<f64> {
    series
        .valid_values()
        .filter_map(|v| match v {
            IndicatorValue::Simple(x) => Some(*x),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;
    use crate::domain::signal::Sentiment;

    fn series(prices: &[f64]) -> BarSeries {
        BarSeries::new("test", make_bars(prices)).unwrap()
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn analyzer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrendAnalyzer>();
    }

    #[test]
    fn too_short_names_macd_and_shortfall() {
        let err = analyze_trend(&series(&rising(10)), Period::SevenDays).unwrap_err();
        match &err {
            TrendError::InsufficientData {
                indicator,
                bars,
                required,
            } => {
                assert_eq!(indicator, "MACD");
                assert_eq!((*bars, *required), (10, 34));
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
        assert_eq!(err.shortfall(), Some(24));
    }

    #[test]
    fn empty_series_is_insufficient() {
        let empty = BarSeries::new("X", Vec::new()).unwrap();
        assert!(matches!(
            analyze_trend(&empty, Period::SevenDays),
            Err(TrendError::InsufficientData { .. })
        ));
    }

    #[test]
    fn slowest_indicator_named_for_custom_config() {
        let analyzer = TrendAnalyzer::new(AnalyzerConfig {
            bollinger_period: 60,
            ..AnalyzerConfig::default()
        })
        .unwrap();
        let err = analyzer.check_sufficient(40).unwrap_err();
        assert!(matches!(
            err,
            TrendError::InsufficientData { ref indicator, required: 60, .. } if indicator == "Bollinger"
        ));
    }

    #[test]
    fn exact_minimum_is_enough() {
        let verdict = analyze_trend(&series(&rising(34)), Period::SevenDays).unwrap();
        assert_eq!(verdict.bars_analyzed, 34);
        assert_eq!(verdict.sentiment, Sentiment::Bullish);
    }

    #[test]
    fn invalid_config_rejected() {
        let result = TrendAnalyzer::new(AnalyzerConfig {
            short_ema: 30,
            ..AnalyzerConfig::default()
        });
        assert!(matches!(result, Err(TrendError::ConfigInvalid { .. })));
    }

    #[test]
    fn linear_rise_is_bullish() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 40.0 / 39.0).collect();
        let verdict = analyze_trend(&series(&prices), Period::SevenDays).unwrap();

        assert_eq!(verdict.sentiment, Sentiment::Bullish);
        assert!(verdict.confidence > 0.0);
        assert!(verdict.snapshot.rsi > 50.0);
        assert!(verdict.snapshot.ema_short > verdict.snapshot.ema_long);
        assert_eq!(verdict.signals.len(), 6);
        assert!((verdict.price_change_percent - 40.0).abs() < 1e-9);
        assert_eq!(verdict.current_price, *prices.last().unwrap());
    }

    #[test]
    fn flat_series_is_neutral_and_degraded() {
        let verdict = analyze_trend(&series(&[50.0; 40]), Period::ThirtyDays).unwrap();

        assert_eq!(verdict.sentiment, Sentiment::Neutral);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.period, Period::ThirtyDays);
        assert!(verdict.degraded.contains(&SignalName::Rsi));
        assert!(verdict.degraded.contains(&SignalName::Bollinger));
        assert!(!verdict.degraded.contains(&SignalName::Volume));
        let rsi = verdict.signal(SignalName::Rsi).unwrap();
        assert!(rsi.degraded.is_some());
        assert_eq!(rsi.weight, 1.0);
    }

    #[test]
    fn steps_below_price_tolerance_read_as_flat() {
        for step in [1e-9, -1e-9] {
            let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * step).collect();
            let verdict = analyze_trend(&series(&prices), Period::SevenDays).unwrap();

            assert_eq!(verdict.sentiment, Sentiment::Neutral, "step {step}");
            assert_eq!(verdict.confidence, 0.0);
            assert!(verdict.degraded.contains(&SignalName::Rsi));
            assert_eq!(
                verdict.signal(SignalName::Rsi).unwrap().sentiment,
                Sentiment::Neutral
            );
        }
    }

    #[test]
    fn zero_volume_degrades_volume_signal() {
        let mut bars = make_bars(&rising(40));
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let series = BarSeries::new("ZV", bars).unwrap();
        let verdict = analyze_trend(&series, Period::SevenDays).unwrap();
        assert_eq!(verdict.degraded, vec![SignalName::Volume]);
        assert_eq!(verdict.sentiment, Sentiment::Bullish);
    }

    #[test]
    fn weights_are_attached_to_readings() {
        let verdict = analyze_trend(&series(&rising(40)), Period::SevenDays).unwrap();
        assert_eq!(verdict.signal(SignalName::Momentum).unwrap().weight, 4.0);
        assert_eq!(verdict.signal(SignalName::EmaCross).unwrap().weight, 2.0);
        let total: f64 = verdict.signals.values().map(|r| r.weight).sum();
        assert_eq!(total, 10.0);
    }
}
