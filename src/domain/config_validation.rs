//! Configuration validation.
//!
//! Validates analyzer parameters before any series is analyzed.

use crate::domain::config::{AnalyzerConfig, SignalWeights};
use crate::domain::error::TrendError;

pub fn validate_analyzer_config(config: &AnalyzerConfig) -> Result<(), TrendError> {
    validate_periods(config)?;
    validate_ema_pair(config)?;
    validate_macd(config)?;
    validate_bollinger_k(config)?;
    validate_rsi_thresholds(config)?;
    validate_weights(&config.weights)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TrendError {
    TrendError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_periods(config: &AnalyzerConfig) -> Result<(), TrendError> {
    let periods = [
        ("short_ema", config.short_ema),
        ("long_ema", config.long_ema),
        ("rsi_period", config.rsi_period),
        ("bollinger_period", config.bollinger_period),
        ("macd_fast", config.macd_fast),
        ("macd_slow", config.macd_slow),
        ("macd_signal", config.macd_signal),
        ("ema_cross_lookback", config.ema_cross_lookback),
        ("macd_trend_bars", config.macd_trend_bars),
        ("volume_recent_bars", config.volume_recent_bars),
        ("levels_window", config.levels_window),
    ];
    for (key, value) in periods {
        if value == 0 {
            return Err(invalid("analyzer", key, format!("{key} must be at least 1")));
        }
    }
    Ok(())
}

fn validate_ema_pair(config: &AnalyzerConfig) -> Result<(), TrendError> {
    if config.short_ema >= config.long_ema {
        return Err(invalid(
            "analyzer",
            "short_ema",
            format!(
                "short_ema ({}) must be below long_ema ({})",
                config.short_ema, config.long_ema
            ),
        ));
    }
    Ok(())
}

fn validate_macd(config: &AnalyzerConfig) -> Result<(), TrendError> {
    if config.macd_fast >= config.macd_slow {
        return Err(invalid(
            "analyzer",
            "macd_fast",
            format!(
                "macd_fast ({}) must be below macd_slow ({})",
                config.macd_fast, config.macd_slow
            ),
        ));
    }
    Ok(())
}

fn validate_bollinger_k(config: &AnalyzerConfig) -> Result<(), TrendError> {
    let k = config.bollinger_k;
    if !k.is_finite() || k < 0.01 {
        return Err(invalid(
            "analyzer",
            "bollinger_k",
            "bollinger_k must be a finite value of at least 0.01",
        ));
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &AnalyzerConfig) -> Result<(), TrendError> {
    let (low, high) = (config.rsi_oversold, config.rsi_overbought);
    if !(low.is_finite() && high.is_finite() && 0.0 < low && low < high && high < 100.0) {
        return Err(invalid(
            "analyzer",
            "rsi_oversold",
            format!("thresholds must satisfy 0 < rsi_oversold ({low}) < rsi_overbought ({high}) < 100"),
        ));
    }
    Ok(())
}

fn validate_weights(weights: &SignalWeights) -> Result<(), TrendError> {
    for (key, weight) in weights.as_array() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(invalid(
                "weights",
                key,
                format!("{key} must be a non-negative number"),
            ));
        }
    }
    if weights.total() <= 0.0 {
        return Err(invalid("weights", "momentum", "at least one weight must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(err: TrendError) -> String {
        match err {
            TrendError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_analyzer_config(&AnalyzerConfig::default()).is_ok());
    }

    #[test]
    fn zero_period_rejected() {
        let config = AnalyzerConfig {
            rsi_period: 0,
            ..AnalyzerConfig::default()
        };
        assert_eq!(key_of(validate_analyzer_config(&config).unwrap_err()), "rsi_period");
    }

    #[test]
    fn short_ema_must_be_below_long() {
        let config = AnalyzerConfig {
            short_ema: 21,
            ..AnalyzerConfig::default()
        };
        assert_eq!(key_of(validate_analyzer_config(&config).unwrap_err()), "short_ema");
    }

    #[test]
    fn macd_fast_must_be_below_slow() {
        let config = AnalyzerConfig {
            macd_fast: 30,
            ..AnalyzerConfig::default()
        };
        assert_eq!(key_of(validate_analyzer_config(&config).unwrap_err()), "macd_fast");
    }

    #[test]
    fn bollinger_k_must_be_positive() {
        for k in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = AnalyzerConfig {
                bollinger_k: k,
                ..AnalyzerConfig::default()
            };
            assert_eq!(key_of(validate_analyzer_config(&config).unwrap_err()), "bollinger_k");
        }
    }

    #[test]
    fn rsi_thresholds_must_be_ordered() {
        let config = AnalyzerConfig {
            rsi_oversold: 70.0,
            rsi_overbought: 30.0,
            ..AnalyzerConfig::default()
        };
        assert_eq!(key_of(validate_analyzer_config(&config).unwrap_err()), "rsi_oversold");

        let config = AnalyzerConfig {
            rsi_overbought: 100.0,
            ..AnalyzerConfig::default()
        };
        assert!(validate_analyzer_config(&config).is_err());
    }

    #[test]
    fn negative_weight_rejected() {
        let mut config = AnalyzerConfig::default();
        config.weights.volume = -0.5;
        assert_eq!(key_of(validate_analyzer_config(&config).unwrap_err()), "volume");
    }

    #[test]
    fn all_zero_weights_rejected() {
        let mut config = AnalyzerConfig::default();
        config.weights = SignalWeights {
            momentum: 0.0,
            ema_cross: 0.0,
            macd: 0.0,
            rsi: 0.0,
            bollinger: 0.0,
            volume: 0.0,
        };
        assert!(validate_analyzer_config(&config).is_err());
    }

    #[test]
    fn zero_weight_for_one_signal_is_allowed() {
        let mut config = AnalyzerConfig::default();
        config.weights.bollinger = 0.0;
        assert!(validate_analyzer_config(&config).is_ok());
    }
}
