#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tickertrend::domain::error::TrendError;
pub use tickertrend::domain::ohlcv::OhlcvBar;
use tickertrend::domain::period::Period;
use tickertrend::domain::series::BarSeries;
use tickertrend::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str, _period: Period) -> Result<BarSeries, TrendError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrendError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        BarSeries::new(symbol, bars)
    }

    fn list_symbols(&self, _period: Period) -> Result<Vec<String>, TrendError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn hour(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
        + TimeDelta::hours(i as i64)
}

/// Bar at hour `i` with a small range around the close.
pub fn make_bar(i: usize, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: hour(i),
        open: close,
        high: close * 1.001,
        low: close * 0.999,
        close,
        volume,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, 1000.0))
        .collect()
}

/// `n` closes moving linearly from `start` to `end`.
pub fn linear(n: usize, start: f64, end: f64) -> Vec<f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(|i| start + step * i as f64).collect()
}

pub fn series(symbol: &str, closes: &[f64]) -> BarSeries {
    BarSeries::new(symbol, bars_from_closes(closes)).unwrap()
}

pub fn csv_text(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("time,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
