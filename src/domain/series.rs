//! Validated bar series for a single ticker.

use crate::domain::error::TrendError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::{NaiveDateTime, TimeDelta};

/// Time-ordered bars for one symbol.
///
/// Construction checks every bar and the strict ordering of timestamps, so
/// holders of a `BarSeries` can rely on both invariants.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, TrendError> {
        for (index, bar) in bars.iter().enumerate() {
            if let Some(reason) = bar.violation() {
                return Err(TrendError::MalformedBar {
                    index,
                    timestamp: bar.timestamp,
                    reason,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(TrendError::MalformedBar {
                    index,
                    timestamp: bar.timestamp,
                    reason: format!(
                        "timestamp not after previous bar ({})",
                        bars[index - 1].timestamp
                    ),
                });
            }
        }

        Ok(Self {
            symbol: symbol.into().to_uppercase(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// (first timestamp, last timestamp) or None when empty.
    pub fn range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    pub fn span(&self) -> TimeDelta {
        self.range()
            .map(|(start, end)| end - start)
            .unwrap_or_else(TimeDelta::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::hours(h)
    }

    fn bar(h: i64, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: hour(h),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn accepts_ordered_bars() {
        let series = BarSeries::new("tsla", vec![bar(0, 10.0), bar(1, 11.0), bar(2, 12.0)]).unwrap();
        assert_eq!(series.symbol(), "TSLA");
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().map(|b| b.close), Some(12.0));
        assert_eq!(series.span(), TimeDelta::hours(2));
    }

    #[test]
    fn empty_series_is_constructible() {
        let series = BarSeries::new("AAPL", vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.range(), None);
        assert_eq!(series.span(), TimeDelta::zero());
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = BarSeries::new("X", vec![bar(0, 10.0), bar(1, 11.0), bar(1, 12.0)]).unwrap_err();
        match err {
            TrendError::MalformedBar { index, reason, .. } => {
                assert_eq!(index, 2);
                assert!(reason.contains("not after previous"));
            }
            other => panic!("expected MalformedBar, got {other:?}"),
        }
    }

    #[test]
    fn rejects_decreasing_timestamp() {
        let err = BarSeries::new("X", vec![bar(5, 10.0), bar(4, 11.0)]).unwrap_err();
        assert!(matches!(err, TrendError::MalformedBar { index: 1, .. }));
    }

    #[test]
    fn rejects_bad_ohlc_ordering() {
        let mut broken = bar(1, 11.0);
        broken.low = 20.0;
        let err = BarSeries::new("X", vec![bar(0, 10.0), broken]).unwrap_err();
        match err {
            TrendError::MalformedBar {
                index, timestamp, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(timestamp, hour(1));
            }
            other => panic!("expected MalformedBar, got {other:?}"),
        }
    }
}
