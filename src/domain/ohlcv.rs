//! OHLCV bar representation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Describe the first invariant this bar breaks, if any.
    ///
    /// Prices must be finite and positive, volume finite and non-negative,
    /// and low <= min(open, close) <= max(open, close) <= high.
    pub fn violation(&self) -> Option<String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Some(format!("{name} must be a positive finite price, got {value}"));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Some(format!(
                "volume must be non-negative and finite, got {}",
                self.volume
            ));
        }
        if self.low > self.high {
            return Some(format!("low {} above high {}", self.low, self.high));
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low {
            return Some(format!("low {} above open/close {}", self.low, body_low));
        }
        if body_high > self.high {
            return Some(format!("open/close {} above high {}", body_high, self.high));
        }
        None
    }
}
