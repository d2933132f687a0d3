//! Lookback period requested by the caller.
//!
//! The period picks which upstream feed supplies the bars (one week or one
//! month of hourly history). The analyzer itself does not depend on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::SevenDays, Period::ThirtyDays];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::SevenDays => "7d",
            Period::ThirtyDays => "30d",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Period::SevenDays => 7,
            Period::ThirtyDays => 30,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7d" => Ok(Period::SevenDays),
            "30d" => Ok(Period::ThirtyDays),
            other => Err(format!("period must be '7d' or '30d', got '{other}'")),
        }
    }
}
