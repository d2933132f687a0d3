//! Market data port trait.

use crate::domain::error::TrendError;
use crate::domain::period::Period;
use crate::domain::series::BarSeries;

pub trait DataPort {
    /// Validated hourly bars for `symbol` over `period`, oldest first.
    fn fetch_series(&self, symbol: &str, period: Period) -> Result<BarSeries, TrendError>;

    /// Symbols with data available for `period`, sorted.
    fn list_symbols(&self, period: Period) -> Result<Vec<String>, TrendError>;
}
