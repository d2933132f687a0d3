//! CSV file data adapter.
//!
//! Reads hourly bars from `{SYMBOL}_{period}.csv` files under a base
//! directory, or from a single file given directly. Expected header:
//! `time,open,high,low,close,volume`.

use crate::domain::error::TrendError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::Period;
use crate::domain::series::BarSeries;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, symbol: &str, period: Period) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.trim().to_uppercase(), period))
    }

    /// Read one CSV file as the series for `symbol`.
    pub fn read_file(path: &Path, symbol: &str) -> Result<BarSeries, TrendError> {
        let content = fs::read_to_string(path).map_err(|e| TrendError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let bars = parse_bars(&content)?;
        debug!(path = %path.display(), bars = bars.len(), "CSV loaded");
        BarSeries::new(symbol, bars)
    }
}

fn source_error(line: u64, reason: impl std::fmt::Display) -> TrendError {
    TrendError::DataSource {
        reason: format!("line {line}: {reason}"),
    }
}

fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("nan")
}

/// Parse CSV text into bars sorted by time.
///
/// Rows with an empty or NaN open are gaps in the feed and are skipped. An
/// empty or NaN volume reads as zero. Bar invariants are left to
/// `BarSeries::new`.
pub fn parse_bars(content: &str) -> Result<Vec<OhlcvBar>, TrendError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| TrendError::DataSource {
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .ok_or_else(|| source_error(line, format!("missing {name} column")))
        };
        let number = |idx: usize, name: &str| -> Result<f64, TrendError> {
            let raw = field(idx, name)?;
            raw.parse::<f64>()
                .map_err(|e| source_error(line, format!("invalid {name} value '{raw}': {e}")))
        };

        let open_raw = field(1, "open")?;
        if is_missing(open_raw) {
            debug!(line, "Skipping row without an open price");
            continue;
        }

        let time_raw = field(0, "time")?;
        let timestamp = parse_time(time_raw)
            .ok_or_else(|| source_error(line, format!("invalid time '{time_raw}'")))?;

        let volume = if is_missing(field(5, "volume")?) {
            0.0
        } else {
            number(5, "volume")?
        };

        bars.push(OhlcvBar {
            timestamp,
            open: number(1, "open")?,
            high: number(2, "high")?,
            low: number(3, "low")?,
            close: number(4, "close")?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str, period: Period) -> Result<BarSeries, TrendError> {
        let path = self.csv_path(symbol, period);
        if !path.exists() {
            return Err(TrendError::DataSource {
                reason: format!("no {} data for {} ({})", period, symbol, path.display()),
            });
        }
        Self::read_file(&path, symbol)
    }

    fn list_symbols(&self, period: Period) -> Result<Vec<String>, TrendError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TrendError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", period);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TrendError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const SAMPLE: &str = "time,open,high,low,close,volume\n\
        2024-03-04 10:30,100.0,101.5,99.5,101.0,1200\n\
        2024-03-04 09:30,99.0,100.5,98.5,100.0,1500\n\
        2024-03-04 11:30,NaN,NaN,NaN,NaN,0\n\
        2024-03-04 12:30,101.0,102.0,100.5,101.8,900.5\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(path.join("TSLA_7d.csv"), SAMPLE).unwrap();
        fs::write(path.join("AAPL_7d.csv"), "time,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("NVDA_30d.csv"), "time,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("notes.txt"), "ignore me").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_returns_sorted_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch_series("tsla", Period::SevenDays).unwrap();
        assert_eq!(series.symbol(), "TSLA");
        assert_eq!(series.len(), 3);

        let first = &series.bars()[0];
        assert_eq!(
            first.timestamp,
            NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
        assert_eq!(first.open, 99.0);
        assert_eq!(first.high, 100.5);
        assert_eq!(first.low, 98.5);
        assert_eq!(first.close, 100.0);
        assert_eq!(first.volume, 1500.0);
        assert_eq!(series.bars()[2].volume, 900.5);
    }

    #[test]
    fn fetch_series_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_series("XYZ", Period::SevenDays);
        assert!(matches!(result, Err(TrendError::DataSource { .. })));
    }

    #[test]
    fn list_symbols_by_period() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(
            adapter.list_symbols(Period::SevenDays).unwrap(),
            vec!["AAPL", "TSLA"]
        );
        assert_eq!(adapter.list_symbols(Period::ThirtyDays).unwrap(), vec!["NVDA"]);
    }

    #[test]
    fn list_symbols_missing_directory() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/tickertrend/data"));
        assert!(adapter.list_symbols(Period::SevenDays).is_err());
    }

    #[test]
    fn alternate_time_formats() {
        let csv = "time,open,high,low,close,volume\n\
            2024-03-04 09:30:00,1,1,1,1,1\n\
            2024-03-04T10:30:00Z,1,1,1,1,1\n";
        let bars = parse_bars(csv).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].timestamp - bars[0].timestamp, chrono::TimeDelta::hours(1));
    }

    #[test]
    fn bad_number_is_data_source_error() {
        let csv = "time,open,high,low,close,volume\n2024-03-04 09:30,1,abc,1,1,1\n";
        let err = parse_bars(csv).unwrap_err();
        assert!(err.to_string().contains("invalid high value"));
    }

    #[test]
    fn missing_volume_reads_as_zero() {
        let csv = "time,open,high,low,close,volume\n\
            2024-03-04 09:30,1,1,1,1,\n\
            2024-03-04 10:30,1,1,1,1,NaN\n\
            2024-03-04 11:30,1,1,1,1,250\n";
        let volumes: Vec<f64> = parse_bars(csv).unwrap().iter().map(|b| b.volume).collect();
        assert_eq!(volumes, vec![0.0, 0.0, 250.0]);
    }

    #[test]
    fn bad_time_is_data_source_error() {
        let csv = "time,open,high,low,close,volume\n04/03/2024,1,1,1,1,1\n";
        assert!(matches!(
            parse_bars(csv),
            Err(TrendError::DataSource { .. })
        ));
    }

    #[test]
    fn invalid_bar_fails_series_validation() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.csv");
        fs::write(
            &file,
            "time,open,high,low,close,volume\n2024-03-04 09:30,10,9,11,10,100\n",
        )
        .unwrap();

        let err = CsvAdapter::read_file(&file, "BAD").unwrap_err();
        assert!(matches!(err, TrendError::MalformedBar { index: 0, .. }));
    }

    #[test]
    fn duplicate_timestamps_fail_validation() {
        let csv = "time,open,high,low,close,volume\n\
            2024-03-04 09:30,1,1,1,1,1\n\
            2024-03-04 09:30,1,1,1,1,1\n";
        let bars = parse_bars(csv).unwrap();
        assert!(matches!(
            BarSeries::new("DUP", bars),
            Err(TrendError::MalformedBar { index: 1, .. })
        ));
    }
}
