//! Domain error types.

use chrono::NaiveDateTime;

/// Top-level error type for tickertrend.
#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error(
        "insufficient data for {indicator}: have {bars} bars, need {required} ({} more)",
        missing_bars(.bars, .required)
    )]
    InsufficientData {
        indicator: String,
        bars: usize,
        required: usize,
    },

    #[error("malformed bar at index {index} ({timestamp}): {reason}")]
    MalformedBar {
        index: usize,
        timestamp: NaiveDateTime,
        reason: String,
    },

    #[error("degenerate series for {indicator}: {reason}")]
    DegenerateSeries { indicator: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn missing_bars(bars: &usize, required: &usize) -> usize {
    required.saturating_sub(*bars)
}

impl TrendError {
    /// Bars still missing before the named indicator can be computed.
    pub fn shortfall(&self) -> Option<usize> {
        match self {
            TrendError::InsufficientData { bars, required, .. } => {
                Some(missing_bars(bars, required))
            }
            _ => None,
        }
    }
}

impl TrendError {
    /// Process exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            TrendError::Io(_) => 1,
            TrendError::ConfigParse { .. }
            | TrendError::ConfigMissing { .. }
            | TrendError::ConfigInvalid { .. } => 2,
            TrendError::DataSource { .. } => 3,
            TrendError::MalformedBar { .. } => 4,
            TrendError::InsufficientData { .. } => 5,
            TrendError::DegenerateSeries { .. } => 6,
        }
    }
}

impl From<&TrendError> for std::process::ExitCode {
    fn from(err: &TrendError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
