//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analyzer::TrendAnalyzer;
use crate::domain::config::{AnalyzerConfig, SignalWeights};
use crate::domain::error::TrendError;
use crate::domain::period::Period;
use crate::domain::series::BarSeries;
use crate::domain::verdict::TrendVerdict;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "tickertrend", version, about = "Trend analysis for hourly stock bars")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze one symbol and print the verdict as JSON
    Analyze {
        #[arg(short, long)]
        symbol: String,
        /// 7d or 30d; overrides the config file
        #[arg(short, long)]
        period: Option<Period>,
        /// Directory of {SYMBOL}_{period}.csv files
        #[arg(long, required_unless_present = "input", conflicts_with = "input")]
        data_dir: Option<PathBuf>,
        /// A single CSV file
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Check that a CSV file holds a usable bar series
    Validate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = "UNKNOWN")]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List symbols with data for a period
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(short, long, default_value_t = Period::SevenDays)]
        period: Period,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), TrendError> {
    match cli.command {
        Command::Analyze {
            symbol,
            period,
            data_dir,
            input,
            config,
            compact,
        } => run_analyze(
            &symbol,
            period,
            data_dir.as_deref(),
            input.as_deref(),
            config.as_deref(),
            compact,
        ),
        Command::Validate {
            input,
            symbol,
            config,
        } => run_validate(&input, &symbol, config.as_deref()),
        Command::ListSymbols { data_dir, period } => run_list_symbols(data_dir, period),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrendError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    info!(path = %path.display(), "Loaded config");
    Ok(adapter)
}

fn config_or_default(path: Option<&Path>) -> Result<AnalyzerConfig, TrendError> {
    match path {
        Some(path) => build_analyzer_config(&load_config(path)?),
        None => Ok(AnalyzerConfig::default()),
    }
}

/// Read `[section] key`, falling back to `default` when absent.
fn read_key<T: FromStr>(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, TrendError>
where
    T::Err: std::fmt::Display,
{
    match adapter.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| TrendError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("'{}': {}", raw.trim(), e),
            }),
    }
}

/// Build analyzer parameters from `[analyzer]` and `[weights]`.
///
/// Missing keys keep their defaults. Values that do not parse are rejected
/// here; cross-field checks happen in `TrendAnalyzer::new`.
pub fn build_analyzer_config(adapter: &dyn ConfigPort) -> Result<AnalyzerConfig, TrendError> {
    let d = AnalyzerConfig::default();
    let dw = SignalWeights::default();
    let a = "analyzer";
    let w = "weights";

    Ok(AnalyzerConfig {
        period: read_key(adapter, a, "period", d.period)?,
        short_ema: read_key(adapter, a, "short_ema", d.short_ema)?,
        long_ema: read_key(adapter, a, "long_ema", d.long_ema)?,
        rsi_period: read_key(adapter, a, "rsi_period", d.rsi_period)?,
        bollinger_period: read_key(adapter, a, "bollinger_period", d.bollinger_period)?,
        bollinger_k: read_key(adapter, a, "bollinger_k", d.bollinger_k)?,
        macd_fast: read_key(adapter, a, "macd_fast", d.macd_fast)?,
        macd_slow: read_key(adapter, a, "macd_slow", d.macd_slow)?,
        macd_signal: read_key(adapter, a, "macd_signal", d.macd_signal)?,
        ema_cross_lookback: read_key(adapter, a, "ema_cross_lookback", d.ema_cross_lookback)?,
        macd_trend_bars: read_key(adapter, a, "macd_trend_bars", d.macd_trend_bars)?,
        volume_recent_bars: read_key(adapter, a, "volume_recent_bars", d.volume_recent_bars)?,
        rsi_overbought: read_key(adapter, a, "rsi_overbought", d.rsi_overbought)?,
        rsi_oversold: read_key(adapter, a, "rsi_oversold", d.rsi_oversold)?,
        levels_window: read_key(adapter, a, "levels_window", d.levels_window)?,
        weights: SignalWeights {
            momentum: read_key(adapter, w, "momentum", dw.momentum)?,
            ema_cross: read_key(adapter, w, "ema_cross", dw.ema_cross)?,
            macd: read_key(adapter, w, "macd", dw.macd)?,
            rsi: read_key(adapter, w, "rsi", dw.rsi)?,
            bollinger: read_key(adapter, w, "bollinger", dw.bollinger)?,
            volume: read_key(adapter, w, "volume", dw.volume)?,
        },
    })
}

pub fn render_verdict(verdict: &TrendVerdict, compact: bool) -> Result<String, TrendError> {
    let json = if compact {
        serde_json::to_string(verdict)
    } else {
        serde_json::to_string_pretty(verdict)
    };
    Ok(json.map_err(std::io::Error::from)?)
}

fn run_analyze(
    symbol: &str,
    period: Option<Period>,
    data_dir: Option<&Path>,
    input: Option<&Path>,
    config_path: Option<&Path>,
    compact: bool,
) -> Result<(), TrendError> {
    let config = config_or_default(config_path)?;
    let period = period.unwrap_or(config.period);
    let analyzer = TrendAnalyzer::new(config)?;

    let series = match (input, data_dir) {
        (Some(file), _) => CsvAdapter::read_file(file, symbol)?,
        (None, Some(dir)) => CsvAdapter::new(dir.to_path_buf()).fetch_series(symbol, period)?,
        (None, None) => {
            return Err(TrendError::DataSource {
                reason: "either --data-dir or --input is required".into(),
            });
        }
    };
    info!(symbol = %series.symbol(), %period, bars = series.len(), "Analyzing");

    let verdict = analyzer.analyze_trend(&series, period)?;
    info!(
        symbol = %verdict.symbol,
        sentiment = %verdict.sentiment,
        confidence = verdict.confidence,
        "Verdict ready"
    );
    println!("{}", render_verdict(&verdict, compact)?);
    Ok(())
}

fn run_validate(input: &Path, symbol: &str, config_path: Option<&Path>) -> Result<(), TrendError> {
    eprintln!("Validating bars: {}", input.display());
    let analyzer = TrendAnalyzer::new(config_or_default(config_path)?)?;
    let series = CsvAdapter::read_file(input, symbol)?;
    print_series_summary(&series);

    analyzer.check_sufficient(series.len())?;
    println!(
        "ready: {} bars, analysis needs {}",
        series.len(),
        analyzer.config().minimum_bars()
    );
    Ok(())
}

fn print_series_summary(series: &BarSeries) {
    println!("symbol: {}", series.symbol());
    println!("bars:   {}", series.len());
    if let Some((start, end)) = series.range() {
        let hours = series.span().num_hours();
        println!("range:  {} .. {} ({} hours)", start, end, hours);
        match Period::ALL.iter().find(|p| hours <= p.days() * 24) {
            Some(period) => println!("fits:   {}", period),
            None => println!("fits:   longer than {}", Period::ThirtyDays),
        }
    }
}

fn run_list_symbols(data_dir: PathBuf, period: Period) -> Result<(), TrendError> {
    let adapter = CsvAdapter::new(data_dir);
    let symbols = adapter.list_symbols(period)?;

    if symbols.is_empty() {
        eprintln!("No symbols found for period {}", period);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
