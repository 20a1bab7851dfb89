//! CLI definition and pipeline wiring.

use chrono::NaiveDate;
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::adapters::close_benchmark::CloseBenchmark;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::dry_run_engine::DryRunEngine;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_broker::{BrokerCredentials, PaperBroker};
use crate::adapters::trader::Trader;
use crate::domain::asset::{Asset, AssetType};
use crate::domain::dataset::{load_pool, DataHorizon, DatasetPool, Timestep};
use crate::domain::dispatch::{Collaborators, DispatchReport, Dispatcher};
use crate::domain::error::AlgotraderError;
use crate::domain::registry::StrategyRegistry;
use crate::domain::run::{
    BacktestWindow, RunMode, RunSettings, DEFAULT_BENCHMARK, DEFAULT_BUDGET, DEFAULT_STATS_DIR,
};
use crate::domain::stats::PerfCounters;
use crate::ports::broker_port::BrokerPort;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TICKERS: &str = "SPY,DJP,TLT,GLD,IEF";

#[derive(Parser, Debug)]
#[command(
    name = "algotrader",
    about = "Run trading strategies live or against historical data",
    after_help = "Example: algotrader buy_and_hold momentum_pandas"
)]
pub struct Cli {
    /// Strategies to run, in order
    #[arg(required = true)]
    pub strategies: Vec<String>,
    /// Enable live trading
    #[arg(short, long)]
    pub live_trading: bool,
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding <SYMBOL>.csv price files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Directory for per-run stats files
    #[arg(long)]
    pub stats_dir: Option<PathBuf>,
}

/// Where the dataset pool comes from and what it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub assets: Vec<Asset>,
    pub horizon: DataHorizon,
}

pub fn run(cli: Cli) -> ExitCode {
    let mut counters = PerfCounters::new();
    match execute(&cli, &mut counters) {
        Ok(_) => {
            for line in counters.report_lines() {
                println!("{line}");
            }
            info!("The end");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads config and data, then dispatches every requested strategy.
pub fn execute(cli: &Cli, counters: &mut PerfCounters) -> Result<DispatchReport, AlgotraderError> {
    let config = load_config(cli.config.as_ref())?;

    let mut settings = build_run_settings(&config)?;
    if let Some(dir) = &cli.stats_dir {
        settings.stats_dir = dir.clone();
    }
    let mut data = build_data_settings(&config)?;
    if let Some(dir) = &cli.data_dir {
        data.dir = dir.clone();
    }

    info!(
        dir = %data.dir.display(),
        tickers = data.assets.len(),
        "loading price data"
    );
    let adapter = CsvAdapter::new(data.dir.clone());
    let pool = counters.time("load_data", || {
        load_pool(&adapter, &data.assets, &data.horizon)
    })?;
    let registry = build_registry(&pool, &config)?;

    let mode = RunMode::from_live_flag(cli.live_trading);
    if mode == RunMode::Backtest {
        check_backtest_inputs(&settings, &data, &pool)?;
    }
    let broker: Option<Arc<dyn BrokerPort>> = match mode {
        RunMode::Live => {
            let credentials = BrokerCredentials::from_config(&config)?;
            Some(Arc::new(PaperBroker::new(credentials)?))
        }
        RunMode::Backtest => None,
    };

    let mut engine = DryRunEngine::new();
    let benchmark = CloseBenchmark::new(&pool);
    let mut trader = Trader::new();
    let mut ports = Collaborators {
        engine: &mut engine,
        benchmark: &benchmark,
        broker,
        runner: &mut trader,
    };

    let mut dispatcher = Dispatcher::new(&registry, &pool, &settings);
    dispatcher.dispatch(&cli.strategies, mode, &mut ports, counters)
}

/// Rejects backtest settings that can only fail once runs have started.
fn check_backtest_inputs(
    settings: &RunSettings,
    data: &DataSettings,
    pool: &DatasetPool,
) -> Result<(), AlgotraderError> {
    if pool.get_symbol(&settings.benchmark).is_none() {
        return Err(AlgotraderError::invalid_config(
            "run",
            "benchmark",
            format!("{} is not one of the loaded [data] tickers", settings.benchmark),
        ));
    }
    let window = settings.window;
    if window.start < data.horizon.date_start || window.end > data.horizon.date_end {
        return Err(AlgotraderError::invalid_config(
            "run",
            "backtesting_start",
            format!(
                "window {}..{} is outside the [data] range {}..{}",
                window.start, window.end, data.horizon.date_start, data.horizon.date_end
            ),
        ));
    }
    Ok(())
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, AlgotraderError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| AlgotraderError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn date_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: NaiveDate,
) -> Result<NaiveDate, AlgotraderError> {
    match config.get_string(section, key) {
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
            AlgotraderError::invalid_config(
                section,
                key,
                "invalid date format (expected YYYY-MM-DD)",
            )
        }),
        None => Ok(default),
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn build_run_settings(config: &dyn ConfigPort) -> Result<RunSettings, AlgotraderError> {
    let budget = config.get_double("run", "budget", DEFAULT_BUDGET);
    if !(budget.is_finite() && budget > 0.0) {
        return Err(AlgotraderError::invalid_config(
            "run",
            "budget",
            "must be a positive number",
        ));
    }

    let start = date_or(config, "run", "backtesting_start", ymd(2019, 2, 28))?;
    let end = date_or(config, "run", "backtesting_end", ymd(2019, 12, 1))?;
    if start > end {
        return Err(AlgotraderError::invalid_config(
            "run",
            "backtesting_start",
            format!("start {start} is after end {end}"),
        ));
    }

    let benchmark = config
        .get_string("run", "benchmark")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());
    let stats_dir = config
        .get_string("run", "stats_dir")
        .unwrap_or_else(|| DEFAULT_STATS_DIR.to_string());

    Ok(RunSettings {
        budget,
        window: BacktestWindow { start, end },
        benchmark,
        stats_dir: PathBuf::from(stats_dir),
    })
}

/// Splits a comma-separated ticker list. Empty entries and duplicates are
/// rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, String> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let ticker = token.trim().to_uppercase();
        if ticker.is_empty() {
            return Err("empty ticker in list".into());
        }
        if !seen.insert(ticker.clone()) {
            return Err(format!("duplicate ticker: {ticker}"));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, AlgotraderError> {
    let dir = config
        .get_string("data", "dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    let asset_type = match config.get_string("data", "asset_type") {
        Some(s) => s
            .parse::<AssetType>()
            .map_err(|e| AlgotraderError::invalid_config("data", "asset_type", e))?,
        None => AssetType::Stock,
    };
    let tickers = config
        .get_string("data", "tickers")
        .unwrap_or_else(|| DEFAULT_TICKERS.to_string());
    let assets = parse_tickers(&tickers)
        .map_err(|e| AlgotraderError::invalid_config("data", "tickers", e))?
        .iter()
        .map(|t| Asset::new(t, asset_type))
        .collect();

    let date_start = date_or(config, "data", "date_start", ymd(2019, 1, 6))?;
    let date_end = date_or(config, "data", "date_end", ymd(2019, 12, 15))?;
    if date_start > date_end {
        return Err(AlgotraderError::invalid_config(
            "data",
            "date_start",
            format!("start {date_start} is after end {date_end}"),
        ));
    }

    let timestep = match config.get_string("data", "timestep") {
        Some(s) => s
            .parse::<Timestep>()
            .map_err(|e| AlgotraderError::invalid_config("data", "timestep", e))?,
        None => Timestep::Day,
    };

    Ok(DataSettings {
        dir: PathBuf::from(dir),
        assets,
        horizon: DataHorizon {
            date_start,
            date_end,
            timestep,
        },
    })
}

/// The built-in registry with `[strategy.<name>]` sections attached as static
/// config payloads.
pub fn build_registry(
    pool: &DatasetPool,
    config: &dyn ConfigPort,
) -> Result<StrategyRegistry, AlgotraderError> {
    let mut registry = StrategyRegistry::builtin(&pool.assets());
    let names: Vec<String> = registry.names().iter().map(|n| n.to_string()).collect();
    for name in names {
        if let Some(section) = config.get_section(&format!("strategy.{name}")) {
            registry.set_static_config(&name, section)?;
        }
    }
    Ok(registry)
}
