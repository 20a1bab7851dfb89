#![allow(dead_code)]

use algotrader::adapters::csv_adapter::CsvAdapter;
use algotrader::domain::asset::Asset;
use algotrader::domain::dataset::{load_pool, DataHorizon, DatasetPool, Timestep};
use algotrader::domain::error::AlgotraderError;
use algotrader::domain::registry::{DataSourceKind, StrategyKind};
use algotrader::domain::run::{BacktestWindow, LiveStrategy, RunSettings};
use algotrader::domain::stats::PerfCounters;
use algotrader::ports::backtest_port::{BacktestPort, BacktestRequest};
use algotrader::ports::benchmark_port::BenchmarkPort;
use algotrader::ports::broker_port::{BatchRunner, BrokerPort};
use chrono::{Datelike, NaiveDate, Weekday};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

pub const TICKERS: [&str; 5] = ["SPY", "DJP", "TLT", "GLD", "IEF"];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBacktest {
    pub name: String,
    pub kind: StrategyKind,
    pub budget: f64,
    pub data_source: DataSourceKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub scope_strategy: Option<String>,
    pub pool_len: usize,
    pub stats_file: PathBuf,
    pub use_cache: bool,
    pub static_config: Option<Vec<(String, String)>>,
}

/// Records every request and touches the stats file, like a real engine would.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Vec<RecordedBacktest>,
    pub fail_with: Option<String>,
}

impl BacktestPort for RecordingEngine {
    fn backtest(
        &mut self,
        request: &BacktestRequest<'_>,
        counters: &mut PerfCounters,
    ) -> Result<(), AlgotraderError> {
        if let Some(reason) = &self.fail_with {
            return Err(AlgotraderError::Backtest {
                reason: reason.clone(),
            });
        }
        self.calls.push(RecordedBacktest {
            name: request.name.to_string(),
            kind: request.kind,
            budget: request.budget,
            data_source: request.data_source,
            start: request.start,
            end: request.end,
            scope_strategy: request.data.as_ref().map(|s| s.strategy().to_string()),
            pool_len: request.data.as_ref().map(|s| s.pool().len()).unwrap_or(0),
            stats_file: request.stats_file.to_path_buf(),
            use_cache: request.use_cache,
            static_config: request
                .config
                .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        });
        counters.time("engine.recording", || {
            if let Some(parent) = request.stats_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(request.stats_file, "recorded\n")
        })?;
        Ok(())
    }
}

pub struct RecordingBenchmark {
    pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
    pub value: f64,
}

impl RecordingBenchmark {
    pub fn new(value: f64) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            value,
        }
    }
}

impl BenchmarkPort for RecordingBenchmark {
    fn calculate_returns(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, AlgotraderError> {
        self.calls.borrow_mut().push((symbol.to_string(), start, end));
        Ok(self.value)
    }
}

/// Always fails, after the backtest it follows has already run.
pub struct FailingBenchmark;

impl BenchmarkPort for FailingBenchmark {
    fn calculate_returns(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, AlgotraderError> {
        Err(AlgotraderError::NoData {
            symbol: symbol.to_string(),
            start,
            end,
        })
    }
}

#[derive(Default)]
pub struct StubBroker {
    pub sessions: Cell<usize>,
}

impl BrokerPort for StubBroker {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_paper(&self) -> bool {
        true
    }

    fn start_session(&self, _strategy: &LiveStrategy) -> Result<(), AlgotraderError> {
        self.sessions.set(self.sessions.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingRunner {
    pub added: Vec<LiveStrategy>,
    pub run_all_calls: usize,
    /// Number of strategies registered when `run_all` was first called.
    pub registered_at_run: Option<usize>,
}

impl BatchRunner for RecordingRunner {
    fn add_strategy(&mut self, strategy: LiveStrategy) {
        self.added.push(strategy);
    }

    fn run_all(&mut self) -> Result<(), AlgotraderError> {
        self.run_all_calls += 1;
        self.registered_at_run.get_or_insert(self.added.len());
        Ok(())
    }
}

/// Writes `<dir>/<symbol>.csv` with one weekday bar per day in `[start, end]`,
/// rows in descending order so loaders have to sort. Returns the row count.
pub fn write_fixture(dir: &Path, symbol: &str, start: NaiveDate, end: NaiveDate) -> usize {
    let mut rows = Vec::new();
    let mut day = start;
    let mut i = 0;
    while day <= end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let close = 100.0 + i as f64;
            rows.push(format!(
                "{},{},{},{},{},{},{}",
                day,
                close - 0.5,
                close + 1.0,
                close - 1.0,
                close,
                close,
                1_000 + i
            ));
            i += 1;
        }
        day = day.succ_opt().unwrap();
    }
    rows.reverse();
    let count = rows.len();
    let content = format!(
        "Date,Open,High,Low,Close,Adj Close,Volume\n{}\n",
        rows.join("\n")
    );
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
    count
}

pub fn fixture_horizon() -> DataHorizon {
    DataHorizon {
        date_start: date(2019, 1, 6),
        date_end: date(2019, 12, 15),
        timestep: Timestep::Day,
    }
}

pub fn write_all_fixtures(dir: &Path) {
    for symbol in TICKERS {
        write_fixture(dir, symbol, date(2019, 1, 6), date(2019, 12, 15));
    }
}

/// The five-symbol pool spanning 2019-01-06..2019-12-15.
pub fn fixture_pool(dir: &Path) -> DatasetPool {
    write_all_fixtures(dir);
    let assets: Vec<Asset> = TICKERS.iter().map(|s| Asset::stock(s)).collect();
    load_pool(
        &CsvAdapter::new(dir.to_path_buf()),
        &assets,
        &fixture_horizon(),
    )
    .unwrap()
}

pub fn scenario_settings(stats_dir: &Path) -> RunSettings {
    RunSettings {
        budget: 40_000.0,
        window: BacktestWindow {
            start: date(2019, 2, 28),
            end: date(2019, 12, 1),
        },
        benchmark: "SPY".into(),
        stats_dir: stats_dir.to_path_buf(),
    }
}

pub fn count_files(dir: &Path) -> usize {
    match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).count(),
        Err(_) => 0,
    }
}
