//! Per-invocation settings and the per-strategy run records built from them.

use crate::domain::registry::{StrategyArgs, StrategyKind};
use crate::ports::broker_port::BrokerPort;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_BUDGET: f64 = 40_000.0;
pub const DEFAULT_BENCHMARK: &str = "SPY";
pub const DEFAULT_STATS_DIR: &str = "logs";

/// Live or backtest, decided once for the whole invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Backtest,
    Live,
}

impl RunMode {
    pub fn from_live_flag(live_trading: bool) -> Self {
        if live_trading { RunMode::Live } else { RunMode::Backtest }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktestWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub budget: f64,
    pub window: BacktestWindow,
    pub benchmark: String,
    pub stats_dir: PathBuf,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            window: BacktestWindow {
                start: NaiveDate::from_ymd_opt(2019, 2, 28).unwrap_or_default(),
                end: NaiveDate::from_ymd_opt(2019, 12, 1).unwrap_or_default(),
            },
            benchmark: DEFAULT_BENCHMARK.to_string(),
            stats_dir: PathBuf::from(DEFAULT_STATS_DIR),
        }
    }
}

/// One dispatch of one strategy name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRun {
    pub name: String,
    pub kind: StrategyKind,
    pub stats_file: PathBuf,
    pub budget: f64,
    /// Only set for backtests.
    pub window: Option<BacktestWindow>,
}

/// A strategy instance bound to the shared broker, waiting for the batch runner.
#[derive(Clone)]
pub struct LiveStrategy {
    pub run: ExecutionRun,
    pub args: StrategyArgs,
    broker: Arc<dyn BrokerPort>,
}

impl LiveStrategy {
    pub fn new(run: ExecutionRun, args: StrategyArgs, broker: Arc<dyn BrokerPort>) -> Self {
        Self { run, args, broker }
    }

    pub fn name(&self) -> &str {
        &self.run.name
    }

    pub fn broker(&self) -> &Arc<dyn BrokerPort> {
        &self.broker
    }
}

impl std::fmt::Debug for LiveStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveStrategy")
            .field("run", &self.run)
            .field("args", &self.args)
            .field("broker", &self.broker.name())
            .finish()
    }
}
