//! Backtest engine port trait.

use crate::domain::dataset::DatasetScope;
use crate::domain::error::AlgotraderError;
use crate::domain::registry::{DataSourceKind, StaticConfig, StrategyArgs, StrategyKind};
use crate::domain::stats::PerfCounters;
use chrono::NaiveDate;
use std::path::Path;

/// Everything the engine needs for one synchronous backtest.
#[derive(Debug, Clone)]
pub struct BacktestRequest<'a> {
    pub name: &'a str,
    pub kind: StrategyKind,
    pub budget: f64,
    pub data_source: DataSourceKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub data: Option<DatasetScope<'a>>,
    pub stats_file: &'a Path,
    pub config: Option<&'a StaticConfig>,
    pub args: &'a StrategyArgs,
    /// `false` forces a fresh run even if the engine memoized this one.
    pub use_cache: bool,
}

pub trait BacktestPort {
    /// Blocks until the backtest completes. The engine may add its own
    /// timings to `counters`.
    fn backtest(
        &mut self,
        request: &BacktestRequest<'_>,
        counters: &mut PerfCounters,
    ) -> Result<(), AlgotraderError>;
}
