//! Time series datasets and the shared dataset pool.
//!
//! The pool is loaded once at startup for every configured instrument and is
//! never mutated afterwards. A backtest sees it through a [`DatasetScope`],
//! which pairs the pool with the name of the strategy the run belongs to.

use crate::domain::asset::Asset;
use crate::domain::error::AlgotraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Bar granularity. Bars are keyed by calendar date, so only daily data is
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timestep {
    #[default]
    Day,
}

impl Timestep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timestep::Day => "day",
        }
    }
}

impl fmt::Display for Timestep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timestep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Timestep::Day),
            "minute" => Err("intraday bars are not supported (expected day)".into()),
            other => Err(format!("unknown timestep '{other}' (expected day)")),
        }
    }
}

/// Date bounds and granularity shared by every dataset in the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataHorizon {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub timestep: Timestep,
}

#[derive(Debug, Clone)]
pub struct TimeSeriesDataset {
    asset: Asset,
    bars: Vec<OhlcvBar>,
    date_start: NaiveDate,
    date_end: NaiveDate,
    timestep: Timestep,
}

impl TimeSeriesDataset {
    /// Builds a dataset from bars in any order. Bars outside `horizon` are
    /// dropped; duplicate dates and an empty result are errors.
    pub fn new(
        asset: Asset,
        mut bars: Vec<OhlcvBar>,
        horizon: &DataHorizon,
    ) -> Result<Self, AlgotraderError> {
        bars.retain(|b| b.date >= horizon.date_start && b.date <= horizon.date_end);
        bars.sort_by_key(|b| b.date);

        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(AlgotraderError::DataLoad {
                symbol: asset.symbol().to_string(),
                reason: format!("duplicate date {}", pair[0].date),
            });
        }

        if bars.is_empty() {
            return Err(AlgotraderError::NoData {
                symbol: asset.symbol().to_string(),
                start: horizon.date_start,
                end: horizon.date_end,
            });
        }

        Ok(Self {
            asset,
            bars,
            date_start: horizon.date_start,
            date_end: horizon.date_end,
            timestep: horizon.timestep,
        })
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn date_start(&self) -> NaiveDate {
        self.date_start
    }

    pub fn date_end(&self) -> NaiveDate {
        self.date_end
    }

    pub fn timestep(&self) -> Timestep {
        self.timestep
    }

    /// Bars dated within `[start, end]`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[OhlcvBar] {
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date <= end);
        if lo >= hi { &[] } else { &self.bars[lo..hi] }
    }
}

/// Every loaded dataset, keyed by asset. Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct DatasetPool {
    datasets: Vec<TimeSeriesDataset>,
    index: HashMap<Asset, usize>,
}

impl DatasetPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dataset, replacing any previous one for the same asset.
    pub fn insert(&mut self, dataset: TimeSeriesDataset) {
        match self.index.get(dataset.asset()) {
            Some(&i) => self.datasets[i] = dataset,
            None => {
                self.index.insert(dataset.asset().clone(), self.datasets.len());
                self.datasets.push(dataset);
            }
        }
    }

    pub fn get(&self, asset: &Asset) -> Option<&TimeSeriesDataset> {
        self.index.get(asset).map(|&i| &self.datasets[i])
    }

    /// Looks a dataset up by symbol alone, whatever its asset type.
    pub fn get_symbol(&self, symbol: &str) -> Option<&TimeSeriesDataset> {
        let symbol = symbol.trim().to_uppercase();
        self.datasets.iter().find(|d| d.asset().symbol() == symbol)
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.datasets.iter().map(|d| d.asset().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeSeriesDataset> {
        self.datasets.iter()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// A strategy's read-only view of the shared pool for one run.
#[derive(Debug, Clone)]
pub struct DatasetScope<'a> {
    strategy: String,
    pool: &'a DatasetPool,
}

impl<'a> DatasetScope<'a> {
    pub fn new(strategy: &str, pool: &'a DatasetPool) -> Self {
        Self {
            strategy: strategy.to_string(),
            pool,
        }
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn pool(&self) -> &'a DatasetPool {
        self.pool
    }
}

/// Loads one dataset per asset through `port`. Any failure aborts the whole
/// load: strategies share the pool, so a partial pool is never returned.
pub fn load_pool(
    port: &dyn DataPort,
    assets: &[Asset],
    horizon: &DataHorizon,
) -> Result<DatasetPool, AlgotraderError> {
    let mut pool = DatasetPool::new();
    for asset in assets {
        let bars = port.fetch_ohlcv(asset, horizon.date_start, horizon.date_end)?;
        let dataset = TimeSeriesDataset::new(asset.clone(), bars, horizon)?;
        debug!(
            asset = %asset,
            bars = dataset.bar_count(),
            "loaded dataset"
        );
        pool.insert(dataset);
    }
    info!(
        datasets = pool.len(),
        start = %horizon.date_start,
        end = %horizon.date_end,
        timestep = %horizon.timestep,
        "dataset pool ready"
    );
    Ok(pool)
}
