//! Backtest engine that checks a request against its bound data and writes
//! the stats artifact without simulating any trades.
//!
//! Each bound asset gets one row: bars inside the window, first and last close,
//! and the close-to-close return. Summaries are memoized per (run name,
//! window) unless the request disables caching.

use crate::domain::error::AlgotraderError;
use crate::domain::stats::PerfCounters;
use crate::ports::backtest_port::{BacktestPort, BacktestRequest};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub symbol: String,
    pub asset_type: String,
    pub bars: usize,
    pub first_close: Option<f64>,
    pub last_close: Option<f64>,
    pub timestep: String,
}

impl AssetSummary {
    pub fn window_return(&self) -> Option<f64> {
        match (self.first_close, self.last_close) {
            (Some(first), Some(last)) if first != 0.0 => Some(last / first - 1.0),
            _ => None,
        }
    }
}

type CacheKey = (String, NaiveDate, NaiveDate);

#[derive(Debug, Default)]
pub struct DryRunEngine {
    cache: HashMap<CacheKey, Vec<AssetSummary>>,
}

impl DryRunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn summarize(request: &BacktestRequest<'_>) -> Vec<AssetSummary> {
        let Some(scope) = &request.data else {
            return Vec::new();
        };
        scope
            .pool()
            .iter()
            .map(|dataset| {
                let bars = dataset.window(request.start, request.end);
                AssetSummary {
                    symbol: dataset.asset().symbol().to_string(),
                    asset_type: dataset.asset().asset_type().to_string(),
                    bars: bars.len(),
                    first_close: bars.first().map(|b| b.close),
                    last_close: bars.last().map(|b| b.close),
                    timestep: dataset.timestep().to_string(),
                }
            })
            .collect()
    }

    fn write_stats(
        request: &BacktestRequest<'_>,
        summaries: &[AssetSummary],
    ) -> Result<(), AlgotraderError> {
        if let Some(parent) = request.stats_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let csv_error = |e: csv::Error| AlgotraderError::Backtest {
            reason: format!("failed to write {}: {}", request.stats_file.display(), e),
        };
        let mut writer = csv::Writer::from_path(request.stats_file).map_err(csv_error)?;
        writer
            .write_record([
                "strategy",
                "kind",
                "symbol",
                "asset_type",
                "bars",
                "first_close",
                "last_close",
                "return",
                "budget",
                "timestep",
            ])
            .map_err(csv_error)?;

        let fmt_opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        for s in summaries {
            writer
                .write_record([
                    request.name.to_string(),
                    request.kind.type_name().to_string(),
                    s.symbol.clone(),
                    s.asset_type.clone(),
                    s.bars.to_string(),
                    fmt_opt(s.first_close),
                    fmt_opt(s.last_close),
                    fmt_opt(s.window_return()),
                    request.budget.to_string(),
                    s.timestep.clone(),
                ])
                .map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl BacktestPort for DryRunEngine {
    fn backtest(
        &mut self,
        request: &BacktestRequest<'_>,
        counters: &mut PerfCounters,
    ) -> Result<(), AlgotraderError> {
        if request.start > request.end {
            return Err(AlgotraderError::Backtest {
                reason: format!(
                    "window start {} is after end {}",
                    request.start, request.end
                ),
            });
        }
        if !(request.budget.is_finite() && request.budget > 0.0) {
            return Err(AlgotraderError::Backtest {
                reason: format!("budget must be positive, got {}", request.budget),
            });
        }
        if let Some(scope) = &request.data {
            if scope.strategy() != request.name {
                return Err(AlgotraderError::Backtest {
                    reason: format!(
                        "dataset scope belongs to {}, not {}",
                        scope.strategy(),
                        request.name
                    ),
                });
            }
            let outside = scope
                .pool()
                .iter()
                .find(|d| request.start < d.date_start() || request.end > d.date_end());
            if let Some(dataset) = outside {
                return Err(AlgotraderError::Backtest {
                    reason: format!(
                        "window {}..{} is outside the loaded data for {} ({}..{})",
                        request.start,
                        request.end,
                        dataset.asset(),
                        dataset.date_start(),
                        dataset.date_end()
                    ),
                });
            }
        }

        let key = (request.name.to_string(), request.start, request.end);
        let summaries = match self.cache.get(&key) {
            Some(cached) if request.use_cache => {
                debug!(strategy = request.name, "reusing memoized backtest");
                counters.add("engine.cache_hits", std::time::Duration::ZERO);
                cached.clone()
            }
            _ => {
                let fresh = counters.time("engine.summaries", || Self::summarize(request));
                self.cache.insert(key, fresh.clone());
                fresh
            }
        };

        counters.time("engine.write", || Self::write_stats(request, &summaries))?;
        info!(
            strategy = request.name,
            assets = summaries.len(),
            stats_file = %request.stats_file.display(),
            "stats written"
        );
        Ok(())
    }
}
