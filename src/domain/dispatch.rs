//! Strategy dispatch: resolves requested names and drives the live or backtest
//! path for each, in request order.

use crate::domain::dataset::{DatasetPool, DatasetScope};
use crate::domain::error::AlgotraderError;
use crate::domain::registry::{StrategyConfig, StrategyRegistry};
use crate::domain::run::{ExecutionRun, LiveStrategy, RunMode, RunSettings};
use crate::domain::stats::{PerfCounters, StatsFileNamer};
use crate::ports::backtest_port::{BacktestPort, BacktestRequest};
use crate::ports::benchmark_port::BenchmarkPort;
use crate::ports::broker_port::{BatchRunner, BrokerPort};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// External collaborators for one dispatch.
pub struct Collaborators<'c> {
    pub engine: &'c mut dyn BacktestPort,
    pub benchmark: &'c dyn BenchmarkPort,
    /// Required in live mode only.
    pub broker: Option<Arc<dyn BrokerPort>>,
    pub runner: &'c mut dyn BatchRunner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    pub run: ExecutionRun,
    pub elapsed: Duration,
    pub benchmark_return: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub backtests: Vec<BacktestOutcome>,
    pub registered: Vec<ExecutionRun>,
    pub batch_runs: usize,
}

pub struct Dispatcher<'a> {
    registry: &'a StrategyRegistry,
    pool: &'a DatasetPool,
    settings: &'a RunSettings,
    namer: StatsFileNamer,
    clock: Box<dyn Fn() -> i64 + 'a>,
    on_elapsed: Box<dyn FnMut(&str, Duration) + 'a>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        registry: &'a StrategyRegistry,
        pool: &'a DatasetPool,
        settings: &'a RunSettings,
    ) -> Self {
        Self {
            registry,
            pool,
            settings,
            namer: StatsFileNamer::new(settings.stats_dir.clone()),
            clock: Box::new(|| chrono::Utc::now().timestamp()),
            on_elapsed: Box::new(|_: &str, elapsed: Duration| {
                println!("Elapsed time: {}", elapsed.as_secs_f64());
            }),
        }
    }

    /// Replaces the Unix-seconds clock used for stats file names.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the hook called as soon as each backtest returns, before its
    /// benchmark is computed. Prints `Elapsed time: <secs>` by default.
    pub fn with_elapsed_hook(mut self, hook: impl FnMut(&str, Duration) + 'a) -> Self {
        self.on_elapsed = Box::new(hook);
        self
    }

    /// Every name is resolved (and, for backtests, checked for backtest
    /// support) before anything runs, so a bad request leaves no artifacts.
    pub fn dispatch(
        &mut self,
        names: &[String],
        mode: RunMode,
        ports: &mut Collaborators<'_>,
        counters: &mut PerfCounters,
    ) -> Result<DispatchReport, AlgotraderError> {
        let plan = self.plan(names, mode)?;
        let broker = match mode {
            RunMode::Live => Some(ports.broker.clone().ok_or_else(|| {
                AlgotraderError::Broker {
                    reason: "live trading requires a broker connection".into(),
                }
            })?),
            RunMode::Backtest => None,
        };

        let mut report = DispatchReport::default();
        for (name, config) in plan {
            let stats_file = self.namer.next(config.kind, (self.clock)());
            match &broker {
                Some(broker) => {
                    let run = ExecutionRun {
                        name: name.to_string(),
                        kind: config.kind,
                        stats_file,
                        budget: self.settings.budget,
                        window: None,
                    };
                    info!(
                        strategy = name,
                        broker = broker.name(),
                        paper = broker.is_paper(),
                        stats_file = %run.stats_file.display(),
                        "registered live strategy"
                    );
                    ports.runner.add_strategy(LiveStrategy::new(
                        run.clone(),
                        config.args.clone(),
                        Arc::clone(broker),
                    ));
                    report.registered.push(run);
                }
                None => {
                    let outcome = self.backtest(name, config, stats_file, ports, counters)?;
                    report.backtests.push(outcome);
                }
            }
        }

        if mode == RunMode::Live {
            info!(strategies = report.registered.len(), "starting live trading");
            ports.runner.run_all()?;
            report.batch_runs += 1;
        }

        Ok(report)
    }

    fn plan<'n>(
        &self,
        names: &'n [String],
        mode: RunMode,
    ) -> Result<Vec<(&'n str, &'a StrategyConfig)>, AlgotraderError> {
        let registry = self.registry;
        names
            .iter()
            .map(|name| {
                let config = registry.get(name)?;
                if mode == RunMode::Backtest && !config.supports_backtest() {
                    return Err(AlgotraderError::BacktestUnsupported { name: name.clone() });
                }
                Ok((name.as_str(), config))
            })
            .collect()
    }

    fn backtest(
        &mut self,
        name: &str,
        config: &StrategyConfig,
        stats_file: std::path::PathBuf,
        ports: &mut Collaborators<'_>,
        counters: &mut PerfCounters,
    ) -> Result<BacktestOutcome, AlgotraderError> {
        let data_source = config
            .backtest
            .ok_or_else(|| AlgotraderError::BacktestUnsupported {
                name: name.to_string(),
            })?;
        let window = self.settings.window;

        let request = BacktestRequest {
            name,
            kind: config.kind,
            budget: self.settings.budget,
            data_source,
            start: window.start,
            end: window.end,
            data: config
                .bind_pool
                .then(|| DatasetScope::new(name, self.pool)),
            stats_file: &stats_file,
            config: config.config.as_ref(),
            args: &config.args,
            use_cache: config.backtest_cache,
        };

        info!(
            strategy = name,
            kind = %config.kind,
            source = %data_source,
            start = %window.start,
            end = %window.end,
            "running backtest"
        );
        let started = Instant::now();
        ports.engine.backtest(&request, counters)?;
        let elapsed = started.elapsed();
        counters.add(&format!("backtest.{name}"), elapsed);
        (self.on_elapsed)(name, elapsed);

        info!("*** Benchmark Performance for {} ***", self.settings.benchmark);
        let benchmark_return =
            ports
                .benchmark
                .calculate_returns(&self.settings.benchmark, window.start, window.end)?;
        info!(
            symbol = %self.settings.benchmark,
            return_pct = benchmark_return * 100.0,
            "benchmark return"
        );

        Ok(BacktestOutcome {
            run: ExecutionRun {
                name: name.to_string(),
                kind: config.kind,
                stats_file,
                budget: self.settings.budget,
                window: Some(window),
            },
            elapsed,
            benchmark_return,
        })
    }
}
