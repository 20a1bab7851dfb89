//! Run statistics: stats file naming and named elapsed-time counters.

use crate::domain::registry::StrategyKind;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// `<dir>/strategy_<TypeName>_<unix_ts>.csv`. Second granularity: two runs of
/// the same kind started in the same second get the same path.
pub fn stats_file_path(dir: &Path, kind: StrategyKind, unix_ts: i64) -> PathBuf {
    dir.join(format!("strategy_{}_{}.csv", kind.type_name(), unix_ts))
}

/// Issues stats file paths that are unique within this process by suffixing
/// `_1`, `_2`, ... onto a path that was already handed out.
#[derive(Debug, Clone)]
pub struct StatsFileNamer {
    dir: PathBuf,
    issued: HashSet<PathBuf>,
}

impl StatsFileNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            issued: HashSet::new(),
        }
    }

    pub fn next(&mut self, kind: StrategyKind, unix_ts: i64) -> PathBuf {
        let mut path = stats_file_path(&self.dir, kind, unix_ts);
        let mut n = 0u32;
        while self.issued.contains(&path) {
            n += 1;
            path = self.dir.join(format!(
                "strategy_{}_{}_{}.csv",
                kind.type_name(),
                unix_ts,
                n
            ));
        }
        self.issued.insert(path.clone());
        path
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Counter {
    pub elapsed: Duration,
    pub hits: u64,
}

impl Counter {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Named elapsed-time accumulators. Never reset; report once at the end.
#[derive(Debug, Clone, Default)]
pub struct PerfCounters {
    counters: BTreeMap<String, Counter>,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, elapsed: Duration) {
        let counter = self.counters.entry(name.to_string()).or_default();
        counter.elapsed += elapsed;
        counter.hits += 1;
    }

    /// Runs `f` and adds its wall-clock time to `name`.
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = f();
        self.add(name, started.elapsed());
        out
    }

    pub fn get(&self, name: &str) -> Option<&Counter> {
        self.counters.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Counter)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn report_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(name, c)| format!("Count {} spent {:.6}s", name, c.seconds()))
            .collect()
    }
}
