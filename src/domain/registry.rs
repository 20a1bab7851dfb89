//! Strategy registry: static lookup from strategy name to execution config.

use crate::domain::asset::Asset;
use crate::domain::error::AlgotraderError;
use std::collections::BTreeMap;
use std::fmt;

/// Strategy implementations the launcher knows how to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    BuyAndHold,
    DebtTrading,
    Diversification,
    FastTrading,
    IntradayMomentum,
    Momentum,
    Simple,
}

impl StrategyKind {
    /// Type name used in stats file names.
    pub fn type_name(&self) -> &'static str {
        match self {
            StrategyKind::BuyAndHold => "BuyAndHold",
            StrategyKind::DebtTrading => "DebtTrading",
            StrategyKind::Diversification => "Diversification",
            StrategyKind::FastTrading => "FastTrading",
            StrategyKind::IntradayMomentum => "IntradayMomentum",
            StrategyKind::Momentum => "Momentum",
            StrategyKind::Simple => "Simple",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Where a backtest gets its historical prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    /// The dataset pool loaded from local files.
    LocalData,
    /// Remote daily prices fetched by the engine itself.
    Yahoo,
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceKind::LocalData => f.write_str("local"),
            DataSourceKind::Yahoo => f.write_str("yahoo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyArg {
    Assets(Vec<Asset>),
    Text(String),
    Number(f64),
    Flag(bool),
}

pub type StrategyArgs = BTreeMap<String, StrategyArg>;

/// Free-form key/value payload handed to the strategy untouched.
pub type StaticConfig = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    /// `None` means the strategy is live-only.
    pub backtest: Option<DataSourceKind>,
    pub args: StrategyArgs,
    pub config: Option<StaticConfig>,
    /// Whether backtests receive the shared dataset pool.
    pub bind_pool: bool,
    /// `false` forces every backtest to re-execute instead of reusing a
    /// memoized result.
    pub backtest_cache: bool,
}

impl StrategyConfig {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            backtest: None,
            args: StrategyArgs::new(),
            config: None,
            bind_pool: false,
            backtest_cache: true,
        }
    }

    pub fn backtest_with(mut self, source: DataSourceKind) -> Self {
        self.backtest = Some(source);
        self
    }

    pub fn with_pool(mut self) -> Self {
        self.bind_pool = true;
        self
    }

    pub fn with_arg(mut self, key: &str, value: StrategyArg) -> Self {
        self.args.insert(key.to_string(), value);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.backtest_cache = false;
        self
    }

    pub fn supports_backtest(&self) -> bool {
        self.backtest.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    entries: BTreeMap<String, StrategyConfig>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in strategy table. `pool_assets` is handed to strategies that
    /// take the full symbol list as an argument.
    pub fn builtin(pool_assets: &[Asset]) -> Self {
        use DataSourceKind::{LocalData, Yahoo};
        use StrategyKind::*;

        let mut registry = Self::new();
        registry.register(
            "momentum_pandas",
            StrategyConfig::new(Momentum)
                .backtest_with(LocalData)
                .with_pool()
                .with_arg("symbols", StrategyArg::Assets(pool_assets.to_vec())),
        );
        registry.register(
            "diversification",
            StrategyConfig::new(Diversification)
                .backtest_with(LocalData)
                .with_pool(),
        );
        registry.register(
            "debt_trading",
            StrategyConfig::new(DebtTrading).backtest_with(Yahoo),
        );
        registry.register("intraday_momentum", StrategyConfig::new(IntradayMomentum));
        registry.register(
            "fast_trading",
            StrategyConfig::new(FastTrading).without_cache(),
        );
        registry.register(
            "buy_and_hold",
            StrategyConfig::new(BuyAndHold)
                .backtest_with(LocalData)
                .with_pool()
                .without_cache(),
        );
        registry.register(
            "simple",
            StrategyConfig::new(Simple)
                .backtest_with(LocalData)
                .with_pool()
                .without_cache(),
        );
        registry
    }

    pub fn register(&mut self, name: &str, config: StrategyConfig) {
        self.entries.insert(name.to_string(), config);
    }

    /// Attaches a static config payload to an existing entry.
    pub fn set_static_config(
        &mut self,
        name: &str,
        config: StaticConfig,
    ) -> Result<(), AlgotraderError> {
        let known = self.known_names();
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| AlgotraderError::UnknownStrategy {
                name: name.to_string(),
                known,
            })?;
        entry.config = Some(config);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&StrategyConfig, AlgotraderError> {
        self.entries
            .get(name)
            .ok_or_else(|| AlgotraderError::UnknownStrategy {
                name: name.to_string(),
                known: self.known_names(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn known_names(&self) -> String {
        self.names().join(", ")
    }
}
