//! Domain error types.

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgotraderError {
    #[error("strategy {name} does not exist (known strategies: {known})")]
    UnknownStrategy { name: String, known: String },

    #[error("backtesting is not supported for strategy {name}")]
    BacktestUnsupported { name: String },

    #[error("failed to load data for {symbol}: {reason}")]
    DataLoad { symbol: String, reason: String },

    #[error("no data for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("broker error: {reason}")]
    Broker { reason: String },

    #[error("backtest engine error: {reason}")]
    Backtest { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgotraderError {
    pub fn invalid_config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AlgotraderError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<&AlgotraderError> for std::process::ExitCode {
    fn from(err: &AlgotraderError) -> Self {
        let code: u8 = match err {
            AlgotraderError::Io(_) => 1,
            AlgotraderError::ConfigParse { .. }
            | AlgotraderError::ConfigMissing { .. }
            | AlgotraderError::ConfigInvalid { .. } => 2,
            AlgotraderError::UnknownStrategy { .. }
            | AlgotraderError::BacktestUnsupported { .. } => 3,
            AlgotraderError::DataLoad { .. } | AlgotraderError::NoData { .. } => 4,
            AlgotraderError::Broker { .. } | AlgotraderError::Backtest { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
