//! Batch runner for live strategies.

use crate::domain::error::AlgotraderError;
use crate::domain::run::LiveStrategy;
use crate::ports::broker_port::BatchRunner;
use tracing::info;

/// Holds registered strategies in registration order and starts them together.
#[derive(Debug, Default)]
pub struct Trader {
    strategies: Vec<LiveStrategy>,
    started: bool,
}

impl Trader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategies(&self) -> &[LiveStrategy] {
        &self.strategies
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl BatchRunner for Trader {
    fn add_strategy(&mut self, strategy: LiveStrategy) {
        self.strategies.push(strategy);
    }

    fn run_all(&mut self) -> Result<(), AlgotraderError> {
        if self.started {
            return Err(AlgotraderError::Broker {
                reason: "trader is already running".into(),
            });
        }
        for strategy in &self.strategies {
            strategy.broker().start_session(strategy)?;
        }
        self.started = true;
        info!(strategies = self.strategies.len(), "all strategies started");
        Ok(())
    }
}
