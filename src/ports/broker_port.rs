//! Live trading ports: the broker connection and the batch runner that owns
//! registered live strategies.

use crate::domain::error::AlgotraderError;
use crate::domain::run::LiveStrategy;

pub trait BrokerPort {
    fn name(&self) -> &str;
    fn is_paper(&self) -> bool;
    /// Attaches a registered strategy to this broker's session.
    fn start_session(&self, strategy: &LiveStrategy) -> Result<(), AlgotraderError>;
}

/// Collects live strategies and runs them together once registration is done.
pub trait BatchRunner {
    fn add_strategy(&mut self, strategy: LiveStrategy);
    /// Runs every registered strategy until stopped externally.
    fn run_all(&mut self) -> Result<(), AlgotraderError>;
}
