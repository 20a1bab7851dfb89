//! Port traits for the collaborators the orchestration layer drives.

pub mod config_port;
pub mod data_port;
pub mod broker_port;
pub mod backtest_port;
pub mod benchmark_port;
