//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod paper_broker;
pub mod trader;
pub mod dry_run_engine;
pub mod close_benchmark;
