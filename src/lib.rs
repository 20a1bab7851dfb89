//! algotrader: strategy launcher for live trading and backtesting.
//!
//! Hexagonal architecture: orchestration logic in [`domain`], collaborator traits in
//! [`ports`], concrete implementations in [`adapters`], wiring in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
