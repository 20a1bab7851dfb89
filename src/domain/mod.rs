//! Core domain types and orchestration logic.

pub mod asset;
pub mod ohlcv;
pub mod dataset;
pub mod registry;
pub mod run;
pub mod stats;
pub mod dispatch;
pub mod error;
