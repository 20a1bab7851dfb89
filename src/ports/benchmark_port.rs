//! Benchmark return port trait.

use crate::domain::error::AlgotraderError;
use chrono::NaiveDate;

pub trait BenchmarkPort {
    /// Return of `symbol` over `[start, end]`, as a fraction.
    fn calculate_returns(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, AlgotraderError>;
}
