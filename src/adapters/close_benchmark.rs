//! Benchmark returns computed from closes in the dataset pool.

use crate::domain::dataset::DatasetPool;
use crate::domain::error::AlgotraderError;
use crate::ports::benchmark_port::BenchmarkPort;
use chrono::NaiveDate;

pub struct CloseBenchmark<'a> {
    pool: &'a DatasetPool,
}

impl<'a> CloseBenchmark<'a> {
    pub fn new(pool: &'a DatasetPool) -> Self {
        Self { pool }
    }
}

impl BenchmarkPort for CloseBenchmark<'_> {
    fn calculate_returns(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, AlgotraderError> {
        let no_data = || AlgotraderError::NoData {
            symbol: symbol.to_string(),
            start,
            end,
        };
        let dataset = self.pool.get_symbol(symbol).ok_or_else(no_data)?;
        let bars = dataset.window(start, end);
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(last.return_since(first.close)),
            _ => Err(no_data()),
        }
    }
}
