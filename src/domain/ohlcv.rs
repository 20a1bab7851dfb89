//! OHLCV bar representation.

use chrono::NaiveDate;

/// One dated record of a series. The date is the index; the five price/volume
/// fields are the canonical schema every source is normalized into.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// Canonical field names, in order.
    pub const COLUMNS: [&'static str; 5] = ["open", "high", "low", "close", "volume"];

    /// Simple return from `prev_close` to this bar's close.
    pub fn return_since(&self, prev_close: f64) -> f64 {
        if prev_close == 0.0 {
            0.0
        } else {
            self.close / prev_close - 1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn return_since_previous_close() {
        let bar = sample_bar();
        assert!((bar.return_since(100.0) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn return_since_zero_close_is_zero() {
        assert_eq!(sample_bar().return_since(0.0), 0.0);
    }

    #[test]
    fn canonical_columns() {
        assert_eq!(OhlcvBar::COLUMNS.len(), 5);
        assert_eq!(OhlcvBar::COLUMNS[3], "close");
    }
}
