//! CSV file data adapter.
//!
//! One file per symbol at `<base>/<SYMBOL>.csv`. Columns are read by position
//! (date, open, high, low, close, adjusted close, volume); the header row is
//! skipped whatever it is called and the adjusted close is ignored.

use crate::domain::asset::Asset;
use crate::domain::error::AlgotraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

const DATE_COLUMN: usize = 0;
const OPEN_COLUMN: usize = 1;
const HIGH_COLUMN: usize = 2;
const LOW_COLUMN: usize = 3;
const CLOSE_COLUMN: usize = 4;
const VOLUME_COLUMN: usize = 6;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn load_error(symbol: &str, reason: String) -> AlgotraderError {
    AlgotraderError::DataLoad {
        symbol: symbol.to_string(),
        reason,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_price(
    record: &StringRecord,
    column: usize,
    line: u64,
    symbol: &str,
) -> Result<f64, AlgotraderError> {
    let name = OhlcvBar::COLUMNS[column - 1];
    let raw = record
        .get(column)
        .ok_or_else(|| load_error(symbol, format!("line {line}: missing {name} column")))?;
    raw.trim()
        .parse()
        .map_err(|e| {
            load_error(symbol, format!("line {line}: invalid {name} value '{raw}': {e}"))
        })
}

fn parse_volume(record: &StringRecord, line: u64, symbol: &str) -> Result<i64, AlgotraderError> {
    let raw = record
        .get(VOLUME_COLUMN)
        .ok_or_else(|| load_error(symbol, format!("line {line}: missing volume column")))?
        .trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(load_error(
            symbol,
            format!("line {line}: invalid volume value '{raw}'"),
        )),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        asset: &Asset,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AlgotraderError> {
        let symbol = asset.symbol();
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| load_error(symbol, format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| load_error(symbol, format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let date_str = record
                .get(DATE_COLUMN)
                .ok_or_else(|| load_error(symbol, format!("line {line}: missing date column")))?;
            let date = parse_date(date_str).ok_or_else(|| {
                load_error(symbol, format!("line {line}: invalid date '{}'", date_str))
            })?;

            // Every row is validated, including those outside the range.
            let bar = OhlcvBar {
                date,
                open: parse_price(&record, OPEN_COLUMN, line, symbol)?,
                high: parse_price(&record, HIGH_COLUMN, line, symbol)?,
                low: parse_price(&record, LOW_COLUMN, line, symbol)?,
                close: parse_price(&record, CLOSE_COLUMN, line, symbol)?,
                volume: parse_volume(&record, line, symbol)?,
            };
            if date >= start_date && date <= end_date {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{HEADER}\
            2019-03-04,101.0,111.0,91.0,106.0,105.5,51000\n\
            2019-03-01,100.0,110.0,90.0,105.0,104.5,50000\n\
            2019-03-05,102.0,112.0,92.0,107.0,106.5,52000.0\n"
        );
        fs::write(path.join("SPY.csv"), csv_content).unwrap();

        (dir, path)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fetch_ohlcv_normalizes_and_sorts() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv(&Asset::stock("SPY"), d(2019, 1, 1), d(2019, 12, 31))
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, d(2019, 3, 1));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].volume, 52000);
    }

    #[test]
    fn fetch_ohlcv_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_ohlcv(&Asset::stock("SPY"), d(2019, 3, 4), d(2019, 3, 4))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 106.0);
    }

    #[test]
    fn fetch_ohlcv_accepts_datetime_dates() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("GLD.csv"),
            format!("{HEADER}2019-03-01 00:00:00,1,2,0.5,1.5,1.5,10\n"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter
            .fetch_ohlcv(&Asset::stock("GLD"), d(2019, 1, 1), d(2019, 12, 31))
            .unwrap();
        assert_eq!(bars[0].date, d(2019, 3, 1));
    }

    #[test]
    fn fetch_ohlcv_missing_file_is_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter
            .fetch_ohlcv(&Asset::stock("XYZ"), d(2019, 1, 1), d(2019, 12, 31))
            .unwrap_err();
        assert!(matches!(err, AlgotraderError::DataLoad { symbol, .. } if symbol == "XYZ"));
    }

    #[test]
    fn fetch_ohlcv_malformed_price_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("TLT.csv"),
            format!("{HEADER}2019-03-01,abc,2,0.5,1.5,1.5,10\n"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter
            .fetch_ohlcv(&Asset::stock("TLT"), d(2019, 1, 1), d(2019, 12, 31))
            .unwrap_err();
        assert!(err.to_string().contains("invalid open value"));
    }

    #[test]
    fn fetch_ohlcv_malformed_row_outside_range_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("SPY.csv"),
            format!(
                "{HEADER}\
                2018-06-01,abc,xyz,,??,1,notanumber\n\
                2019-03-01,1,2,0.5,1.5,1.5,10\n"
            ),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter
            .fetch_ohlcv(&Asset::stock("SPY"), d(2019, 1, 6), d(2019, 12, 15))
            .unwrap_err();
        assert!(matches!(err, AlgotraderError::DataLoad { ref symbol, .. } if symbol == "SPY"));
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("invalid open value"));
    }

    #[test]
    fn fetch_ohlcv_malformed_date_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("IEF.csv"),
            format!("{HEADER}03/01/2019,1,2,0.5,1.5,1.5,10\n"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter
            .fetch_ohlcv(&Asset::stock("IEF"), d(2019, 1, 1), d(2019, 12, 31))
            .unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn fetch_ohlcv_short_row_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("DJP.csv"),
            "Date,Open,High,Low,Close\n2019-03-01,1,2,0.5,1.5\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter
            .fetch_ohlcv(&Asset::stock("DJP"), d(2019, 1, 1), d(2019, 12, 31))
            .unwrap_err();
        assert!(err.to_string().contains("missing volume column"));
    }
}
