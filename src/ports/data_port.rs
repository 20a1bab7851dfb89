//! Historical data access port trait.

use crate::domain::asset::Asset;
use crate::domain::error::AlgotraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `asset` dated within `[start_date, end_date]`, ascending.
    fn fetch_ohlcv(
        &self,
        asset: &Asset,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AlgotraderError>;
}
