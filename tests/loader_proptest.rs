//! Property tests for dataset construction and stats file naming.

use algotrader::domain::asset::Asset;
use algotrader::domain::dataset::{DataHorizon, TimeSeriesDataset, Timestep};
use algotrader::domain::error::AlgotraderError;
use algotrader::domain::ohlcv::OhlcvBar;
use algotrader::domain::registry::StrategyKind;
use algotrader::domain::stats::StatsFileNamer;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

fn bar(offset: i64) -> OhlcvBar {
    let close = 10.0 + offset as f64;
    OhlcvBar {
        date: base() + Duration::days(offset),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: offset,
    }
}

proptest! {
    #[test]
    fn dataset_is_ascending_and_bounded(
        offsets in prop::collection::btree_set(0i64..400, 0..80),
        shuffle_seed in any::<u64>(),
        start_off in 0i64..400,
        span in 0i64..400,
    ) {
        let horizon = DataHorizon {
            date_start: base() + Duration::days(start_off),
            date_end: base() + Duration::days(start_off + span),
            timestep: Timestep::Day,
        };
        // Feed the bars in a scrambled but deterministic order.
        let mut bars: Vec<OhlcvBar> = offsets.iter().map(|&o| bar(o)).collect();
        if !bars.is_empty() {
            let len = bars.len();
            bars.rotate_left((shuffle_seed as usize) % len);
            if shuffle_seed % 2 == 0 {
                bars.reverse();
            }
        }
        let expected: Vec<NaiveDate> = offsets
            .iter()
            .map(|&o| base() + Duration::days(o))
            .filter(|d| *d >= horizon.date_start && *d <= horizon.date_end)
            .collect();

        match TimeSeriesDataset::new(Asset::stock("SPY"), bars, &horizon) {
            Ok(dataset) => {
                let dates: Vec<NaiveDate> = dataset.bars().iter().map(|b| b.date).collect();
                prop_assert_eq!(&dates, &expected);
                prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(dataset.bar_count(), expected.len());
            }
            Err(AlgotraderError::NoData { .. }) => prop_assert!(expected.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn window_matches_linear_filter(
        offsets in prop::collection::btree_set(0i64..200, 1..60),
        lo in 0i64..200,
        len in 0i64..200,
    ) {
        let horizon = DataHorizon {
            date_start: base(),
            date_end: base() + Duration::days(400),
            timestep: Timestep::Day,
        };
        let bars = offsets.iter().map(|&o| bar(o)).collect();
        let dataset = TimeSeriesDataset::new(Asset::stock("GLD"), bars, &horizon).unwrap();

        let start = base() + Duration::days(lo);
        let end = base() + Duration::days(lo + len);
        let expected: BTreeSet<i64> = offsets
            .iter()
            .copied()
            .filter(|&o| o >= lo && o <= lo + len)
            .collect();

        let window: Vec<i64> = dataset
            .window(start, end)
            .iter()
            .map(|b| b.volume)
            .collect();
        prop_assert_eq!(window, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn namer_never_repeats_a_path(
        stamps in prop::collection::vec(1_550_000_000i64..1_550_000_004, 1..40),
    ) {
        let mut namer = StatsFileNamer::new("logs");
        let mut seen = HashSet::new();
        for ts in stamps {
            let path = namer.next(StrategyKind::BuyAndHold, ts);
            prop_assert!(seen.insert(path));
        }
    }
}
