use std::collections::HashSet;

use crate::{Candle, CandleSeries, Interval};

/// Normalize raw provider bars into a series.
///
/// - Duplicate `open_time`s keep the first occurrence in provider order.
/// - Output is sorted ascending by `open_time` whatever the arrival order.
/// - Only the `limit` most recent bars are kept.
///
/// The function is pure: the same payload always yields the same series.
#[must_use]
pub fn normalize_series(
    symbol: &str,
    interval: Interval,
    raw: Vec<Candle>,
    limit: usize,
) -> CandleSeries {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut candles: Vec<Candle> = raw
        .into_iter()
        .filter(|c| seen.insert(c.open_time))
        .collect();
    candles.sort_by_key(|c| c.open_time);
    if candles.len() > limit {
        candles.drain(..candles.len() - limit);
    }
    CandleSeries {
        symbol: symbol.to_string(),
        interval,
        candles,
    }
}

/// True when `open_time` is strictly increasing across the series.
#[must_use]
pub fn is_strictly_increasing(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].open_time < w[1].open_time)
}
