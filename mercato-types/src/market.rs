//! Candle-level market data: intervals, bars, series and multi-timeframe snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MercatoError;

/// Bar duration. A closed set: confluence alignment depends on exactly these values.
///
/// Variants are declared shortest first, so the derived `Ord` sorts by duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// One minute.
    #[serde(rename = "1m")]
    I1m,
    /// Three minutes.
    #[serde(rename = "3m")]
    I3m,
    /// Five minutes.
    #[serde(rename = "5m")]
    I5m,
    /// Fifteen minutes.
    #[serde(rename = "15m")]
    I15m,
    /// One hour.
    #[serde(rename = "1h")]
    H1,
    /// Four hours.
    #[serde(rename = "4h")]
    H4,
    /// One day.
    #[serde(rename = "1d")]
    D1,
    /// One week.
    #[serde(rename = "1w")]
    W1,
}

impl Interval {
    /// Every supported interval, shortest first.
    pub const ALL: &'static [Self] = &[
        Self::I1m,
        Self::I3m,
        Self::I5m,
        Self::I15m,
        Self::H1,
        Self::H4,
        Self::D1,
        Self::W1,
    ];

    /// Intervals fetched by a default multi-timeframe snapshot.
    pub const SNAPSHOT_DEFAULT: &'static [Self] = &[
        Self::I1m,
        Self::I5m,
        Self::I15m,
        Self::H1,
        Self::H4,
        Self::D1,
        Self::W1,
    ];

    /// Canonical token, e.g. `"15m"` or `"1w"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I1m => "1m",
            Self::I3m => "3m",
            Self::I5m => "5m",
            Self::I15m => "15m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }

    /// Bar duration in minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        match self {
            Self::I1m => 1,
            Self::I3m => 3,
            Self::I5m => 5,
            Self::I15m => 15,
            Self::H1 => 60,
            Self::H4 => 240,
            Self::D1 => 1_440,
            Self::W1 => 10_080,
        }
    }

    /// Bar duration in milliseconds.
    #[must_use]
    pub const fn millis(self) -> i64 {
        self.minutes() * 60_000
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = MercatoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|iv| iv.as_str() == s.trim())
            .ok_or_else(|| MercatoError::invalid_interval(s))
    }
}

/// One OHLCV bar. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Generic asset ticker, e.g. `"BTC"`.
    pub symbol: String,
    /// Bar duration.
    pub interval: Interval,
    /// Bar open instant.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub open_time: DateTime<Utc>,
    /// Bar close instant.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub close_time: DateTime<Utc>,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded base volume.
    pub volume: f64,
}

/// Ordered bars for one `(symbol, interval)` pair, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSeries {
    /// Generic asset ticker.
    pub symbol: String,
    /// Bar duration shared by every candle.
    pub interval: Interval,
    /// Bars with strictly increasing `open_time`.
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// Close of the most recent bar, if any.
    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// Close prices in series order.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// True when the series holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Multi-timeframe view of one symbol produced by a single orchestration call.
///
/// A `None` entry in `timeframes` marks an interval whose fetch failed or was
/// cancelled; it is never replaced by an empty series. The matching entry in
/// `failures` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Generic asset ticker.
    pub symbol: String,
    /// Close of the most recent bar of the shortest populated interval.
    pub current_price: f64,
    /// Per-interval series; `None` is the explicit absence marker.
    pub timeframes: BTreeMap<Interval, Option<CandleSeries>>,
    /// Why each absent interval is absent.
    pub failures: BTreeMap<Interval, MercatoError>,
}

impl Snapshot {
    /// Series for `interval` when it was fetched successfully.
    #[must_use]
    pub fn series(&self, interval: Interval) -> Option<&CandleSeries> {
        self.timeframes.get(&interval).and_then(Option::as_ref)
    }

    /// Iterate over the populated intervals, shortest first.
    pub fn populated(&self) -> impl Iterator<Item = (Interval, &CandleSeries)> {
        self.timeframes
            .iter()
            .filter_map(|(iv, s)| s.as_ref().map(|s| (*iv, s)))
    }

    /// Intervals that carry the absence marker.
    #[must_use]
    pub fn absent(&self) -> Vec<Interval> {
        self.timeframes
            .iter()
            .filter(|(_, s)| s.is_none())
            .map(|(iv, _)| *iv)
            .collect()
    }
}
