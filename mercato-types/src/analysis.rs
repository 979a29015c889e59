//! Derived technical-analysis artifacts.

use serde::{Deserialize, Serialize};

use crate::market::Interval;

/// Which side of price a level acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    /// Derived from a swing low.
    Support,
    /// Derived from a swing high.
    Resistance,
}

/// A support or resistance price detected on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalLevel {
    /// Level price.
    pub price: f64,
    /// Support or resistance.
    pub kind: LevelKind,
    /// Timeframe the swing was found on.
    pub source_interval: Interval,
    /// `1 + touch_count`; never negative.
    pub strength: f64,
    /// Other same-direction swings within the touch tolerance of this price.
    pub touch_count: u32,
}

/// A price band where levels from several timeframes agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceZone {
    /// Lowest member price.
    pub price_low: f64,
    /// Highest member price.
    pub price_high: f64,
    /// Strength-weighted centroid of member prices.
    pub center_price: f64,
    /// Members ordered by price.
    pub contributing_levels: Vec<TechnicalLevel>,
    /// Distinct source intervals among members.
    pub interval_count: usize,
    /// Sum of member strengths scaled by `interval_count`.
    pub strength_score: f64,
}

/// Exponential moving average aligned index-for-index with a candle series.
///
/// Positions without enough history are `None` (serialized as `null`), never `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmaSeries {
    /// Lookback period.
    pub period: usize,
    /// One entry per input close.
    pub values: Vec<Option<f64>>,
}

impl EmaSeries {
    /// Most recent defined value.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}
