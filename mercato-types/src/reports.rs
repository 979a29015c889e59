//! Report envelopes produced by the orchestrator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{ConfluenceZone, EmaSeries, TechnicalLevel};
use crate::market::{Interval, Snapshot};

/// Output of one full analysis pass over a multi-timeframe snapshot.
///
/// Only populated intervals appear in `levels` and `emas`; an absent interval in
/// the snapshot has no entry here either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The snapshot the artifacts were derived from.
    pub snapshot: Snapshot,
    /// Support/resistance per timeframe, nearest to the series' last close first.
    pub levels: BTreeMap<Interval, Vec<TechnicalLevel>>,
    /// Cross-timeframe zones, strongest first.
    pub zones: Vec<ConfluenceZone>,
    /// One EMA series per configured period, per timeframe.
    pub emas: BTreeMap<Interval, Vec<EmaSeries>>,
}

impl AnalysisReport {
    /// All levels across timeframes, in timeframe order.
    #[must_use]
    pub fn all_levels(&self) -> Vec<TechnicalLevel> {
        self.levels.values().flatten().cloned().collect()
    }
}
