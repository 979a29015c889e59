//! Multi-timeframe technical analysis.
//!
//! Everything here is pure: each function reads a series or level set and returns a
//! fresh value, with no shared mutable state between timeframes or periods.

mod confluence;
mod ema;
mod levels;

use std::collections::BTreeMap;

pub use confluence::detect_confluence;
pub use ema::{ema, ema_series};
pub use levels::detect_levels;

use crate::{AnalysisConfig, AnalysisReport, Snapshot};

/// Run level detection and EMA computation on every populated timeframe of
/// `snapshot`, then cluster all levels into confluence zones around its current price.
///
/// Absent timeframes contribute nothing and get no entry in the report maps.
#[must_use]
pub fn analyze_snapshot(snapshot: Snapshot, cfg: &AnalysisConfig) -> AnalysisReport {
    let mut levels = BTreeMap::new();
    let mut emas = BTreeMap::new();
    for (interval, series) in snapshot.populated() {
        levels.insert(interval, detect_levels(series, cfg));
        emas.insert(interval, ema_series(series, &cfg.ema_periods));
    }
    let all: Vec<_> = levels.values().flatten().cloned().collect();
    let zones = detect_confluence(&all, snapshot.current_price, cfg);
    AnalysisReport {
        snapshot,
        levels,
        zones,
        emas,
    }
}
