use std::collections::BTreeSet;

use crate::{AnalysisConfig, ConfluenceZone, TechnicalLevel};

/// Cluster levels from every timeframe into zones of cross-timeframe agreement.
///
/// Levels are sorted by price and swept once. A level joins the open zone while its
/// distance to the zone's running strength-weighted centroid stays within
/// `confluence_tolerance_pct` of that centroid; otherwise it opens a new zone.
///
/// A zone's score is the sum of member strengths multiplied by the number of
/// distinct source intervals, so agreement across timeframes outranks repetition
/// within one. Zones backed by fewer than `min_zone_intervals` intervals are
/// dropped. Output is ordered by score, highest first, ties going to the zone
/// closest to `current_price`.
#[must_use]
pub fn detect_confluence(
    levels: &[TechnicalLevel],
    current_price: f64,
    cfg: &AnalysisConfig,
) -> Vec<ConfluenceZone> {
    let mut sorted: Vec<TechnicalLevel> = levels
        .iter()
        .filter(|l| l.price.is_finite())
        .cloned()
        .collect();
    sorted.sort_by(|a, b| {
        a.price
            .total_cmp(&b.price)
            .then_with(|| a.source_interval.cmp(&b.source_interval))
            .then_with(|| a.kind.cmp(&b.kind))
    });

    let tol = cfg.confluence_tolerance_pct / 100.0;
    let mut zones: Vec<ConfluenceZone> = Vec::new();
    let mut open: Option<ZoneAccumulator> = None;
    for level in sorted {
        let joins = open.as_ref().is_some_and(|acc| {
            let centroid = acc.centroid();
            (level.price - centroid).abs() <= centroid.abs() * tol
        });
        if joins {
            if let Some(acc) = open.as_mut() {
                acc.push(level);
            }
        } else if let Some(done) = open.replace(ZoneAccumulator::new(level)) {
            zones.push(done.finish());
        }
    }
    if let Some(done) = open {
        zones.push(done.finish());
    }

    zones.retain(|z| z.interval_count >= cfg.min_zone_intervals);
    zones.sort_by(|a, b| {
        b.strength_score.total_cmp(&a.strength_score).then_with(|| {
            (a.center_price - current_price)
                .abs()
                .total_cmp(&(b.center_price - current_price).abs())
        })
    });
    zones
}

struct ZoneAccumulator {
    members: Vec<TechnicalLevel>,
    weighted_sum: f64,
    weight: f64,
    plain_sum: f64,
}

impl ZoneAccumulator {
    fn new(first: TechnicalLevel) -> Self {
        let mut acc = Self {
            members: Vec::new(),
            weighted_sum: 0.0,
            weight: 0.0,
            plain_sum: 0.0,
        };
        acc.push(first);
        acc
    }

    fn push(&mut self, level: TechnicalLevel) {
        let w = level.strength.max(0.0);
        self.weighted_sum += level.price * w;
        self.weight += w;
        self.plain_sum += level.price;
        self.members.push(level);
    }

    // Falls back to the plain mean when every member has zero strength.
    fn centroid(&self) -> f64 {
        if self.weight > 0.0 {
            self.weighted_sum / self.weight
        } else {
            self.plain_sum / self.members.len() as f64
        }
    }

    fn finish(self) -> ConfluenceZone {
        let center_price = self.centroid();
        let price_low = self
            .members
            .iter()
            .map(|l| l.price)
            .fold(f64::INFINITY, f64::min);
        let price_high = self
            .members
            .iter()
            .map(|l| l.price)
            .fold(f64::NEG_INFINITY, f64::max);
        let interval_count = self
            .members
            .iter()
            .map(|l| l.source_interval)
            .collect::<BTreeSet<_>>()
            .len();
        let strength_sum: f64 = self.members.iter().map(|l| l.strength.max(0.0)).sum();
        ConfluenceZone {
            price_low,
            price_high,
            center_price,
            contributing_levels: self.members,
            interval_count,
            strength_score: strength_sum * interval_count as f64,
        }
    }
}
