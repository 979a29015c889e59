use crate::{AnalysisConfig, CandleSeries, Interval, LevelKind, TechnicalLevel};

/// Detect support and resistance levels on one timeframe.
///
/// A bar is a swing high when its high is the strict maximum of the
/// `2 * swing_window + 1` bars centred on it; swing lows mirror this on lows.
/// Every swing high yields a resistance level and every swing low a support level.
/// A level's `touch_count` is the number of other same-direction swings within
/// `touch_tolerance_pct` of its price, and its strength is `1 + touch_count`.
///
/// Series shorter than `2 * swing_window + 1` bars have no levels. The result is
/// ordered by distance to the series' last close, nearest first.
#[must_use]
pub fn detect_levels(series: &CandleSeries, cfg: &AnalysisConfig) -> Vec<TechnicalLevel> {
    let w = cfg.swing_window;
    let n = series.candles.len();
    if w == 0 || n < 2 * w + 1 {
        return Vec::new();
    }

    let highs: Vec<f64> = series.candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = series.candles.iter().map(|c| c.low).collect();
    let swing_highs = swing_points(&highs, w, |v, other| v > other);
    let swing_lows = swing_points(&lows, w, |v, other| v < other);

    let tol = cfg.touch_tolerance_pct;
    let mut out: Vec<TechnicalLevel> = Vec::with_capacity(swing_highs.len() + swing_lows.len());
    out.extend(levels_from(&swing_highs, LevelKind::Resistance, series.interval, tol));
    out.extend(levels_from(&swing_lows, LevelKind::Support, series.interval, tol));

    if let Some(last) = series.last_close() {
        out.sort_by(|a, b| {
            (a.price - last)
                .abs()
                .total_cmp(&(b.price - last).abs())
                .then_with(|| a.price.total_cmp(&b.price))
                .then_with(|| a.kind.cmp(&b.kind))
        });
    }
    out
}

fn swing_points(values: &[f64], w: usize, dominates: impl Fn(f64, f64) -> bool) -> Vec<f64> {
    (w..values.len() - w)
        .filter(|&i| {
            let v = values[i];
            (i - w..=i + w).all(|j| j == i || dominates(v, values[j]))
        })
        .map(|i| values[i])
        .collect()
}

fn levels_from(
    prices: &[f64],
    kind: LevelKind,
    interval: Interval,
    tolerance_pct: f64,
) -> impl Iterator<Item = TechnicalLevel> + '_ {
    prices.iter().enumerate().map(move |(i, &p)| {
        let band = p.abs() * tolerance_pct / 100.0;
        let touches = prices
            .iter()
            .enumerate()
            .filter(|&(j, &q)| j != i && (q - p).abs() <= band)
            .count();
        let touch_count = u32::try_from(touches).unwrap_or(u32::MAX);
        TechnicalLevel {
            price: p,
            kind,
            source_interval: interval,
            strength: 1.0 + f64::from(touch_count),
            touch_count,
        }
    })
}
