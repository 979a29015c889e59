use crate::{CandleSeries, EmaSeries};

/// Exponential moving average of `closes`, index-aligned with the input.
///
/// Seeded with the simple mean of the first `period` closes (placed at index
/// `period - 1`), then `ema = α·close + (1 − α)·prev` with `α = 2 / (period + 1)`.
/// The first `period - 1` positions are `None`. A series shorter than `period`,
/// or `period == 0`, is entirely `None`.
#[must_use]
pub fn ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = closes[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);
    let mut prev = seed;
    for (slot, &close) in out.iter_mut().zip(closes).skip(period) {
        prev = alpha.mul_add(close - prev, prev);
        *slot = Some(prev);
    }
    out
}

/// One [`EmaSeries`] per period over the series' closes, in `periods` order.
#[must_use]
pub fn ema_series(series: &CandleSeries, periods: &[usize]) -> Vec<EmaSeries> {
    let closes = series.closes();
    periods
        .iter()
        .map(|&period| EmaSeries {
            period,
            values: ema(&closes, period),
        })
        .collect()
}
