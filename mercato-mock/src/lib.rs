//! Mock candle connectors for CI-safe tests and demos.
//!
//! [`MockConnector`] serves deterministic synthetic bars for a small fixed set of
//! tickers. [`DynamicMockConnector`] defers every call to rules set from the
//! outside through a [`DynamicMockController`].

use std::f64::consts::TAU;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use mercato_core::{Candle, CandleConnector, CandleRequest, Interval, MercatoError};

mod dynamic;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Fixed "now" of the synthetic market: 2024-06-01T00:00:00Z.
pub const ANCHOR_MS: i64 = 1_717_200_000_000;

/// Reference price of the fixture tickers.
#[must_use]
pub fn base_price(symbol: &str) -> Option<f64> {
    match symbol {
        "BTC" => Some(60_000.0),
        "ETH" => Some(3_000.0),
        "SOL" => Some(150.0),
        "DOGE" => Some(0.15),
        _ => None,
    }
}

fn wave(base: f64, n: i64) -> f64 {
    let x = n as f64;
    base * (1.0 + 0.02 * (x * TAU / 24.0).sin() + 0.005 * (x * TAU / 7.0).sin())
}

/// The `limit` most recent synthetic bars for `symbol` ending at [`ANCHOR_MS`].
///
/// Prices depend only on the absolute bar index, so overlapping requests with
/// different limits agree bar for bar. Every interval oscillates around `base` with
/// the same amplitude, which places swing levels of all timeframes near each other.
#[must_use]
pub fn synthetic_candles(symbol: &str, base: f64, interval: Interval, limit: usize) -> Vec<Candle> {
    let ms = interval.millis();
    let last = ANCHOR_MS / ms - 1;
    let count = i64::try_from(limit).unwrap_or(i64::MAX).min(last + 1);
    (last - count + 1..=last)
        .filter_map(|n| {
            let open_time = DateTime::from_timestamp_millis(n * ms)?;
            let close_time = DateTime::from_timestamp_millis(n * ms + ms - 1)?;
            let open = wave(base, n - 1);
            let close = wave(base, n);
            // Neighbouring bodies share an endpoint; uneven wicks keep extremes unique.
            let wick = 0.001 + 0.0002 * (n.rem_euclid(5) as f64);
            Some(Candle {
                symbol: symbol.to_string(),
                interval,
                open_time,
                close_time,
                open,
                high: open.max(close) * (1.0 + wick),
                low: open.min(close) * (1.0 - wick),
                close,
                volume: 100.0 + (n % 17) as f64,
            })
        })
        .collect()
}

/// Mock connector for CI-safe examples. Serves deterministic synthetic bars.
///
/// Special tickers: `FAIL` always returns a connector error, `TIMEOUT` sleeps for
/// 200 ms before answering, `EMPTY` returns a well-formed empty payload. Anything
/// outside the fixture table is `NotFound`.
pub struct MockConnector {
    name: &'static str,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// A deterministic mock registered under the name `mercato-mock`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: "mercato-mock",
        }
    }

    /// A mock reporting a different connector name, for multi-provider setups.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl CandleConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn resolve_symbol(&self, symbol: &str) -> String {
        symbol.trim().to_ascii_uppercase()
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
        match req.provider_symbol.as_str() {
            "FAIL" => Err(MercatoError::connector(
                self.name,
                format!("forced failure: candles/{}", req.interval),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(synthetic_candles(&req.symbol, 100.0, req.interval, req.limit))
            }
            "EMPTY" => Ok(Vec::new()),
            other => base_price(other)
                .map(|base| synthetic_candles(&req.symbol, base, req.interval, req.limit))
                .ok_or_else(|| MercatoError::not_found(format!("candles for {other}"))),
        }
    }
}
