//! mercato-okx
//!
//! Public connector implementing `CandleConnector` on top of the OKX
//! `/api/v5/market/candles` endpoint. The endpoint wraps rows in a
//! `{"code", "msg", "data"}` envelope and returns them newest first:
//!
//! ```text
//! ["ts", "o", "h", "l", "c", "vol", "volCcy", "volCcyQuote", "confirm"]
//! ```
//!
//! Rows carry no close time; it is derived as `ts + interval - 1ms`.
#![warn(missing_docs)]

/// Adapter definitions and the production HTTP adapter.
pub mod adapter;

use std::sync::Arc;

use adapter::{OkxCandles, RealAdapter};
use async_trait::async_trait;
use chrono::TimeDelta;
use mercato_core::connector::ConnectorKey;
use mercato_core::{Candle, CandleConnector, CandleRequest, Interval, MercatoError, wire};
use serde_json::Value;

/// Largest `limit` the endpoint accepts.
pub const MAX_LIMIT: usize = 300;

/// Public connector type. Production users will construct with `OkxConnector::new_default()`.
pub struct OkxConnector {
    candles: Arc<dyn OkxCandles>,
}

impl OkxConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("mercato-okx");

    /// Connector against the public endpoint.
    #[must_use]
    pub fn new_default() -> Self {
        Self::from_adapter(Arc::new(RealAdapter::new_default()))
    }

    /// Connector against another deployment, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::from_adapter(Arc::new(RealAdapter::new(reqwest::Client::new(), base_url)))
    }

    /// Connector over an arbitrary candles adapter.
    #[must_use]
    pub fn from_adapter(candles: Arc<dyn OkxCandles>) -> Self {
        Self { candles }
    }

    /// OKX bar token. Daily and weekly bars use the UTC-aligned variants.
    #[must_use]
    pub const fn bar(interval: Interval) -> &'static str {
        match interval {
            Interval::I1m => "1m",
            Interval::I3m => "3m",
            Interval::I5m => "5m",
            Interval::I15m => "15m",
            Interval::H1 => "1H",
            Interval::H4 => "4H",
            Interval::D1 => "1Dutc",
            Interval::W1 => "1Wutc",
        }
    }

    fn parse_row(row: &Value, req: &CandleRequest) -> Result<Candle, MercatoError> {
        let cells = wire::array(row, "candle row")?;
        let open_time = wire::millis(cells.first(), "ts")?;
        let close_time = open_time
            .checked_add_signed(TimeDelta::milliseconds(req.interval.millis() - 1))
            .ok_or_else(|| {
                MercatoError::Data(format!("ts {} out of range", open_time.timestamp_millis()))
            })?;
        Ok(Candle {
            symbol: req.symbol.clone(),
            interval: req.interval,
            open_time,
            close_time,
            open: wire::number(cells.get(1), "o")?,
            high: wire::number(cells.get(2), "h")?,
            low: wire::number(cells.get(3), "l")?,
            close: wire::number(cells.get(4), "c")?,
            volume: wire::number(cells.get(5), "vol")?,
        })
    }
}

#[async_trait]
impl CandleConnector for OkxConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "OKX"
    }

    /// `BTC` → `BTC-USDT`; symbols already naming a quote currency pass through.
    fn resolve_symbol(&self, symbol: &str) -> String {
        let s = symbol.trim().to_ascii_uppercase().replace('/', "-");
        if s.contains('-') {
            s
        } else {
            format!("{s}-USDT")
        }
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
        let limit = req.limit.clamp(1, MAX_LIMIT);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            inst_id = %req.provider_symbol,
            bar = Self::bar(req.interval),
            limit,
            "okx candles request"
        );
        let data = self
            .candles
            .candles(&req.provider_symbol, Self::bar(req.interval), limit)
            .await?;
        wire::array(&data, "candles")?
            .iter()
            .map(|row| Self::parse_row(row, req))
            .collect()
    }
}
