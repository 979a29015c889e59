//! mercato-binance
//!
//! Public connector implementing `CandleConnector` on top of the Binance spot
//! `/api/v3/klines` endpoint. Rows arrive oldest first as positional arrays with
//! prices encoded as strings:
//!
//! ```text
//! [openTime, "open", "high", "low", "close", "volume", closeTime, ...]
//! ```
#![warn(missing_docs)]

/// Adapter definitions and the production HTTP adapter.
pub mod adapter;
mod builder;

use std::sync::Arc;

use adapter::{BinanceKlines, RealAdapter};
use async_trait::async_trait;
use mercato_core::connector::ConnectorKey;
use mercato_core::{Candle, CandleConnector, CandleRequest, MercatoError, wire};
use serde_json::Value;

pub use builder::BinanceConnectorBuilder;

/// Largest `limit` the endpoint accepts.
pub const MAX_LIMIT: usize = 1_000;

const QUOTE_SUFFIXES: &[&str] = &["USDT", "USDC", "FDUSD", "BUSD"];

/// Public connector type. Production users will construct with `BinanceConnector::new_default()`.
pub struct BinanceConnector {
    klines: Arc<dyn BinanceKlines>,
}

impl BinanceConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("mercato-binance");

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

    /// Connector over an arbitrary klines adapter.
    #[must_use]
    pub fn from_adapter(klines: Arc<dyn BinanceKlines>) -> Self {
        Self { klines }
    }

    fn parse_row(row: &Value, req: &CandleRequest) -> Result<Candle, MercatoError> {
        let cells = wire::array(row, "kline row")?;
        if cells.len() < 7 {
            return Err(MercatoError::Data(format!(
                "kline row has {} fields, expected at least 7",
                cells.len()
            )));
        }
        Ok(Candle {
            symbol: req.symbol.clone(),
            interval: req.interval,
            open_time: wire::millis(cells.first(), "openTime")?,
            open: wire::number(cells.get(1), "open")?,
            high: wire::number(cells.get(2), "high")?,
            low: wire::number(cells.get(3), "low")?,
            close: wire::number(cells.get(4), "close")?,
            volume: wire::number(cells.get(5), "volume")?,
            close_time: wire::millis(cells.get(6), "closeTime")?,
        })
    }
}

#[async_trait]
impl CandleConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        Self::KEY.as_str()
    }

    fn vendor(&self) -> &'static str {
        "Binance"
    }

    /// `BTC` → `BTCUSDT`; symbols already carrying a stablecoin quote pass through.
    fn resolve_symbol(&self, symbol: &str) -> String {
        let s = symbol.trim().to_ascii_uppercase().replace(['-', '/'], "");
        if QUOTE_SUFFIXES.iter().any(|q| s.len() > q.len() && s.ends_with(q)) {
            s
        } else {
            format!("{s}USDT")
        }
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
        let limit = req.limit.clamp(1, MAX_LIMIT);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            symbol = %req.provider_symbol,
            interval = %req.interval,
            limit,
            "binance klines request"
        );
        let payload = self
            .klines
            .klines(&req.provider_symbol, req.interval.as_str(), limit)
            .await?;
        wire::array(&payload, "klines")?
            .iter()
            .map(|row| Self::parse_row(row, req))
            .collect()
    }
}
