use async_trait::async_trait;

use crate::{Candle, Interval, MercatoError};
pub use mercato_types::ConnectorKey;

/// One candle query as seen by a connector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandleRequest {
    /// Generic ticker the caller asked for, e.g. `"BTC"`. Stamped onto produced candles.
    pub symbol: String,
    /// Provider-specific token produced by [`CandleConnector::resolve_symbol`], e.g. `"BTCUSDT"`.
    pub provider_symbol: String,
    /// Bar duration.
    pub interval: Interval,
    /// Maximum number of most-recent bars wanted.
    pub limit: usize,
}

/// A market-data provider able to serve OHLCV bars.
///
/// Implementations only translate: they map the generic request onto the provider's
/// wire format and the provider's payload onto [`Candle`] values. Ordering,
/// de-duplication and truncation happen once, at the fetcher boundary, so connectors
/// may return bars unordered or with duplicates.
#[async_trait]
pub trait CandleConnector: Send + Sync {
    /// Stable connector name used for priorities and health tracking.
    fn name(&self) -> &'static str;

    /// Human-readable vendor name.
    fn vendor(&self) -> &'static str;

    /// Typed key for this connector.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Map a generic ticker (`"BTC"`) to the provider's market token.
    fn resolve_symbol(&self, symbol: &str) -> String;

    /// Intervals this connector can serve natively.
    fn supported_intervals(&self) -> &'static [Interval] {
        Interval::ALL
    }

    /// True when `interval` is served natively.
    fn supports_interval(&self, interval: Interval) -> bool {
        self.supported_intervals().contains(&interval)
    }

    /// Fetch raw bars for the request.
    ///
    /// # Errors
    /// Transport failures and non-success statuses map to `Connector`, undecodable
    /// payloads to `Data`, unknown markets to `NotFound`.
    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError>;
}
