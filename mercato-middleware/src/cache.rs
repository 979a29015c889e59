use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mercato_core::{Candle, CandleConnector, CandleRequest, Interval, MercatoError, Middleware};
use mercato_types::CacheConfig;
use moka::future::Cache;

/// Request fingerprint: what the provider is actually asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CandleKey {
    provider_symbol: String,
    interval: Interval,
    limit: usize,
}

impl From<&CandleRequest> for CandleKey {
    fn from(req: &CandleRequest) -> Self {
        Self {
            provider_symbol: req.provider_symbol.clone(),
            interval: req.interval,
            limit: req.limit,
        }
    }
}

/// A cached provider payload and the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CachedCandles {
    /// When the inner connector returned this payload.
    pub fetched_at: DateTime<Utc>,
    /// The raw payload, shared between hits.
    pub candles: Arc<Vec<Candle>>,
}

/// Declarative wrapper that applies caching when building a connector stack.
pub struct CacheMiddleware {
    cfg: CacheConfig,
}

impl CacheMiddleware {
    /// Middleware that wraps connectors with a cache built from `cfg`.
    #[must_use]
    pub const fn new(cfg: CacheConfig) -> Self {
        Self { cfg }
    }
}

impl Middleware for CacheMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn CandleConnector>) -> Arc<dyn CandleConnector> {
        let Self { cfg } = *self;
        Arc::new(CachingConnector::new(inner, &cfg))
    }

    fn name(&self) -> &'static str {
        "CachingMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ttl_ms": self.cfg.ttl_ms,
            "max_entries": self.cfg.max_entries,
        })
    }
}

/// Connector wrapper serving repeated candle queries from a fixed-TTL cache.
///
/// Only successful payloads are stored; errors always reach the caller and are
/// retried on the next call. A TTL of zero disables the store entirely.
pub struct CachingConnector {
    inner: Arc<dyn CandleConnector>,
    store: Option<Cache<CandleKey, CachedCandles>>,
}

impl CachingConnector {
    /// Wrap `inner` with its own cache; a zero `ttl_ms` disables caching.
    #[must_use]
    pub fn new(inner: Arc<dyn CandleConnector>, cfg: &CacheConfig) -> Self {
        let store = (cfg.ttl_ms > 0).then(|| {
            Cache::builder()
                .max_capacity(cfg.max_entries.max(1))
                .time_to_live(Duration::from_millis(cfg.ttl_ms))
                .build()
        });
        Self { inner, store }
    }

    /// The live cache entry for `req`, if any.
    pub async fn cached(&self, req: &CandleRequest) -> Option<CachedCandles> {
        self.store.as_ref()?.get(&CandleKey::from(req)).await
    }
}

// Entries are keyed by provider symbol, so a hit may have been filled under a
// different generic ticker.
fn stamped(candles: &[Candle], symbol: &str) -> Vec<Candle> {
    candles
        .iter()
        .map(|c| {
            let mut c = c.clone();
            if c.symbol != symbol {
                c.symbol = symbol.to_string();
            }
            c
        })
        .collect()
}

#[async_trait]
impl CandleConnector for CachingConnector {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    fn resolve_symbol(&self, symbol: &str) -> String {
        self.inner.resolve_symbol(symbol)
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        self.inner.supported_intervals()
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
        let Some(store) = &self.store else {
            return self.inner.fetch_candles(req).await;
        };
        let key = CandleKey::from(req);
        if let Some(hit) = store.get(&key).await {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                connector = self.inner.name(),
                symbol = %req.provider_symbol,
                interval = %req.interval,
                fetched_at = %hit.fetched_at,
                "candle cache hit"
            );
            return Ok(stamped(&hit.candles, &req.symbol));
        }
        let candles = self.inner.fetch_candles(req).await?;
        store
            .insert(
                key,
                CachedCandles {
                    fetched_at: Utc::now(),
                    candles: Arc::new(candles.clone()),
                },
            )
            .await;
        Ok(candles)
    }
}
