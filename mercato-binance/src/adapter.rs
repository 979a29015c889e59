#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use mercato_core::MercatoError;
use serde_json::Value;

/// Public REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

const CONNECTOR: &str = "mercato-binance";

/// Klines abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait BinanceKlines: Send + Sync {
    /// Fetch the raw `/api/v3/klines` payload.
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Value, MercatoError>;
}

/// Real adapter issuing HTTP requests with a shared `reqwest::Client`.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl RealAdapter {
    /// Adapter against the public endpoint.
    #[must_use]
    pub fn new_default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_BASE_URL)
    }

    /// Wrap an existing client and base URL (no trailing slash needed).
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }
}

fn map_status(status: reqwest::StatusCode, body: &str, context: &str) -> MercatoError {
    // Binance reports unknown markets as 400 with code -1121.
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_i64));
    match (status.as_u16(), code) {
        (400, Some(-1121)) | (404, _) => MercatoError::not_found(context.to_string()),
        (418 | 429, _) => MercatoError::connector(CONNECTOR, format!("rate limit: {context}")),
        (s, _) if s >= 500 => {
            MercatoError::connector(CONNECTOR, format!("server error {s}: {context}"))
        }
        (s, _) => MercatoError::connector(CONNECTOR, format!("status {s}: {context}")),
    }
}

#[async_trait]
impl BinanceKlines for RealAdapter {
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Value, MercatoError> {
        let context = format!("klines for {symbol} {interval}");
        let limit = limit.to_string();
        let resp = self
            .http
            .get(format!("{}/api/v3/klines", self.base_url))
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MercatoError::connector(CONNECTOR, format!("{context}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MercatoError::connector(CONNECTOR, format!("{context}: {e}")))?;
        if !status.is_success() {
            return Err(map_status(status, &body, &context));
        }
        serde_json::from_str(&body).map_err(|e| MercatoError::Data(format!("{context}: {e}")))
    }
}

/* -------- Test-only lightweight adapter constructors ------- */

#[cfg(feature = "test-adapters")]
impl dyn BinanceKlines {
    /// Build a `BinanceKlines` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn BinanceKlines>
    where
        F: Send + Sync + 'static + Fn(String, String, usize) -> Result<Value, MercatoError>,
    {
        struct FnKlines<F>(F);
        #[async_trait]
        impl<F> BinanceKlines for FnKlines<F>
        where
            F: Send + Sync + 'static + Fn(String, String, usize) -> Result<Value, MercatoError>,
        {
            async fn klines(
                &self,
                symbol: &str,
                interval: &str,
                limit: usize,
            ) -> Result<Value, MercatoError> {
                (self.0)(symbol.to_string(), interval.to_string(), limit)
            }
        }
        Arc::new(FnKlines(f))
    }
}
