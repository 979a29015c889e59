#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use mercato_core::MercatoError;
use serde_json::Value;

/// Public REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";

const CONNECTOR: &str = "mercato-okx";

/// Candles abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait OkxCandles: Send + Sync {
    /// Fetch the `data` array of `/api/v5/market/candles`, envelope already checked.
    async fn candles(&self, inst_id: &str, bar: &str, limit: usize) -> Result<Value, MercatoError>;
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

/// Unwrap the `{"code": "0", "msg": "", "data": [...]}` envelope.
///
/// # Errors
/// `51001` (unknown instrument) maps to `NotFound`; any other non-zero code to
/// `Connector`; a missing `data` field to `Data`.
pub fn unwrap_envelope(mut body: Value, context: &str) -> Result<Value, MercatoError> {
    let code = match body.get("code") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(MercatoError::Data(format!("{context}: missing code"))),
    };
    if code != "0" {
        let msg = body.get("msg").and_then(Value::as_str).unwrap_or_default();
        return Err(if code == "51001" {
            MercatoError::not_found(context.to_string())
        } else {
            MercatoError::connector(CONNECTOR, format!("code {code} {msg}: {context}"))
        });
    }
    body.get_mut("data")
        .map(Value::take)
        .ok_or_else(|| MercatoError::Data(format!("{context}: missing data")))
}

fn map_status(status: reqwest::StatusCode, context: &str) -> MercatoError {
    match status.as_u16() {
        404 => MercatoError::not_found(context.to_string()),
        429 => MercatoError::connector(CONNECTOR, format!("rate limit: {context}")),
        s if s >= 500 => MercatoError::connector(CONNECTOR, format!("server error {s}: {context}")),
        s => MercatoError::connector(CONNECTOR, format!("status {s}: {context}")),
    }
}

#[async_trait]
impl OkxCandles for RealAdapter {
    async fn candles(&self, inst_id: &str, bar: &str, limit: usize) -> Result<Value, MercatoError> {
        let context = format!("candles for {inst_id} {bar}");
        let limit = limit.to_string();
        let resp = self
            .http
            .get(format!("{}/api/v5/market/candles", self.base_url))
            .query(&[("instId", inst_id), ("bar", bar), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| MercatoError::connector(CONNECTOR, format!("{context}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MercatoError::connector(CONNECTOR, format!("{context}: {e}")))?;
        // OKX reports business errors in the envelope, sometimes with a 4xx status.
        match serde_json::from_str::<Value>(&body) {
            Ok(v) if v.get("code").is_some() => unwrap_envelope(v, &context),
            _ if !status.is_success() => Err(map_status(status, &context)),
            Ok(_) => Err(MercatoError::Data(format!("{context}: missing code"))),
            Err(e) => Err(MercatoError::Data(format!("{context}: {e}"))),
        }
    }
}

/* -------- Test-only lightweight adapter constructors ------- */

#[cfg(feature = "test-adapters")]
impl dyn OkxCandles {
    /// Build an `OkxCandles` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn OkxCandles>
    where
        F: Send + Sync + 'static + Fn(String, String, usize) -> Result<Value, MercatoError>,
    {
        struct FnCandles<F>(F);
        #[async_trait]
        impl<F> OkxCandles for FnCandles<F>
        where
            F: Send + Sync + 'static + Fn(String, String, usize) -> Result<Value, MercatoError>,
        {
            async fn candles(
                &self,
                inst_id: &str,
                bar: &str,
                limit: usize,
            ) -> Result<Value, MercatoError> {
                (self.0)(inst_id.to_string(), bar.to_string(), limit)
            }
        }
        Arc::new(FnCandles(f))
    }
}
