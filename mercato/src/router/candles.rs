use std::sync::Arc;

use mercato_core::{
    CandleConnector, CandleRequest, CandleSeries, HealthRegistry, Interval, MercatoError,
    normalize_series,
};

use crate::Mercato;
use crate::core::tag_err;

const CAPABILITY: &str = "candles";

/// Hands a half-open trial back to the registry when the attempt ends without an
/// outcome (cancelled, or a non-fault error). A no-op once an outcome was recorded.
struct TrialGuard<'a> {
    health: &'a HealthRegistry,
    provider: &'static str,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        self.health.release_trial(self.provider);
    }
}

impl Mercato {
    /// Fetch a normalized candle series for one `(symbol, interval)` pair.
    ///
    /// Providers are tried in priority order, skipping those the health registry
    /// currently excludes, with at most `1 + max_failover_hops` attempts. Every
    /// attempt is bounded by the provider timeout. Successes and provider faults
    /// update the registry; caller errors, `NotFound` and `Unsupported` move on to
    /// the next candidate without counting against the provider.
    ///
    /// The result is ordered by open time, free of duplicate bars (first occurrence
    /// wins) and holds at most `limit` most-recent bars. `None` uses the configured
    /// default limit; larger values are clamped to the configured maximum. An empty
    /// provider payload is a success and yields an empty series.
    ///
    /// # Errors
    /// - `InvalidArg` for an empty symbol or a zero limit.
    /// - `Unsupported` when no registered connector serves `interval`.
    /// - `AllProvidersUnavailable` when every candidate is excluded before any attempt.
    /// - `NoDataAvailable` carrying one error per failed attempt otherwise.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::candles",
            skip(self),
            fields(symbol = %symbol, interval = %interval),
        )
    )]
    pub async fn candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<CandleSeries, MercatoError> {
        let symbol = Self::normalize_symbol(symbol)?;
        let limit = self.resolve_limit(limit)?;
        self.fetch_series(&symbol, interval, limit).await
    }

    /// Like [`candles`](Self::candles), with the interval given as a wire token
    /// such as `"15m"` or `"1w"`.
    ///
    /// # Errors
    /// `InvalidInterval` for any token outside the fixed interval set, before any
    /// provider is contacted; otherwise as [`candles`](Self::candles).
    pub async fn candles_str(
        &self,
        symbol: &str,
        interval: &str,
        limit: Option<usize>,
    ) -> Result<CandleSeries, MercatoError> {
        let interval: Interval = interval.parse()?;
        self.candles(symbol, interval, limit).await
    }

    /// Failover loop over an already validated symbol and limit.
    pub(crate) async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, MercatoError> {
        let ordered = self.ordered(symbol, interval);
        if ordered.is_empty() {
            return Err(MercatoError::unsupported(format!("{CAPABILITY}/{interval}")));
        }
        let mut remaining: Vec<&'static str> = ordered.iter().map(|c| c.name()).collect();
        let max_attempts = self.cfg.max_failover_hops.saturating_add(1);
        let mut errors: Vec<MercatoError> = Vec::new();

        while errors.len() < max_attempts && !remaining.is_empty() {
            let (name, trial) = match self.health.select(&remaining) {
                Ok(sel) => (sel.provider, sel.trial),
                Err(e) if errors.is_empty() => return Err(e),
                Err(_) => break,
            };
            let _trial = trial.then(|| TrialGuard {
                health: &self.health,
                provider: name,
            });
            // Candidates ahead of the selected one were excluded by the registry.
            let Some(pos) = remaining.iter().position(|n| *n == name) else {
                break;
            };
            remaining.drain(..=pos);
            let Some(connector) = ordered.iter().find(|c| c.name() == name) else {
                continue;
            };

            match self.attempt(connector, symbol, interval, limit).await {
                Ok(series) => return Ok(series),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        connector = name,
                        symbol = symbol,
                        interval = %interval,
                        error = %e,
                        remaining = remaining.len(),
                        "candle fetch failed; failing over"
                    );
                    errors.push(tag_err(name, e));
                }
            }
        }

        Err(MercatoError::NoDataAvailable {
            symbol: symbol.to_string(),
            interval,
            errors,
        })
    }

    async fn attempt(
        &self,
        connector: &Arc<dyn CandleConnector>,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, MercatoError> {
        let name = connector.name();
        let req = CandleRequest {
            symbol: symbol.to_string(),
            provider_symbol: connector.resolve_symbol(symbol),
            interval,
            limit,
        };
        let res = Self::provider_call_with_timeout(
            name,
            CAPABILITY,
            self.cfg.provider_timeout,
            connector.fetch_candles(&req),
        )
        .await;
        // Only reached once the provider call finished or timed out; a dropped
        // (cancelled) request records nothing.
        match res {
            Ok(raw) => {
                self.health.record_success(name);
                Ok(normalize_series(symbol, interval, raw, limit))
            }
            Err(e) => {
                if e.is_provider_fault() {
                    self.health.record_error(name);
                }
                Err(e)
            }
        }
    }
}
