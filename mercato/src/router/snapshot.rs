use std::collections::BTreeMap;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use mercato_core::{CandleSeries, Interval, MercatoError, Snapshot};

use crate::Mercato;

/// Per-call options for [`Mercato::snapshot`] and [`Mercato::analyze`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotRequest {
    /// Bars requested per interval; `None` uses the configured default.
    pub limit: Option<usize>,
    /// Deadline for the whole snapshot; `None` falls back to the configured
    /// request timeout, and to no deadline when that is unset too.
    pub timeout: Option<Duration>,
}

impl SnapshotRequest {
    /// Request `limit` bars per interval.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Bound the whole snapshot by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Mercato {
    /// Fetch every configured snapshot interval for `symbol` concurrently.
    ///
    /// Each interval goes through the same failover path as [`candles`](Self::candles)
    /// and succeeds or fails on its own. A failed interval keeps a `None` entry in
    /// `timeframes` with the reason in `failures`. When the deadline fires, pending
    /// intervals are cancelled without touching provider health and reported with a
    /// `RequestTimeout` failure.
    ///
    /// `current_price` is the last close of the shortest populated interval that
    /// holds at least one bar.
    ///
    /// # Errors
    /// - `InvalidArg` for an empty symbol or a zero limit.
    /// - `SnapshotUnavailable` when no interval produced a bar.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::snapshot",
            skip(self, req),
            fields(symbol = %symbol, limit = ?req.limit, timeout_ms = ?req.timeout.map(|d| d.as_millis())),
        )
    )]
    pub async fn snapshot(
        &self,
        symbol: &str,
        req: SnapshotRequest,
    ) -> Result<Snapshot, MercatoError> {
        let symbol = Self::normalize_symbol(symbol)?;
        let limit = self.resolve_limit(req.limit)?;
        let deadline = req
            .timeout
            .or(self.cfg.request_timeout)
            .map(|d| tokio::time::Instant::now() + d);

        let mut done: BTreeMap<Interval, Result<CandleSeries, MercatoError>> = BTreeMap::new();
        {
            let sym = symbol.as_str();
            let mut pending: FuturesUnordered<_> = self
                .cfg
                .snapshot_intervals
                .iter()
                .map(|&iv| async move { (iv, self.fetch_series(sym, iv, limit).await) })
                .collect();

            loop {
                let next = match deadline {
                    Some(at) => match tokio::time::timeout_at(at, pending.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(
                                symbol = sym,
                                pending = pending.len(),
                                "snapshot deadline reached; cancelling pending intervals"
                            );
                            break;
                        }
                    },
                    None => pending.next().await,
                };
                let Some((iv, res)) = next else { break };
                done.insert(iv, res);
            }
        }

        let mut timeframes = BTreeMap::new();
        let mut failures = BTreeMap::new();
        for &iv in &self.cfg.snapshot_intervals {
            match done.remove(&iv) {
                Some(Ok(series)) => {
                    timeframes.insert(iv, Some(series));
                }
                Some(Err(e)) => {
                    timeframes.insert(iv, None);
                    failures.insert(iv, e);
                }
                None => {
                    timeframes.insert(iv, None);
                    failures.insert(iv, MercatoError::request_timeout(format!("candles/{iv}")));
                }
            }
        }

        // Map order is shortest interval first.
        let current_price = timeframes
            .values()
            .flatten()
            .find_map(CandleSeries::last_close);
        let Some(current_price) = current_price else {
            return Err(MercatoError::SnapshotUnavailable {
                symbol,
                failures: failures.into_values().collect(),
            });
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            symbol = %symbol,
            populated = timeframes.values().filter(|s| s.is_some()).count(),
            absent = failures.len(),
            current_price,
            "snapshot assembled"
        );

        Ok(Snapshot {
            symbol,
            current_price,
            timeframes,
            failures,
        })
    }
}
