use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use mercato_core::{
    AnalysisConfig, CandleConnector, HealthConfig, HealthRegistry, Interval, MercatoConfig,
    MercatoError,
};

/// Orchestrator that routes candle requests across registered providers.
pub struct Mercato {
    pub(crate) connectors: Vec<Arc<dyn CandleConnector>>,
    pub(crate) cfg: MercatoConfig,
    pub(crate) health: Arc<HealthRegistry>,
}

/// Builder for constructing a `Mercato` orchestrator with custom configuration.
pub struct MercatoBuilder {
    connectors: Vec<Arc<dyn CandleConnector>>,
    cfg: MercatoConfig,
    health: Option<Arc<HealthRegistry>>,
}

impl Default for MercatoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MercatoBuilder {
    /// Create a new builder with the defaults of [`MercatoConfig`].
    ///
    /// Starts with no connectors; register at least one via [`with_connector`](Self::with_connector).
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: MercatoConfig::default(),
            health: None,
        }
    }

    /// Register a provider connector.
    ///
    /// Registration order is the default priority order: the first connector is the
    /// primary, the next one its fallback, and so on.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn CandleConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Set preferred providers for a symbol using connector instances.
    ///
    /// The list is an ordering hint; unlisted connectors are still tried after the
    /// listed ones, in registration order.
    #[must_use]
    pub fn prefer_symbol(
        mut self,
        symbol: &str,
        connectors_desc: &[Arc<dyn CandleConnector>],
    ) -> Self {
        let names: Vec<String> = connectors_desc
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        self.cfg
            .per_symbol_priority
            .insert(normalize_symbol_key(symbol), names);
        self
    }

    /// Share an existing health registry, e.g. between several orchestrators.
    ///
    /// The registry keeps its own thresholds; [`health_config`](Self::health_config)
    /// only applies to a registry created by [`build`](Self::build).
    #[must_use]
    pub fn health_registry(mut self, registry: Arc<HealthRegistry>) -> Self {
        self.health = Some(registry);
        self
    }

    /// Thresholds for the registry created at build time.
    #[must_use]
    pub const fn health_config(mut self, cfg: HealthConfig) -> Self {
        self.cfg.health = cfg;
        self
    }

    /// Set the per-provider request timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Default deadline for a whole snapshot when the caller supplies none.
    ///
    /// Intervals still pending at the deadline are reported absent with a
    /// `RequestTimeout` failure.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Extra providers tried after the first one fails, per request.
    #[must_use]
    pub const fn max_failover_hops(mut self, hops: usize) -> Self {
        self.cfg.max_failover_hops = hops;
        self
    }

    /// Bars requested when the caller gives no limit.
    #[must_use]
    pub const fn default_limit(mut self, limit: usize) -> Self {
        self.cfg.default_limit = limit;
        self
    }

    /// Upper bound applied to caller-supplied limits.
    #[must_use]
    pub const fn max_limit(mut self, limit: usize) -> Self {
        self.cfg.max_limit = limit;
        self
    }

    /// Parameters for level detection, confluence clustering and EMA.
    #[must_use]
    pub fn analysis(mut self, cfg: AnalysisConfig) -> Self {
        self.cfg.analysis = cfg;
        self
    }

    /// Intervals fetched by [`Mercato::snapshot`].
    #[must_use]
    pub fn snapshot_intervals(mut self, intervals: &[Interval]) -> Self {
        self.cfg.snapshot_intervals = intervals.to_vec();
        self
    }

    /// Replace the whole configuration at once.
    #[must_use]
    pub fn config(mut self, cfg: MercatoConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the `Mercato` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors have been registered, the limits are
    /// zero or inverted, the snapshot interval set is empty, or the analysis
    /// parameters are unusable.
    pub fn build(mut self) -> Result<Mercato, MercatoError> {
        if self.connectors.is_empty() {
            return Err(MercatoError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }
        if self.cfg.default_limit == 0 || self.cfg.max_limit == 0 {
            return Err(MercatoError::InvalidArg(
                "default_limit and max_limit must be at least 1".to_string(),
            ));
        }
        if self.cfg.default_limit > self.cfg.max_limit {
            return Err(MercatoError::InvalidArg(format!(
                "default_limit {} exceeds max_limit {}",
                self.cfg.default_limit, self.cfg.max_limit
            )));
        }
        self.cfg.analysis.validate()?;

        self.cfg.snapshot_intervals.sort_unstable();
        self.cfg.snapshot_intervals.dedup();
        if self.cfg.snapshot_intervals.is_empty() {
            return Err(MercatoError::InvalidArg(
                "snapshot_intervals must not be empty".to_string(),
            ));
        }

        // Drop unknown and duplicate connector names from priority lists.
        let known: HashSet<&'static str> = self.connectors.iter().map(|c| c.name()).collect();
        for v in self.cfg.per_symbol_priority.values_mut() {
            let mut seen: HashSet<String> = HashSet::new();
            v.retain(|n| known.contains(n.as_str()) && seen.insert(n.clone()));
        }
        self.cfg.per_symbol_priority = self
            .cfg
            .per_symbol_priority
            .drain()
            .map(|(k, v)| (normalize_symbol_key(&k), v))
            .collect();

        let health = match self.health {
            Some(shared) => {
                self.cfg.health = shared.config();
                shared
            }
            None => Arc::new(HealthRegistry::new(self.cfg.health)),
        };

        Ok(Mercato {
            connectors: self.connectors,
            cfg: self.cfg,
            health,
        })
    }
}

fn normalize_symbol_key(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

impl Mercato {
    /// Start building a new `Mercato` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use mercato_binance::BinanceConnector;
    /// use mercato_okx::OkxConnector;
    ///
    /// let mercato = mercato::Mercato::builder()
    ///     .with_connector(Arc::new(BinanceConnector::new_default()))
    ///     .with_connector(Arc::new(OkxConnector::new_default()))
    ///     .provider_timeout(std::time::Duration::from_secs(3))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> MercatoBuilder {
        MercatoBuilder::new()
    }

    /// Effective configuration after build-time validation.
    #[must_use]
    pub const fn config(&self) -> &MercatoConfig {
        &self.cfg
    }

    /// The health registry consulted and updated by every fetch.
    #[must_use]
    pub const fn health(&self) -> &Arc<HealthRegistry> {
        &self.health
    }

    /// Connectors able to serve `interval`, highest priority first.
    pub(crate) fn ordered(&self, symbol: &str, interval: Interval) -> Vec<Arc<dyn CandleConnector>> {
        let mut out: Vec<(usize, Arc<dyn CandleConnector>)> = self
            .connectors
            .iter()
            .filter(|c| c.supports_interval(interval))
            .cloned()
            .enumerate()
            .collect();

        if let Some(pref) = self.cfg.per_symbol_priority.get(symbol) {
            let pos: HashMap<&str, usize> = pref
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect();
            out.sort_by_key(|(orig_i, c)| {
                (pos.get(c.name()).copied().unwrap_or(usize::MAX), *orig_i)
            });
        }
        out.into_iter().map(|(_, c)| c).collect()
    }

    /// Generic ticker as used for priorities and stamped onto results.
    pub(crate) fn normalize_symbol(symbol: &str) -> Result<String, MercatoError> {
        let s = normalize_symbol_key(symbol);
        if s.is_empty() {
            return Err(MercatoError::InvalidArg("symbol must not be empty".into()));
        }
        Ok(s)
    }

    /// Apply the default and the upper bound to a caller-supplied limit.
    pub(crate) fn resolve_limit(&self, limit: Option<usize>) -> Result<usize, MercatoError> {
        match limit {
            None => Ok(self.cfg.default_limit),
            Some(0) => Err(MercatoError::InvalidArg("limit must be at least 1".into())),
            Some(n) => Ok(n.min(self.cfg.max_limit)),
        }
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, MercatoError>
    where
        Fut: core::future::Future<Output = Result<T, MercatoError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(MercatoError::provider_timeout(connector_name, capability)))
    }
}

/// Attribute a bare provider error to the connector that raised it.
pub(crate) fn tag_err(connector: &str, e: MercatoError) -> MercatoError {
    match e {
        e @ (MercatoError::NotFound { .. }
        | MercatoError::ProviderTimeout { .. }
        | MercatoError::Connector { .. }
        | MercatoError::Unsupported { .. }) => e,
        other => MercatoError::Connector {
            connector: connector.to_string(),
            msg: other.to_string(),
        },
    }
}
