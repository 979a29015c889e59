//! Configuration types shared across the orchestrator, analysis and middleware.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MercatoError;
use crate::market::Interval;

/// Thresholds driving the provider health registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Consecutive faults after which a provider is marked unhealthy.
    pub error_threshold: u32,
    /// How long after its last fault an unhealthy provider becomes eligible for a trial call.
    pub recovery_window: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            error_threshold: 3,
            recovery_window: Duration::from_secs(5 * 60),
        }
    }
}

/// Parameters for level detection, confluence clustering and EMA computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Bars on each side a swing extreme must dominate.
    pub swing_window: usize,
    /// Band, in percent of a level's price, within which another swing counts as a touch.
    pub touch_tolerance_pct: f64,
    /// Band, in percent of a zone's running centroid, within which a level joins the zone.
    pub confluence_tolerance_pct: f64,
    /// Zones backed by fewer distinct intervals are dropped.
    pub min_zone_intervals: usize,
    /// EMA lookback periods computed per timeframe.
    pub ema_periods: Vec<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            swing_window: 5,
            touch_tolerance_pct: 0.25,
            confluence_tolerance_pct: 0.5,
            min_zone_intervals: 1,
            ema_periods: vec![9, 21, 50, 100, 200],
        }
    }
}

impl AnalysisConfig {
    /// Reject parameter combinations the analyzers cannot work with.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming the offending field.
    pub fn validate(&self) -> Result<(), MercatoError> {
        if self.swing_window == 0 {
            return Err(MercatoError::InvalidArg(
                "swing_window must be at least 1".into(),
            ));
        }
        for (name, v) in [
            ("touch_tolerance_pct", self.touch_tolerance_pct),
            ("confluence_tolerance_pct", self.confluence_tolerance_pct),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(MercatoError::InvalidArg(format!(
                    "{name} must be a positive finite percentage, got {v}"
                )));
            }
        }
        if self.ema_periods.contains(&0) {
            return Err(MercatoError::InvalidArg(
                "ema_periods must not contain 0".into(),
            ));
        }
        Ok(())
    }
}

/// TTL cache settings for the caching middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in milliseconds. `0` disables caching.
    pub ttl_ms: u64,
    /// Upper bound on cached request fingerprints.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 30_000,
            max_entries: 1_024,
        }
    }
}

/// Global configuration for the `Mercato` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MercatoConfig {
    /// Per-symbol provider order overrides (connector names, highest priority first).
    ///
    /// Unlisted connectors keep their registration order after the listed ones.
    pub per_symbol_priority: HashMap<String, Vec<String>>,
    /// Timeout for individual provider requests.
    pub provider_timeout: Duration,
    /// Default deadline for a whole snapshot when the caller supplies none.
    pub request_timeout: Option<Duration>,
    /// Extra providers tried after the first one fails, per request.
    pub max_failover_hops: usize,
    /// Bars requested when the caller gives no limit.
    pub default_limit: usize,
    /// Upper bound applied to caller-supplied limits.
    pub max_limit: usize,
    /// Intervals fetched by a snapshot.
    pub snapshot_intervals: Vec<Interval>,
    /// Provider health thresholds.
    pub health: HealthConfig,
    /// Technical-analysis parameters.
    pub analysis: AnalysisConfig,
}

impl Default for MercatoConfig {
    fn default() -> Self {
        Self {
            per_symbol_priority: HashMap::new(),
            provider_timeout: Duration::from_secs(5),
            request_timeout: None,
            max_failover_hops: 1,
            default_limit: 200,
            max_limit: 1_000,
            snapshot_intervals: Interval::SNAPSHOT_DEFAULT.to_vec(),
            health: HealthConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}
