//! Provider health registry and failover selection.
//!
//! The registry is an explicit object, shared behind an `Arc` by every in-flight
//! fetch. All reads and writes go through one mutex whose critical sections are
//! purely in-memory, so no lock is ever held across an await point. Granting a
//! half-open trial happens inside a single critical section, so a recovering
//! provider is handed to at most one caller until that call records an outcome or
//! is released.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{HealthConfig, MercatoError, ProviderHealth};

/// A provider picked by [`HealthRegistry::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    /// The chosen candidate.
    pub provider: &'a str,
    /// True when this call is the single half-open trial of a recovering provider.
    pub trial: bool,
}

impl<'a> Selection<'a> {
    const fn regular(provider: &'a str) -> Self {
        Self {
            provider,
            trial: false,
        }
    }
}

/// Process-wide success/error bookkeeping for market-data providers.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    cfg: HealthConfig,
    state: Mutex<HashMap<String, ProviderHealth>>,
}

impl HealthRegistry {
    /// Create an empty registry with the given thresholds.
    #[must_use]
    pub fn new(cfg: HealthConfig) -> Self {
        Self {
            cfg,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Thresholds this registry was built with.
    #[must_use]
    pub const fn config(&self) -> HealthConfig {
        self.cfg
    }

    // A panic while holding the guard cannot leave a record half-written (every
    // update is a handful of field stores), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ProviderHealth>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recovery_window(&self) -> TimeDelta {
        TimeDelta::from_std(self.cfg.recovery_window).unwrap_or(TimeDelta::MAX)
    }

    /// Record a successful call to `provider` now.
    pub fn record_success(&self, provider: &str) {
        self.record_success_at(provider, Utc::now());
    }

    /// Record a successful call to `provider` at `now`.
    pub fn record_success_at(&self, provider: &str, now: DateTime<Utc>) {
        let mut guard = self.lock();
        let h = guard
            .entry(provider.to_string())
            .or_insert_with(|| ProviderHealth::new(provider));
        h.last_success_time = Some(now);
        h.consecutive_error_count = 0;
        h.healthy = true;
        h.half_open = false;
    }

    /// Record a provider fault for `provider` now.
    pub fn record_error(&self, provider: &str) {
        self.record_error_at(provider, Utc::now());
    }

    /// Record a provider fault for `provider` at `now`.
    ///
    /// A provider reaching the error threshold is marked unhealthy. A fault while a
    /// half-open trial is outstanding keeps the provider unhealthy and restarts its
    /// recovery window.
    pub fn record_error_at(&self, provider: &str, now: DateTime<Utc>) {
        let threshold = self.cfg.error_threshold;
        let mut guard = self.lock();
        let h = guard
            .entry(provider.to_string())
            .or_insert_with(|| ProviderHealth::new(provider));
        h.last_error_time = Some(now);
        h.consecutive_error_count = h.consecutive_error_count.saturating_add(1);
        if h.half_open || h.consecutive_error_count >= threshold {
            #[cfg(feature = "tracing")]
            if h.healthy || h.half_open {
                tracing::warn!(
                    provider = provider,
                    errors = h.consecutive_error_count,
                    half_open = h.half_open,
                    "provider marked unhealthy"
                );
            }
            h.healthy = false;
        }
        h.half_open = false;
    }

    /// Pick the first usable provider among `candidates` (highest priority first).
    ///
    /// # Errors
    /// Returns `AllProvidersUnavailable` when every candidate is unhealthy and either
    /// still inside its recovery window or already on a trial call.
    pub fn select_provider<'a>(&self, candidates: &[&'a str]) -> Result<&'a str, MercatoError> {
        self.select_at(candidates, Utc::now()).map(|s| s.provider)
    }

    /// Like [`select_provider`](Self::select_provider), evaluated at `now`.
    ///
    /// # Errors
    /// Returns `AllProvidersUnavailable` when no candidate is usable.
    pub fn select_provider_at<'a>(
        &self,
        candidates: &[&'a str],
        now: DateTime<Utc>,
    ) -> Result<&'a str, MercatoError> {
        self.select_at(candidates, now).map(|s| s.provider)
    }

    /// Pick the first usable provider and report whether the pick is a half-open trial.
    ///
    /// # Errors
    /// Returns `AllProvidersUnavailable` when no candidate is usable.
    pub fn select<'a>(&self, candidates: &[&'a str]) -> Result<Selection<'a>, MercatoError> {
        self.select_at(candidates, Utc::now())
    }

    /// Like [`select`](Self::select), evaluated at `now`.
    ///
    /// A healthy (or never recorded) candidate is usable. An unhealthy candidate whose
    /// last fault is at least one recovery window old is usable exactly once: the
    /// first selector gets it as a trial, its error count is zeroed and it is flagged
    /// half-open. It stays unhealthy, and is skipped by every other selector, until
    /// the trial records an outcome or is released.
    ///
    /// # Errors
    /// Returns `AllProvidersUnavailable` when no candidate is usable.
    pub fn select_at<'a>(
        &self,
        candidates: &[&'a str],
        now: DateTime<Utc>,
    ) -> Result<Selection<'a>, MercatoError> {
        let window = self.recovery_window();
        let mut guard = self.lock();
        for &name in candidates {
            let Some(h) = guard.get_mut(name) else {
                return Ok(Selection::regular(name));
            };
            if h.healthy {
                return Ok(Selection::regular(name));
            }
            if h.half_open {
                continue;
            }
            let recovered = h
                .last_error_time
                .is_none_or(|t| now.signed_duration_since(t) >= window);
            if recovered {
                #[cfg(feature = "tracing")]
                tracing::debug!(provider = name, "recovery window elapsed; half-open trial");
                h.consecutive_error_count = 0;
                h.half_open = true;
                return Ok(Selection {
                    provider: name,
                    trial: true,
                });
            }
        }
        Err(MercatoError::AllProvidersUnavailable {
            candidates: candidates.iter().map(ToString::to_string).collect(),
        })
    }

    /// Give back a trial that ended without an outcome (e.g. it was cancelled).
    ///
    /// The provider stays unhealthy and the next selector may try it again. A no-op
    /// when no trial is outstanding.
    pub fn release_trial(&self, provider: &str) {
        if let Some(h) = self.lock().get_mut(provider) {
            h.half_open = false;
        }
    }

    /// Current record for `provider`, if it has ever been recorded.
    #[must_use]
    pub fn health(&self, provider: &str) -> Option<ProviderHealth> {
        self.lock().get(provider).cloned()
    }

    /// All known records, ordered by provider id.
    #[must_use]
    pub fn all(&self) -> Vec<ProviderHealth> {
        let mut out: Vec<ProviderHealth> = self.lock().values().cloned().collect();
        out.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        out
    }
}
