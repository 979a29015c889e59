use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::market::Interval;

/// Unified error type for the mercato workspace.
///
/// Failures are always scoped to one request: caller mistakes, provider-tagged
/// failures, timeouts, and the per-interval / per-snapshot aggregates produced by
/// the orchestrator.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MercatoError {
    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "candles/3m").
        capability: String,
    },

    /// Malformed or inconsistent payload returned by a provider.
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Interval outside the fixed set. Caller error, never retried.
    #[error("invalid interval: {interval}")]
    InvalidInterval {
        /// The rejected interval token.
        interval: String,
    },

    /// An individual connector returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "candles for XYZ".
        what: String,
    },

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "candles").
        capability: String,
    },

    /// The overall request exceeded the caller deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Capability label for which the request timed out.
        capability: String,
    },

    /// Every attempted provider failed for one interval.
    #[error("no data available for {symbol} {interval}: {errors:?}")]
    NoDataAvailable {
        /// Generic symbol requested.
        symbol: String,
        /// Interval requested.
        interval: Interval,
        /// One error per attempted provider, in attempt order.
        errors: Vec<MercatoError>,
    },

    /// No healthy or recoverable provider existed at selection time.
    #[error("all providers unavailable: {candidates:?}")]
    AllProvidersUnavailable {
        /// Candidates that were considered, in priority order.
        candidates: Vec<String>,
    },

    /// Every interval of a snapshot failed.
    #[error("snapshot unavailable for {symbol}: {failures:?}")]
    SnapshotUnavailable {
        /// Generic symbol requested.
        symbol: String,
        /// The per-interval failures.
        failures: Vec<MercatoError>,
    },
}

impl MercatoError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build an `InvalidInterval` error from the rejected token.
    pub fn invalid_interval(interval: impl Into<String>) -> Self {
        Self::InvalidInterval {
            interval: interval.into(),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Returns true if this error should count against the provider's health.
    ///
    /// Transport failures, malformed payloads and provider timeouts do. Caller
    /// mistakes, unsupported capabilities and missing symbols do not.
    #[must_use]
    pub const fn is_provider_fault(&self) -> bool {
        matches!(
            self,
            Self::Connector { .. } | Self::Data(_) | Self::ProviderTimeout { .. } | Self::Other(_)
        )
    }

    /// Returns true for errors caused by the caller's input.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArg(_) | Self::InvalidInterval { .. })
    }

    /// Flatten nested aggregates into a plain vector.
    ///
    /// `NoDataAvailable` and `SnapshotUnavailable` are unwrapped recursively;
    /// other variants are preserved as-is.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::NoDataAvailable { errors, .. } => {
                errors.into_iter().flat_map(Self::flatten).collect()
            }
            Self::SnapshotUnavailable { failures, .. } => {
                failures.into_iter().flat_map(Self::flatten).collect()
            }
            other => vec![other],
        }
    }
}
