//! mercato-core
//!
//! Core types, traits, and algorithms shared across the mercato workspace.
//!
//! - `types`: re-exported data model (candles, intervals, levels, zones, errors).
//! - `connector`: the `CandleConnector` trait implemented by every provider.
//! - `health`: the provider health registry and failover selection.
//! - `timeseries`: normalization of raw provider payloads.
//! - `analysis`: swing levels, confluence zones and EMA.
//! - `wire`: decoding helpers for loosely-typed exchange payloads.
//!
//! Nothing here depends on an async runtime; `CandleConnector` is an
//! `async_trait` and the health registry only uses a short-lived `std` mutex.
#![warn(missing_docs)]

/// Multi-timeframe technical analysis.
pub mod analysis;
/// Connector trait implemented by market-data providers.
pub mod connector;
/// Provider health registry and failover selection.
pub mod health;
/// Middleware trait implemented by connector wrappers.
pub mod middleware;
/// Time-series utilities for normalizing provider payloads.
pub mod timeseries;
/// Re-export of the shared domain types.
pub mod types;
/// Helpers for decoding loosely typed provider JSON.
pub mod wire;

pub use analysis::{analyze_snapshot, detect_confluence, detect_levels, ema, ema_series};
pub use connector::{CandleConnector, CandleRequest};
pub use health::{HealthRegistry, Selection};
pub use middleware::Middleware;
pub use timeseries::normalize::{is_strictly_increasing, normalize_series};
pub use types::*;
