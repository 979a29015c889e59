//! Mercato aggregates candle data from several market-data providers and runs a
//! multi-timeframe technical analysis over it.
//!
//! Overview
//! - Routes candle requests to connectors implementing `mercato_core::CandleConnector`.
//! - Registration order is the provider priority; per-symbol overrides reorder it.
//! - A shared `HealthRegistry` excludes providers after repeated faults and lets
//!   them back in through a single half-open trial once the recovery window passes.
//! - Every returned series is normalized: ascending open times, no duplicate bars,
//!   at most `limit` most-recent bars.
//!
//! Key behaviors and trade-offs
//! - Failover is bounded: one request makes at most `1 + max_failover_hops`
//!   provider attempts, trading completeness for predictable latency.
//! - Only provider faults (transport, HTTP, malformed payloads, timeouts) count
//!   against health. A symbol a provider does not list moves on to the next
//!   candidate without penalizing the provider.
//! - Snapshots fan out one task per interval. A failed or timed-out interval is an
//!   explicit `None` entry with its reason in `failures`; the snapshot only fails
//!   when no interval produced a bar.
//! - Cancelling a snapshot (deadline or dropped future) drops the pending provider
//!   calls; they leave the health registry untouched.
//! - Nothing is cached here. Wrap connectors with `mercato_middleware::ConnectorBuilder`
//!   for a TTL cache.
//!
//! Examples
//! Building an orchestrator with a primary and a fallback provider:
//! ```rust,ignore
//! use std::sync::Arc;
//! use mercato::Mercato;
//! use mercato_binance::BinanceConnector;
//! use mercato_okx::OkxConnector;
//!
//! let mercato = Mercato::builder()
//!     .with_connector(Arc::new(BinanceConnector::new_default()))
//!     .with_connector(Arc::new(OkxConnector::new_default()))
//!     .request_timeout(std::time::Duration::from_secs(10))
//!     .build()?;
//! ```
//!
//! Fetching one series, a snapshot and a full analysis:
//! ```rust,ignore
//! use mercato::{Interval, SnapshotRequest};
//!
//! let hourly = mercato.candles("BTC", Interval::H1, Some(200)).await?;
//! let snapshot = mercato.snapshot("BTC", SnapshotRequest::default()).await?;
//! let report = mercato.analyze("ETH", SnapshotRequest::default().with_limit(300)).await?;
//! for zone in &report.zones {
//!     println!("{:.2}..{:.2} x{}", zone.price_low, zone.price_high, zone.interval_count);
//! }
//! ```
//!
//! See `mercato/examples/` for a runnable demonstration.
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use core::{Mercato, MercatoBuilder};
pub use router::snapshot::SnapshotRequest;

// Re-export core types for convenience
pub use mercato_core::{
    AnalysisConfig, AnalysisReport, Candle, CandleConnector, CandleSeries, ConfluenceZone,
    EmaSeries, HealthConfig, HealthRegistry, Interval, LevelKind, MercatoConfig, MercatoError,
    ProviderHealth, Snapshot, TechnicalLevel,
};
