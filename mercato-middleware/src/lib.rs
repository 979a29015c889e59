//! mercato-middleware
//!
//! Connector wrappers stacked around a raw `CandleConnector`. The only layer
//! shipped today is a fixed-TTL candle cache backed by `moka`.

mod builder;
mod cache;

pub use crate::builder::ConnectorBuilder;
pub use crate::cache::{CacheMiddleware, CachedCandles, CachingConnector};
