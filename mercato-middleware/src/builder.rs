//! Builder for composing connectors with middleware layers.
//!
//! Layers are stored outermost first and applied in reverse during
//! [`ConnectorBuilder::build`], so the last layer added becomes the outermost
//! wrapper: `builder.layer(a).layer(b)` yields `b(a(raw))`.

use std::sync::Arc;

use mercato_core::{CandleConnector, Middleware};
use mercato_types::CacheConfig;
use serde_json::json;

use crate::cache::CacheMiddleware;

const CACHE_LAYER: &str = "CachingMiddleware";

/// Generic middleware builder for composing a connector with layered wrappers.
pub struct ConnectorBuilder {
    raw: Arc<dyn CandleConnector>,
    /// Middleware layers in outermost-first order.
    layers: Vec<Box<dyn Middleware>>,
}

impl ConnectorBuilder {
    /// Create a new builder from a raw, unwrapped connector.
    #[must_use]
    pub fn new(raw: Arc<dyn CandleConnector>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Add or replace the TTL cache layer.
    ///
    /// The cache sits directly around the raw connector, inside any custom layers,
    /// so those layers observe cache hits as ordinary successful calls.
    #[must_use]
    pub fn with_cache(mut self, cfg: &CacheConfig) -> Self {
        self.layers.retain(|m| m.name() != CACHE_LAYER);
        self.layers.push(Box::new(CacheMiddleware::new(*cfg)));
        self
    }

    /// Remove the cache layer if present.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.layers.retain(|m| m.name() != CACHE_LAYER);
        self
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: Box<dyn Middleware>) -> Self {
        self.layers.insert(0, layer);
        self
    }

    /// Describe the stack, outermost first, ending with the raw connector.
    #[must_use]
    pub fn describe(&self) -> Vec<serde_json::Value> {
        self.layers
            .iter()
            .map(|l| json!({ "name": l.name(), "config": l.config_json() }))
            .chain(std::iter::once(
                json!({ "name": "RawConnector", "config": { "name": self.raw.name() } }),
            ))
            .collect()
    }

    /// Build the wrapped connector.
    #[must_use]
    pub fn build(self) -> Arc<dyn CandleConnector> {
        let mut acc: Arc<dyn CandleConnector> = Arc::clone(&self.raw);
        for m in self.layers.into_iter().rev() {
            acc = m.apply(acc);
        }
        acc
    }
}
