use std::sync::Arc;

use mercato_core::CandleConnector;
use mercato_middleware::ConnectorBuilder;
use mercato_types::CacheConfig;

use crate::BinanceConnector;

/// Builder type alias specialized for Binance connectors.
pub type BinanceConnectorBuilder = ConnectorBuilder;

impl BinanceConnector {
    /// Returns an unconfigured builder around the default connector.
    #[must_use]
    pub fn builder() -> BinanceConnectorBuilder {
        let raw: Arc<dyn CandleConnector> = Arc::new(Self::new_default());
        ConnectorBuilder::new(raw)
    }

    /// Returns a builder with the default TTL cache in front of the connector.
    #[must_use]
    pub fn cached() -> BinanceConnectorBuilder {
        Self::builder().with_cache(&CacheConfig::default())
    }
}
