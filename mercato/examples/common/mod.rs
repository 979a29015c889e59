use std::sync::Arc;

use mercato_core::{CacheConfig, CandleConnector};
use mercato_middleware::ConnectorBuilder;

/// Primary and fallback connectors, each behind a short-lived cache.
///
/// Set `MERCATO_EXAMPLES_USE_MOCK` to run offline against synthetic data.
#[must_use]
pub fn get_connectors() -> Vec<Arc<dyn CandleConnector>> {
    let cache = CacheConfig {
        ttl_ms: 15_000,
        max_entries: 256,
    };
    if std::env::var("MERCATO_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using Mock Connector for CI) ---");
        let mock: Arc<dyn CandleConnector> = Arc::new(mercato_mock::MockConnector::new());
        vec![ConnectorBuilder::new(mock).with_cache(&cache).build()]
    } else {
        vec![
            mercato_binance::BinanceConnector::builder()
                .with_cache(&cache)
                .build(),
            ConnectorBuilder::new(Arc::new(mercato_okx::OkxConnector::new_default()))
                .with_cache(&cache)
                .build(),
        ]
    }
}

/// Install a fmt subscriber honoring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
