//! Re-export of foundational types from `mercato-types`.
// Consolidated re-exports so downstream crates can depend on `mercato-core` only

pub use mercato_types::{
    AnalysisConfig, AnalysisReport, CacheConfig, Candle, CandleSeries, ConfluenceZone,
    ConnectorKey, EmaSeries, HealthConfig, Interval, LevelKind, MercatoConfig, MercatoError,
    ProviderHealth, Snapshot, TechnicalLevel,
};
