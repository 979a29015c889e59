//! mercato-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod analysis;
mod config;
mod connector;
mod error;
mod health;
mod market;
mod reports;

pub use analysis::{ConfluenceZone, EmaSeries, LevelKind, TechnicalLevel};
pub use config::{AnalysisConfig, CacheConfig, HealthConfig, MercatoConfig};
pub use connector::ConnectorKey;
pub use error::MercatoError;
pub use health::ProviderHealth;
pub use market::{Candle, CandleSeries, Interval, Snapshot};
pub use reports::AnalysisReport;
