#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use mercato::{Candle, CandleConnector, Interval, Mercato, MercatoError};
use mercato_core::CandleRequest;
use mercato_mock::{DynamicMockConnector, DynamicMockController, MockBehavior, synthetic_candles};

pub const BTC: &str = "BTC";
pub const ETH: &str = "ETH";

/// A dynamic mock with a default behavior already installed.
pub async fn dynamic(
    name: &'static str,
    default: MockBehavior,
) -> (Arc<dyn CandleConnector>, DynamicMockController) {
    let (c, ctl) = DynamicMockConnector::new_with_controller(name);
    ctl.set_default_behavior(default).await;
    (c, ctl)
}

/// Orchestrator over `connectors` in registration order, default configuration.
pub fn mercato_with(connectors: &[Arc<dyn CandleConnector>]) -> Mercato {
    connectors
        .iter()
        .fold(Mercato::builder(), |b, c| b.with_connector(Arc::clone(c)))
        .build()
        .unwrap()
}

/// A provider fault attributed to `name`.
pub fn boom(name: &str) -> MockBehavior {
    MockBehavior::Fail(MercatoError::connector(name, "HTTP 502 Bad Gateway"))
}

pub fn candle(interval: Interval, open_ms: i64, close: f64) -> Candle {
    let open_time = DateTime::from_timestamp_millis(open_ms).unwrap();
    let close_time = DateTime::from_timestamp_millis(open_ms + interval.millis() - 1).unwrap();
    Candle {
        symbol: BTC.into(),
        interval,
        open_time,
        close_time,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1.0,
    }
}

/// Connector that only serves a fixed subset of intervals.
pub struct IntervalLimited {
    pub name: &'static str,
    pub intervals: &'static [Interval],
}

#[async_trait]
impl CandleConnector for IntervalLimited {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "IntervalLimited"
    }

    fn resolve_symbol(&self, symbol: &str) -> String {
        symbol.to_string()
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        self.intervals
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
        Ok(synthetic_candles(&req.symbol, 100.0, req.interval, req.limit))
    }
}
