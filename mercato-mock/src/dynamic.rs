use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mercato_core::{Candle, CandleConnector, CandleRequest, Interval, MercatoError};

use crate::synthetic_candles;

/// Instruction for how `fetch_candles` should behave for a given input.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the provided bars immediately.
    Return(Vec<Candle>),
    /// Serve synthetic bars around the given base price.
    Generate(f64),
    /// Fail immediately with the provided error.
    Fail(MercatoError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
    /// Sleep, then behave as the inner instruction.
    Delay(Duration, Box<MockBehavior>),
}

#[derive(Default)]
struct InternalState {
    default_rule: Option<MockBehavior>,
    symbol_rules: HashMap<String, MockBehavior>,
    interval_rules: HashMap<(String, Interval), MockBehavior>,
    calls: HashMap<(String, Interval), usize>,
}

impl InternalState {
    fn behavior_for(&self, symbol: &str, interval: Interval) -> Option<MockBehavior> {
        self.interval_rules
            .get(&(symbol.to_string(), interval))
            .or_else(|| self.symbol_rules.get(symbol))
            .or(self.default_rule.as_ref())
            .cloned()
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
///
/// Rules resolve most specific first: `(symbol, interval)`, then `symbol`, then the
/// connector-wide default. A call with no matching rule is `Unsupported`.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Behavior for every call not matched by a more specific rule.
    pub async fn set_default_behavior(&self, behavior: MockBehavior) {
        self.state.lock().await.default_rule = Some(behavior);
    }

    /// Behavior for every interval of `symbol`.
    pub async fn set_symbol_behavior(&self, symbol: &str, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.symbol_rules.insert(symbol.to_string(), behavior);
    }

    /// Behavior for one `(symbol, interval)` pair.
    pub async fn set_behavior(&self, symbol: &str, interval: Interval, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard
            .interval_rules
            .insert((symbol.to_string(), interval), behavior);
    }

    /// Number of `fetch_candles` calls seen for `(symbol, interval)`.
    pub async fn calls(&self, symbol: &str, interval: Interval) -> usize {
        let guard = self.state.lock().await;
        guard
            .calls
            .get(&(symbol.to_string(), interval))
            .copied()
            .unwrap_or(0)
    }

    /// Number of `fetch_candles` calls seen in total.
    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.calls.values().sum()
    }

    /// Clear all configured behaviors and call counters.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn CandleConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn CandleConnector>, controller)
    }
}

async fn run(mut behavior: MockBehavior, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
    loop {
        match behavior {
            MockBehavior::Return(bars) => return Ok(bars),
            MockBehavior::Generate(base) => {
                return Ok(synthetic_candles(&req.symbol, base, req.interval, req.limit));
            }
            MockBehavior::Fail(e) => return Err(e),
            MockBehavior::Hang => return std::future::pending().await,
            MockBehavior::Delay(d, next) => {
                tokio::time::sleep(d).await;
                behavior = *next;
            }
        }
    }
}

#[async_trait]
impl CandleConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn resolve_symbol(&self, symbol: &str) -> String {
        symbol.to_string()
    }

    async fn fetch_candles(&self, req: &CandleRequest) -> Result<Vec<Candle>, MercatoError> {
        // Snapshot the rule without holding the lock across the behavior's awaits.
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard
                .calls
                .entry((req.symbol.clone(), req.interval))
                .or_insert(0) += 1;
            guard.behavior_for(&req.symbol, req.interval)
        };
        match behavior {
            Some(b) => run(b, req).await,
            None => Err(MercatoError::unsupported(format!(
                "candles/{}/{}",
                req.symbol, req.interval
            ))),
        }
    }
}
