//! Time-series utilities shared by connectors and orchestrator.
//!
//! - `normalize`: de-duplicate, order and bound raw provider bars
/// Normalization of raw provider payloads into candle series.
pub mod normalize;
