pub mod analysis;
pub mod candles;
pub mod snapshot;
