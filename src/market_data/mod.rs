// =============================================================================
// Market Data Module
// =============================================================================
//
// Batch-oriented market data types for the scoring engine:
// - `Candle` — one OHLCV bar at native exchange resolution
// - `MarketDataProvider` — async fetch seam so the engine can run against the
//   live exchange in production and an in-memory mock in tests

pub mod candle;
pub mod provider;

pub use candle::Candle;
pub use provider::MarketDataProvider;
