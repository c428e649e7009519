// =============================================================================
// Binance Module
// =============================================================================
//
// Public-endpoint REST client for candle retrieval plus the cooperative
// rate-limit tracker that keeps the engine well under Binance's request
// weight budget.

pub mod client;
pub mod rate_limit;

pub use client::BinanceClient;
