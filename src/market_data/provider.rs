// =============================================================================
// Market Data Provider — async fetch seam
// =============================================================================
//
// The scoring engine never talks to an exchange directly; it asks a provider
// for candle batches. Production wires in the Binance REST client, tests wire
// in an in-memory mock so per-symbol failure isolation can be exercised
// without a network.

use anyhow::Result;
use async_trait::async_trait;

use crate::market_data::Candle;

/// Source of finite, already-closed candle batches.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch up to `limit` most recent candles for `symbol` at `interval`
    /// (e.g. "15m"), ordered oldest first.
    async fn fetch_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>>;
}
