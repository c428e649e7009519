// =============================================================================
// OHLCV Candle
// =============================================================================
//
// One bar of open/high/low/close/volume data at the exchange's native
// resolution. Candle sequences handed to the engine are expected to be
// ordered ascending by `open_time` with unique timestamps.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time in milliseconds since the UNIX epoch (UTC).
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Bar open time as a UTC instant.
    ///
    /// Falls back to the epoch for out-of-range timestamps rather than
    /// panicking; candles from the exchange are always in range.
    pub fn open_instant(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.open_time)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().unwrap_or_default())
    }

    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Extract the close-price series from a candle slice (oldest first).
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
