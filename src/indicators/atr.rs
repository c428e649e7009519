// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// True Range for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so its TR is simply H - L. ATR is the
// simple rolling mean of TR over `length` bars, `None` until the window is
// fully populated.

use crate::indicators::rolling::{rolling_mean, some};
use crate::market_data::Candle;

/// Compute the True Range series for a candle slice (oldest first).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());
    for (i, c) in candles.iter().enumerate() {
        let hl = c.high - c.low;
        if i == 0 {
            out.push(hl);
            continue;
        }
        let prev_close = candles[i - 1].close;
        let hc = (c.high - prev_close).abs();
        let lc = (c.low - prev_close).abs();
        out.push(hl.max(hc).max(lc));
    }
    out
}

/// Compute the ATR series: rolling mean of True Range over `length` bars.
pub fn atr(candles: &[Candle], length: usize) -> Vec<Option<f64>> {
    rolling_mean(&some(&true_range(candles)), length)
}
