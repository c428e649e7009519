// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band is a simple moving average; the half-width is k times the
// population standard deviation (divisor = N, not N - 1):
//
//   mid   = SMA(close, length)
//   low   = mid - k * sigma
//   high  = mid + k * sigma
//   width = high - low
//
// All four series are `None` until the rolling window is fully populated.
// For every populated row the bands satisfy low <= mid <= high.

use crate::indicators::rolling::{rolling_mean, rolling_std_pop, some};

/// The Bollinger band series for one input series.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub low: Vec<Option<f64>>,
    pub mid: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub width: Vec<Option<f64>>,
}

/// Compute Bollinger bands over `series` with window `length` and band
/// multiplier `k`.
pub fn bollinger(series: &[f64], length: usize, k: f64) -> BollingerBands {
    let values = some(series);
    let mid = rolling_mean(&values, length);
    let sd = rolling_std_pop(&values, length);

    let mut low = Vec::with_capacity(series.len());
    let mut high = Vec::with_capacity(series.len());
    let mut width = Vec::with_capacity(series.len());

    for i in 0..series.len() {
        match (mid[i], sd[i]) {
            (Some(m), Some(s)) => {
                let half = k * s;
                low.push(Some(m - half));
                high.push(Some(m + half));
                width.push(Some(2.0 * half));
            }
            _ => {
                low.push(None);
                high.push(None);
                width.push(None);
            }
        }
    }

    BollingerBands {
        low,
        mid,
        high,
        width,
    }
}
