// =============================================================================
// Stochastic RSI
// =============================================================================
//
// RSI normalised into [0, 1] by its own rolling min/max over `length`
// periods, then smoothed with two successive simple moving averages:
//
//   stoch = (RSI - min_n(RSI)) / (max_n(RSI) - min_n(RSI) + eps)
//   K     = SMA(stoch, k)
//   D     = SMA(K, d)
//
// The epsilon keeps a flat RSI window (max == min) at 0 instead of NaN.

use crate::indicators::rolling::{rolling_max, rolling_mean, rolling_min};
use crate::indicators::rsi::rsi;
use crate::scale::EPS;

/// K and D lines of the stochastic RSI, both in [0, 1].
#[derive(Debug, Clone)]
pub struct StochRsi {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Compute stochastic RSI for `series` with RSI/min-max window `length` and
/// smoothing windows `k` and `d`. Output series match the input length;
/// warm-up rows are `None`.
pub fn stoch_rsi(series: &[f64], length: usize, k: usize, d: usize) -> StochRsi {
    let r = rsi(series, length);
    let min_r = rolling_min(&r, length);
    let max_r = rolling_max(&r, length);

    let stoch: Vec<Option<f64>> = (0..r.len())
        .map(|i| match (r[i], min_r[i], max_r[i]) {
            (Some(v), Some(lo), Some(hi)) => {
                let s = (v - lo) / ((hi - lo) + EPS);
                s.is_finite().then_some(s)
            }
            _ => None,
        })
        .collect();

    let k_line = rolling_mean(&stoch, k);
    let d_line = rolling_mean(&k_line, d);

    StochRsi {
        k: k_line,
        d: d_line,
    }
}
