// =============================================================================
// Relative Strength Index (RSI) — Wilder-style smoothing
// =============================================================================
//
// Average gain and average loss are each an EMA with alpha = 1 / length,
// seeded at the first price delta. The denominator carries a small epsilon so
// a loss-free series yields an RSI that approaches (but never reaches) 100
// instead of dividing by zero.
//
//   RS  = avg_gain / (avg_loss + eps)
//   RSI = 100 - 100 / (1 + RS)
//
// Output is the same length as the input; index 0 has no delta and is `None`.
// =============================================================================

use crate::indicators::ema::ema_alpha;
use crate::scale::EPS;

/// Compute the full RSI series for `series` and `length`.
///
/// # Edge cases
/// - `length == 0` or input shorter than 2 => all `None`
/// - flat series (no gains, no losses) => RSI 0 by the epsilon-guarded
///   formula; downstream scoring treats this as "not oversold"
pub fn rsi(series: &[f64], length: usize) -> Vec<Option<f64>> {
    if length == 0 || series.len() < 2 {
        return vec![None; series.len()];
    }

    let deltas: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let alpha = 1.0 / length as f64;
    let avg_gain = ema_alpha(&gains, alpha);
    let avg_loss = ema_alpha(&losses, alpha);

    let mut out = Vec::with_capacity(series.len());
    out.push(None);
    for (g, l) in avg_gain.iter().zip(avg_loss.iter()) {
        let rs = g / (l + EPS);
        let value = 100.0 - 100.0 / (1.0 + rs);
        out.push(value.is_finite().then_some(value));
    }

    out
}
