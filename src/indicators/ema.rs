// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Recursive exponential average with smoothing constant:
//   alpha = 2 / (span + 1)
//   EMA_0 = x_0
//   EMA_t = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// The first output equals the first input — no separate warm-up weighting
// scheme — so the returned series always has the same length as the input.
// =============================================================================

/// Compute the EMA series for `series` with the given `span`.
///
/// # Edge cases
/// - `span == 0` => empty vec (division-by-zero guard)
/// - `span == 1` => alpha is 1, output equals the input unchanged
/// - empty input => empty vec
pub fn ema(series: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || series.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut out = Vec::with_capacity(series.len());
    let mut prev = series[0];
    out.push(prev);

    for &x in &series[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        out.push(prev);
    }

    out
}

/// EMA with an explicit smoothing constant `alpha` in (0, 1].
///
/// Used by Wilder-style averages where alpha = 1 / length rather than the
/// span form above. Same seeding rule: first output equals first input.
pub fn ema_alpha(series: &[f64], alpha: f64) -> Vec<f64> {
    if series.is_empty() || !(0.0..=1.0).contains(&alpha) || alpha == 0.0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(series.len());
    let mut prev = series[0];
    out.push(prev);

    for &x in &series[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        out.push(prev);
    }

    out
}
