// =============================================================================
// Rate of Change (ROC)
// =============================================================================
//
// Percentage change versus `n` periods ago:
//   ROC = ((close - close_n) / close_n) * 100
//
// The first `n` rows have no reference value and are `None`. A zero reference
// price resolves to 0 rather than dividing by zero.

/// Compute the ROC series for `series` and look-back `n`.
pub fn roc(series: &[f64], n: usize) -> Vec<Option<f64>> {
    if n == 0 {
        return vec![None; series.len()];
    }

    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        if i < n {
            out.push(None);
            continue;
        }
        let prev = series[i - n];
        if prev == 0.0 {
            out.push(Some(0.0));
        } else {
            let v = ((series[i] - prev) / prev) * 100.0;
            out.push(v.is_finite().then_some(v));
        }
    }
    out
}
