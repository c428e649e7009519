// =============================================================================
// Ensemble Combiner — fixed-weight blend with short EMA smoothing
// =============================================================================
//
// Per-bucket weighted sum of already-aligned score series, followed by a
// short recursive EMA pass and a clip to [0, 100]. A missing input value
// contributes 0 to the sum for that bucket; this is a documented
// simplification, not a rigorous missing-data treatment.

use std::collections::HashMap;

use crate::indicators::ema::ema;

/// Default meta-model weight vector over M2/M3/M4/M6/M8.
pub fn default_weights() -> HashMap<String, f64> {
    HashMap::from([
        ("M2".to_string(), 0.25),
        ("M3".to_string(), 0.10),
        ("M4".to_string(), 0.25),
        ("M6".to_string(), 0.20),
        ("M8".to_string(), 0.20),
    ])
}

/// Blend `inputs` (series, weight) pairs over `len` buckets, smooth with an
/// EMA of `ema_span`, and clip to [0, 100].
///
/// Inputs shorter than `len` contribute 0 beyond their end. The output is
/// dense (every bucket populated): once blended, the ensemble always has an
/// opinion, even if it is 0.
pub fn combine(inputs: &[(&[Option<f64>], f64)], ema_span: usize, len: usize) -> Vec<Option<f64>> {
    let blended: Vec<f64> = (0..len)
        .map(|i| {
            inputs
                .iter()
                .map(|(series, weight)| weight * series.get(i).copied().flatten().unwrap_or(0.0))
                .sum()
        })
        .collect();

    let smoothed = ema(&blended, ema_span.max(1));
    smoothed
        .into_iter()
        .map(|v| Some(v.clamp(0.0, 100.0)))
        .collect()
}
