// =============================================================================
// Robust 0–100 Scaler
// =============================================================================
//
// Maps an arbitrary real-valued series onto [0, 100] using robust quantile
// bounds: when no explicit bounds are supplied, lo/hi default to the 5th and
// 95th percentiles of the input itself. The denominator carries an epsilon so
// a zero-variance series (hi == lo) resolves to a finite constant instead of
// dividing by zero.
//
// The empirical quantiles consider the whole supplied series at once; callers
// needing causal behavior must pre-restrict the input themselves.

/// Shared epsilon for all division guards in the engine.
pub const EPS: f64 = 1e-12;

/// Linearly interpolated quantile `q` in [0, 1] of `values`.
///
/// Returns `None` for an empty input. Mirrors the conventional "linear"
/// interpolation scheme: index = q * (n - 1).
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo_idx = pos.floor() as usize;
    let hi_idx = pos.ceil() as usize;
    let frac = pos - lo_idx as f64;

    Some(sorted[lo_idx] + (sorted[hi_idx] - sorted[lo_idx]) * frac)
}

/// Scale `values` onto [0, 100] with robust default bounds at the 5th and
/// 95th percentiles.
///
/// Missing and non-finite entries pass through as `None`; they do not
/// participate in the quantile estimate.
pub fn scale01(values: &[Option<f64>], lo: Option<f64>, hi: Option<f64>) -> Vec<Option<f64>> {
    scale01_q(values, lo, hi, 0.05, 0.95)
}

/// `scale01` with explicit quantile levels for the default bounds.
pub fn scale01_q(
    values: &[Option<f64>],
    lo: Option<f64>,
    hi: Option<f64>,
    q_lo: f64,
    q_hi: f64,
) -> Vec<Option<f64>> {
    let finite: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    let lo = lo.or_else(|| quantile(&finite, q_lo));
    let hi = hi.or_else(|| quantile(&finite, q_hi));

    let (lo, hi) = match (lo, hi) {
        (Some(lo), Some(hi)) => (lo, hi),
        // No data to estimate bounds from: nothing to scale.
        _ => return vec![None; values.len()],
    };

    values
        .iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => {
                let y = ((x - lo) / (hi - lo + EPS)).clamp(0.0, 1.0) * 100.0;
                y.is_finite().then_some(y)
            }
            _ => None,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rolling::some;

    #[test]
    fn quantile_of_empty_is_none() {
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = vec![0.0, 10.0];
        assert!((quantile(&v, 0.5).unwrap() - 5.0).abs() < 1e-12);
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile(&v, 0.25).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn scale01_output_bounded() {
        let values = some(&[-500.0, -1.0, 0.0, 1.0, 2.0, 3.0, 1000.0]);
        for v in scale01(&values, None, None).iter().flatten() {
            assert!((0.0..=100.0).contains(v), "{v} out of [0, 100]");
        }
    }

    #[test]
    fn scale01_constant_input_is_finite() {
        // Zero variance: lo == hi, epsilon guard resolves every row to 0.
        let values = some(&[7.0; 40]);
        let out = scale01(&values, None, None);
        for v in &out {
            let v = v.unwrap();
            assert!(v.is_finite());
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn scale01_explicit_bounds() {
        let values = some(&[-2.0, 0.0, 2.0]);
        let out = scale01(&values, Some(-2.0), Some(2.0));
        assert!((out[0].unwrap() - 0.0).abs() < 1e-6);
        assert!((out[1].unwrap() - 50.0).abs() < 1e-6);
        assert!((out[2].unwrap() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn scale01_clips_outside_bounds() {
        let values = some(&[-10.0, 10.0]);
        let out = scale01(&values, Some(0.0), Some(1.0));
        assert!((out[0].unwrap() - 0.0).abs() < 1e-9);
        assert!((out[1].unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn scale01_preserves_missing_rows() {
        let values = vec![None, Some(1.0), Some(2.0), None, Some(3.0)];
        let out = scale01(&values, None, None);
        assert_eq!(out[0], None);
        assert_eq!(out[3], None);
        assert!(out[1].is_some());
    }

    #[test]
    fn scale01_all_missing_is_all_none() {
        let values = vec![None, None, None];
        assert_eq!(scale01(&values, None, None), vec![None, None, None]);
    }
}
