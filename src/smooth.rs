// =============================================================================
// Asymmetric Step-Limited Smoother
// =============================================================================
//
// Exponential smoothing with different adaptation rates for rising and
// falling inputs, plus a hard per-step rate-of-change cap. With the default
// rates the output rises quickly toward a spiking score and bleeds off slowly
// afterwards, which keeps chart lines readable.
//
// For each raw sample x against the running value prev (initially 0):
//   rate = up_rate  if x > prev else down_rate
//   next = prev + rate * (x - prev)
//   next = clip(next, prev_output - cap_down, prev_output + cap_up)
//   next = clip(next, 0, 100)
//
// Deterministic: identical inputs and parameters always produce identical
// output.

use serde::{Deserialize, Serialize};

fn default_up_rate() -> f64 {
    0.45
}

fn default_down_rate() -> f64 {
    0.12
}

fn default_cap_up() -> f64 {
    12.0
}

fn default_cap_down() -> f64 {
    10.0
}

/// Tunable parameters of the asymmetric smoother.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmootherParams {
    /// Adaptation rate when the raw sample is above the running value.
    #[serde(default = "default_up_rate")]
    pub up_rate: f64,

    /// Adaptation rate when the raw sample is at or below the running value.
    #[serde(default = "default_down_rate")]
    pub down_rate: f64,

    /// Maximum upward move per step, in score points.
    #[serde(default = "default_cap_up")]
    pub cap_up: f64,

    /// Maximum downward move per step, in score points.
    #[serde(default = "default_cap_down")]
    pub cap_down: f64,
}

impl Default for SmootherParams {
    fn default() -> Self {
        Self {
            up_rate: default_up_rate(),
            down_rate: default_down_rate(),
            cap_up: default_cap_up(),
            cap_down: default_cap_down(),
        }
    }
}

/// Apply the asymmetric step-limited smoother to `raw`.
///
/// Missing samples contribute a raw value of 0 (no model opinion pulls the
/// smoothed line toward the floor). The running value starts at 0, so the
/// output is dense and always within [0, 100].
pub fn smooth(raw: &[Option<f64>], params: &SmootherParams) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(raw.len());
    let mut prev = 0.0_f64;

    for v in raw {
        let x = v.unwrap_or(0.0);
        let rate = if x > prev {
            params.up_rate
        } else {
            params.down_rate
        };

        let mut next = prev + rate * (x - prev);
        if let Some(&last) = out.last() {
            next = next.clamp(last - params.cap_down, last + params.cap_up);
        }
        next = next.clamp(0.0, 100.0);

        out.push(next);
        prev = next;
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rolling::some;

    #[test]
    fn smooth_is_deterministic() {
        let raw = some(&[0.0, 80.0, 90.0, 20.0, 0.0, 50.0, 100.0]);
        let p = SmootherParams::default();
        assert_eq!(smooth(&raw, &p), smooth(&raw, &p));
    }

    #[test]
    fn smooth_starts_from_zero() {
        let raw = some(&[100.0]);
        let out = smooth(&raw, &SmootherParams::default());
        // First step: 0 + 0.45 * 100 = 45, capped... no previous output to cap
        // against, then clipped to [0, 100].
        assert!((out[0] - 45.0).abs() < 1e-9);
    }

    #[test]
    fn smooth_caps_upward_steps() {
        let raw = some(&[100.0; 10]);
        let p = SmootherParams::default();
        let out = smooth(&raw, &p);
        for w in out.windows(2) {
            assert!(w[1] - w[0] <= p.cap_up + 1e-9, "upward step exceeded cap");
        }
    }

    #[test]
    fn smooth_caps_downward_steps() {
        let mut raw = some(&[100.0; 15]);
        raw.extend(some(&[0.0; 15]));
        let p = SmootherParams::default();
        let out = smooth(&raw, &p);
        for w in out.windows(2) {
            assert!(w[0] - w[1] <= p.cap_down + 1e-9, "downward step exceeded cap");
        }
    }

    #[test]
    fn smooth_rises_faster_than_it_falls() {
        let p = SmootherParams::default();
        let up = smooth(&some(&[100.0, 100.0, 100.0]), &p);
        let mut seeded = some(&[100.0; 20]);
        seeded.extend(some(&[0.0, 0.0, 0.0]));
        let down = smooth(&seeded, &p);

        let rise = up[2] - up[0];
        let n = down.len();
        let fall = down[n - 3] - down[n - 1];
        assert!(rise > fall, "expected asymmetric response (rise {rise}, fall {fall})");
    }

    #[test]
    fn smooth_output_bounded() {
        let raw = vec![Some(500.0), Some(-50.0), None, Some(100.0), Some(0.0)];
        for v in smooth(&raw, &SmootherParams::default()) {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn smooth_missing_samples_decay_toward_zero() {
        let mut raw = some(&[100.0; 20]);
        raw.extend(vec![None; 30]);
        let out = smooth(&raw, &SmootherParams::default());
        assert!(out[19] > 50.0);
        assert!(*out.last().unwrap() < 5.0, "missing tail should bleed off");
    }
}
