// =============================================================================
// Scoring Models M1–M9
// =============================================================================
//
// Each model is a pure function: indicator frame in, raw 0–100 score series
// out, one slot per frame row. `None` marks rows where the model has no
// opinion (e.g. a first-difference is undefined); every populated value is
// finite and epsilon-guarded at each division.
//
// M1 is tiered/binary; the rest map a continuous signal through the robust
// scaler. The short trailing means on M3/M5/M7/M8/M9 knock down single-bar
// spikes before alignment.

use crate::frame::IndicatorFrame;
use crate::indicators::rolling::{diff, diff_dense, rolling_mean_min_periods};
use crate::models::ModelParams;
use crate::scale::{scale01_q, EPS};

/// M1 — baseline rule.
///
/// Scores `tier_score` when all four conditions hold simultaneously:
/// short EMA above long EMA, close at or below the lower Bollinger band,
/// RSI oversold, and the MACD histogram rising while still negative.
/// A deeper RSI reading upgrades the score to `deep_tier_score`.
pub fn m1_baseline(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let dh = diff_dense(&frame.macd_hist);

    (0..frame.len())
        .map(|i| match (frame.bb_low[i], frame.rsi[i]) {
            (Some(band_low), Some(rsi)) => {
                let uptrend = frame.ema_short[i] > frame.ema_long[i];
                let touch = frame.close[i] <= band_low;
                let turning = dh[i].is_some_and(|d| d > 0.0) && frame.macd_hist[i] < 0.0;

                let score = if uptrend && touch && rsi < params.rsi_oversold && turning {
                    if rsi < params.rsi_deep_oversold {
                        params.deep_tier_score
                    } else {
                        params.tier_score
                    }
                } else {
                    0.0
                };
                Some(score)
            }
            _ => None,
        })
        .collect()
}

/// M2 — trend-normalized pullback.
///
/// Sign-inverted z-score of (short EMA - long EMA) normalized by ATR, scaled
/// against fixed bounds so a deep pullback inside an uptrend reads high.
pub fn m2_z_pullback(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let neg_z: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            frame.atr[i].map(|atr| {
                let z = (frame.ema_short[i] - frame.ema_long[i]) / (atr + EPS);
                -z
            })
        })
        .collect();

    scale01_q(
        &neg_z,
        Some(params.z_lo),
        Some(params.z_hi),
        params.quantile_lo,
        params.quantile_hi,
    )
}

/// M3 — fast-resolution oversold composite (computed on the finer frame).
///
/// Weighted blend of inverted stochastic-RSI K, inverted short RSI, and the
/// scaled distance below the long EMA: 40 % + 40 % + 20 %. Missing terms
/// contribute 0 so a single unpopulated column cannot blank the row. The
/// caller collapses this series onto the master timeline.
pub fn m3_fast_lead(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let pull: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            let anchor = frame.ema_long[i];
            if anchor.abs() < EPS {
                Some(0.0)
            } else {
                Some((frame.close[i] / anchor - 1.0) * -100.0)
            }
        })
        .collect();
    let pull_scaled = scale01_q(&pull, None, None, params.quantile_lo, params.quantile_hi);

    (0..frame.len())
        .map(|i| {
            let k_term = frame.stoch_k[i].map_or(0.0, |k| (1.0 - k) * 40.0);
            let rsi_term = frame.rsi_fast[i].map_or(0.0, |r| (1.0 - r / 100.0) * 40.0);
            let pull_term = pull_scaled[i].map_or(0.0, |p| p * 0.20);
            Some((k_term + rsi_term + pull_term).clamp(0.0, 100.0))
        })
        .collect()
}

/// M4 — MACD-turn impulse.
///
/// Scaled magnitude of the histogram's upward first difference, gated to
/// rows where the histogram is still negative (early reversal impulse).
pub fn m4_macd_turn(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let dh = diff_dense(&frame.macd_hist);

    let signal: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            if frame.macd_hist[i] < 0.0 {
                dh[i].map(|d| d.max(0.0))
            } else {
                Some(0.0)
            }
        })
        .collect();

    scale01_q(&signal, None, None, params.quantile_lo, params.quantile_hi)
}

/// M5 — squeeze detection.
///
/// High when normalized Bollinger bandwidth is low and/or expanding while
/// price holds below the midline. Two-row trailing mean smooths the output.
pub fn m5_squeeze(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let bandwidth: Vec<Option<f64>> = (0..frame.len())
        .map(|i| match (frame.bb_width[i], frame.bb_mid[i]) {
            (Some(w), Some(mid)) => {
                if mid.abs() < EPS {
                    Some(0.0)
                } else {
                    Some(w / mid)
                }
            }
            _ => None,
        })
        .collect();
    let slope = diff(&bandwidth);

    let neg_bw: Vec<Option<f64>> = bandwidth.iter().map(|v| v.map(|b| -b)).collect();
    let tight = scale01_q(&neg_bw, None, None, params.quantile_lo, params.quantile_hi);
    let expanding = scale01_q(&slope, None, None, params.quantile_lo, params.quantile_hi);

    let raw: Vec<Option<f64>> = (0..frame.len())
        .map(|i| match (tight[i], expanding[i], frame.bb_mid[i]) {
            (Some(t), Some(e), Some(mid)) => {
                let below_mid = if frame.close[i] < mid { 1.0 } else { 0.0 };
                Some(((0.4 * t + 0.6 * e) * below_mid).clamp(0.0, 100.0))
            }
            _ => None,
        })
        .collect();

    rolling_mean_min_periods(&raw, 2, 1)
}

/// M6 — pullback-in-uptrend.
///
/// Scaled closeness of price to the short/long EMA pair, gated to a
/// longer-term uptrend (long EMA above trend EMA).
pub fn m6_pullback_uptrend(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let closeness: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            let dist = (frame.close[i] - frame.ema_short[i]).abs()
                + (frame.close[i] - frame.ema_long[i]).abs();
            Some(-dist)
        })
        .collect();
    let scaled = scale01_q(&closeness, None, None, params.quantile_lo, params.quantile_hi);

    (0..frame.len())
        .map(|i| {
            scaled[i].map(|s| {
                if frame.ema_long[i] > frame.ema_trend[i] {
                    s
                } else {
                    0.0
                }
            })
        })
        .collect()
}

/// M7 — VWAP pullback with drift.
///
/// Scaled gap below the session VWAP, weighted by the unit-scaled
/// non-negative slope of the drift EMA. Three-row trailing mean.
pub fn m7_vwap_pullback(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let gap: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            if frame.close[i].abs() < EPS {
                Some(0.0)
            } else {
                Some((frame.vwap[i] - frame.close[i]) / frame.close[i])
            }
        })
        .collect();

    let drift: Vec<Option<f64>> = diff_dense(&frame.ema_drift)
        .iter()
        .map(|v| v.map(|d| d.max(0.0)))
        .collect();

    let gap_scaled = scale01_q(&gap, None, None, params.quantile_lo, params.quantile_hi);
    let drift_scaled = scale01_q(&drift, None, None, params.quantile_lo, params.quantile_hi);

    let raw: Vec<Option<f64>> = (0..frame.len())
        .map(|i| match (gap_scaled[i], drift_scaled[i]) {
            (Some(g), Some(d)) => Some((g * d / 100.0).clamp(0.0, 100.0)),
            _ => None,
        })
        .collect();

    rolling_mean_min_periods(&raw, 3, 1)
}

/// M8 — deceleration detection.
///
/// Magnitude of negative rate-of-change, gated to rows where ROC is turning
/// upward (trough formation), scaled and smoothed over two rows.
pub fn m8_roc_trough(frame: &IndicatorFrame, params: &ModelParams) -> Vec<Option<f64>> {
    let d_roc = diff(&frame.roc);

    let raw: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            frame.roc[i].map(|r| {
                let rising = d_roc[i].is_some_and(|d| d > 0.0);
                if rising {
                    (-r).max(0.0)
                } else {
                    0.0
                }
            })
        })
        .collect();

    let scaled = scale01_q(&raw, None, None, params.quantile_lo, params.quantile_hi);
    rolling_mean_min_periods(&scaled, 2, 1)
}

/// M9 — trend-gated stochastic RSI.
///
/// Inverted stochastic-RSI K mapped to 0–100, gated to the long/trend EMA
/// uptrend filter, smoothed over three rows.
pub fn m9_stoch_trend(frame: &IndicatorFrame, _params: &ModelParams) -> Vec<Option<f64>> {
    let raw: Vec<Option<f64>> = (0..frame.len())
        .map(|i| {
            frame.stoch_k[i].map(|k| {
                if frame.ema_long[i] > frame.ema_trend[i] {
                    ((1.0 - k) * 100.0).clamp(0.0, 100.0)
                } else {
                    0.0
                }
            })
        })
        .collect();

    rolling_mean_min_periods(&raw, 3, 1)
}
