// =============================================================================
// Model Bank
// =============================================================================
//
// Ten independent buy-signal scoring models, M1..M10. M1–M9 are pure
// functions of an indicator frame (M3 of the finer-resolution frame); M10 is
// the fixed-weight ensemble blend of M2/M3/M4/M6/M8. Every model emits a
// series in [0, 100] with `None` where it has no opinion.

pub mod bank;
pub mod ensemble;

use serde::{Deserialize, Serialize};

/// Model identifiers in reporting order.
pub const MODEL_IDS: [&str; 10] = [
    "M1", "M2", "M3", "M4", "M5", "M6", "M7", "M8", "M9", "M10",
];

/// Human-readable one-liners for the report's meta block.
pub fn model_descriptions() -> Vec<(&'static str, &'static str)> {
    vec![
        ("M1", "Baseline rule (EMA20>EMA50, touches lower BB, RSI<35, MACD turn)"),
        ("M2", "Z-pullback: -zscore((EMA20-EMA50)/ATR) normalized"),
        ("M3", "Fast lead: finer-resolution oversold composite collapsed onto the master grid"),
        ("M4", "MACD histogram upswing from negative (impulse turn)"),
        ("M5", "Squeeze start: rising BB width from low while below mid"),
        ("M6", "Pullback-in-uptrend: price near EMA20/50 in EMA200 uptrend"),
        ("M7", "VWAP pullback (session anchored) in positive drift"),
        ("M8", "ROC trough turning up (deceleration)"),
        ("M9", "StochRSI K up from oversold (trend-gated)"),
        ("M10", "Ensemble meta: 0.25*M2+0.10*M3+0.25*M4+0.20*M6+0.20*M8, EMA smooth"),
    ]
}

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_rsi_oversold() -> f64 {
    35.0
}

fn default_rsi_deep_oversold() -> f64 {
    30.0
}

fn default_tier_score() -> f64 {
    80.0
}

fn default_deep_tier_score() -> f64 {
    90.0
}

fn default_z_lo() -> f64 {
    -2.0
}

fn default_z_hi() -> f64 {
    2.0
}

fn default_quantile_lo() -> f64 {
    0.05
}

fn default_quantile_hi() -> f64 {
    0.95
}

/// Tunable thresholds shared by the scoring models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParams {
    /// RSI threshold below which the baseline rule considers price oversold.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// Deeper RSI threshold that upgrades the baseline score tier.
    #[serde(default = "default_rsi_deep_oversold")]
    pub rsi_deep_oversold: f64,

    /// Baseline score when all entry conditions hold.
    #[serde(default = "default_tier_score")]
    pub tier_score: f64,

    /// Baseline score when RSI is additionally below the deep threshold.
    #[serde(default = "default_deep_tier_score")]
    pub deep_tier_score: f64,

    /// Fixed lower bound for the z-pullback scaling.
    #[serde(default = "default_z_lo")]
    pub z_lo: f64,

    /// Fixed upper bound for the z-pullback scaling.
    #[serde(default = "default_z_hi")]
    pub z_hi: f64,

    /// Lower quantile level for robust score scaling.
    #[serde(default = "default_quantile_lo")]
    pub quantile_lo: f64,

    /// Upper quantile level for robust score scaling.
    #[serde(default = "default_quantile_hi")]
    pub quantile_hi: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            rsi_oversold: default_rsi_oversold(),
            rsi_deep_oversold: default_rsi_deep_oversold(),
            tier_score: default_tier_score(),
            deep_tier_score: default_deep_tier_score(),
            z_lo: default_z_lo(),
            z_hi: default_z_hi(),
            quantile_lo: default_quantile_lo(),
            quantile_hi: default_quantile_hi(),
        }
    }
}
