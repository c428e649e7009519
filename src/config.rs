// =============================================================================
// Score Configuration — engine settings with atomic save
// =============================================================================
//
// Every tunable parameter of the scoring pipeline lives here: symbol list,
// timeline geometry, indicator windows, model thresholds, ensemble weights,
// and the smoother profile. All fields carry `#[serde(default)]` so adding
// new fields never breaks loading an older config file; persistence uses the
// tmp + rename pattern to prevent corruption on crash.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::frame::FrameParams;
use crate::models::ensemble::default_weights;
use crate::models::ModelParams;
use crate::smooth::SmootherParams;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec![
        "BTCUSDT".to_string(),
        "ETHUSDT".to_string(),
        "ONDOUSDT".to_string(),
    ]
}

fn default_lookback_hours() -> u32 {
    48
}

fn default_step_minutes() -> u32 {
    15
}

fn default_fast_step_minutes() -> u32 {
    5
}

fn default_warmup_main() -> u32 {
    200
}

fn default_warmup_fast() -> u32 {
    150
}

fn default_collapse_k() -> usize {
    3
}

fn default_ensemble_ema_span() -> usize {
    3
}

fn default_output_path() -> String {
    "docs/data.json".to_string()
}

// =============================================================================
// SmoothingConfig
// =============================================================================

/// Optional asymmetric smoothing pass applied to each model's scaled series
/// before alignment. Off by default: the models carry their own short
/// trailing means, matching the ten-model scoring profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub params: SmootherParams,
}

// =============================================================================
// ScoreConfig
// =============================================================================

/// Top-level configuration for the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    // --- Symbols & timeline geometry -----------------------------------------

    /// Symbols to score each batch.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Master timeline span in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,

    /// Master timeline step in minutes; also the main candle resolution.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,

    /// Finer candle resolution feeding the fast-lead model.
    #[serde(default = "default_fast_step_minutes")]
    pub fast_step_minutes: u32,

    /// Extra leading candles fetched beyond the lookback window so the
    /// longest rolling window is satisfied before the window starts.
    #[serde(default = "default_warmup_main")]
    pub warmup_main: u32,

    /// Extra leading fast-resolution candles, same purpose.
    #[serde(default = "default_warmup_fast")]
    pub warmup_fast: u32,

    /// How many fast samples are averaged per bucket ("last K as-of the
    /// bucket boundary").
    #[serde(default = "default_collapse_k")]
    pub collapse_k: usize,

    // --- Pipeline parameters -------------------------------------------------

    /// Indicator window sizes for both frames.
    #[serde(default)]
    pub frame: FrameParams,

    /// Scoring model thresholds and scaling bounds.
    #[serde(default)]
    pub models: ModelParams,

    /// Meta-model weight per model id; weights conventionally sum to 1.
    #[serde(default = "default_weights")]
    pub ensemble_weights: HashMap<String, f64>,

    /// EMA span for the ensemble's smoothing pass.
    #[serde(default = "default_ensemble_ema_span")]
    pub ensemble_ema_span: usize,

    /// Optional asymmetric smoother applied before alignment.
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    // --- Output --------------------------------------------------------------

    /// Where the batch report JSON is written.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            lookback_hours: default_lookback_hours(),
            step_minutes: default_step_minutes(),
            fast_step_minutes: default_fast_step_minutes(),
            warmup_main: default_warmup_main(),
            warmup_fast: default_warmup_fast(),
            collapse_k: default_collapse_k(),
            frame: FrameParams::default(),
            models: ModelParams::default(),
            ensemble_weights: default_weights(),
            ensemble_ema_span: default_ensemble_ema_span(),
            smoothing: SmoothingConfig::default(),
            output_path: default_output_path(),
        }
    }
}

impl ScoreConfig {
    /// Exchange interval string for the main resolution, e.g. "15m".
    pub fn main_interval(&self) -> String {
        format!("{}m", self.step_minutes)
    }

    /// Exchange interval string for the fast resolution, e.g. "5m".
    pub fn fast_interval(&self) -> String {
        format!("{}m", self.fast_step_minutes)
    }

    /// Candle count covering lookback plus warm-up at the main resolution.
    pub fn main_limit(&self) -> u32 {
        self.lookback_hours * 60 / self.step_minutes.max(1) + self.warmup_main
    }

    /// Candle count covering lookback plus warm-up at the fast resolution.
    pub fn fast_limit(&self) -> u32 {
        self.lookback_hours * 60 / self.fast_step_minutes.max(1) + self.warmup_fast
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read score config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse score config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            lookback_hours = config.lookback_hours,
            "score config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise score config")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "score config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ScoreConfig::default();
        assert_eq!(cfg.symbols.len(), 3);
        assert_eq!(cfg.symbols[0], "BTCUSDT");
        assert_eq!(cfg.lookback_hours, 48);
        assert_eq!(cfg.step_minutes, 15);
        assert_eq!(cfg.fast_step_minutes, 5);
        assert_eq!(cfg.collapse_k, 3);
        assert_eq!(cfg.ensemble_ema_span, 3);
        assert!(!cfg.smoothing.enabled);
        assert_eq!(cfg.main_interval(), "15m");
        assert_eq!(cfg.fast_interval(), "5m");
    }

    #[test]
    fn limits_cover_lookback_plus_warmup() {
        let cfg = ScoreConfig::default();
        assert_eq!(cfg.main_limit(), 48 * 4 + 200);
        assert_eq!(cfg.fast_limit(), 48 * 12 + 150);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ScoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.symbols, ScoreConfig::default().symbols);
        assert_eq!(cfg.lookback_hours, 48);
        assert!((cfg.models.rsi_oversold - 35.0).abs() < f64::EPSILON);
        assert_eq!(cfg.frame.ema_trend, 200);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "symbols": ["ETHUSDT"], "lookback_hours": 12 }"#;
        let cfg: ScoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.symbols, vec!["ETHUSDT"]);
        assert_eq!(cfg.lookback_hours, 12);
        assert_eq!(cfg.step_minutes, 15);
        assert_eq!(cfg.frame.bb_length, 20);
    }

    #[test]
    fn ensemble_weights_default_to_meta_vector() {
        let cfg: ScoreConfig = serde_json::from_str("{}").unwrap();
        assert!((cfg.ensemble_weights["M2"] - 0.25).abs() < 1e-12);
        assert!((cfg.ensemble_weights["M3"] - 0.10).abs() < 1e-12);
        let total: f64 = cfg.ensemble_weights.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = ScoreConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: ScoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.symbols, cfg2.symbols);
        assert_eq!(cfg.step_minutes, cfg2.step_minutes);
        assert_eq!(cfg.output_path, cfg2.output_path);
    }
}
