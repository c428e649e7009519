// =============================================================================
// Batch Report — JSON artifact for the rendering/persistence collaborator
// =============================================================================
//
// Serialises one batch into the document the chart page consumes:
//   labels               — master timeline as ISO-8601 UTC strings
//   symbols[sym].close   — close price aligned to the timeline
//   models[sym][Mx]      — per-model score series (nulls permitted)
//   meta                 — update instant, window, model descriptions,
//                          per-symbol failure reasons
//
// Failed symbols render as all-null series of timeline length; their reason
// strings are aggregated in the meta block instead of aborting the batch.
// Writing uses the atomic tmp + rename pattern.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScoreConfig;
use crate::engine::{null_symbol_series, BatchReport, SymbolOutcome};
use crate::models::model_descriptions;

/// Close-price block for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolBlock {
    pub close: Vec<Option<f64>>,
}

/// Report-wide metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub updated_utc: String,
    pub hours: u32,
    pub timeframe: String,
    pub model_descriptions: BTreeMap<String, String>,
    /// Symbol to failure reason, empty when the whole batch scored cleanly.
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
}

/// The complete output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub labels: Vec<String>,
    pub symbols: BTreeMap<String, SymbolBlock>,
    pub models: BTreeMap<String, BTreeMap<String, Vec<Option<f64>>>>,
    pub meta: ReportMeta,
}

impl ScoreReport {
    /// Render a finished batch into the output document.
    pub fn from_batch(batch: &BatchReport, config: &ScoreConfig, now: DateTime<Utc>) -> Self {
        let mut symbols = BTreeMap::new();
        let mut models = BTreeMap::new();
        let mut failures = BTreeMap::new();

        for (symbol, outcome) in &batch.outcomes {
            match outcome {
                SymbolOutcome::Computed(scores) => {
                    symbols.insert(
                        symbol.clone(),
                        SymbolBlock {
                            close: scores.close.clone(),
                        },
                    );
                    models.insert(symbol.clone(), scores.scores.clone());
                }
                SymbolOutcome::Failed { reason } => {
                    symbols.insert(
                        symbol.clone(),
                        SymbolBlock {
                            close: batch.timeline.null_series(),
                        },
                    );
                    models.insert(symbol.clone(), null_symbol_series(&batch.timeline));
                    failures.insert(symbol.clone(), reason.clone());
                }
            }
        }

        Self {
            labels: batch.timeline.labels(),
            symbols,
            models,
            meta: ReportMeta {
                updated_utc: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                hours: config.lookback_hours,
                timeframe: config.main_interval(),
                model_descriptions: model_descriptions()
                    .into_iter()
                    .map(|(id, desc)| (id.to_string(), desc.to_string()))
                    .collect(),
                failures,
            },
        }
    }

    /// Write the report as JSON to `path` (atomic tmp + rename), creating
    /// parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory {}", parent.display())
                })?;
            }
        }

        let content = serde_json::to_string(self).context("failed to serialise batch report")?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp report to {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp report to {}", path.display()))?;

        info!(path = %path.display(), symbols = self.symbols.len(), "batch report saved (atomic)");
        Ok(())
    }
}
