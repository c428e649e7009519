// =============================================================================
// Meridian Score — Main Entry Point
// =============================================================================
//
// One batch per run: fetch candles, score every configured symbol onto the
// master timeline, write the report JSON. Scheduling repeated runs is the
// caller's job (cron, systemd timer, CI).
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod binance;
mod config;
mod engine;
mod frame;
mod indicators;
mod market_data;
mod models;
mod report;
mod scale;
mod smooth;
mod timeline;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::binance::BinanceClient;
use crate::config::ScoreConfig;
use crate::report::ScoreReport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Meridian Score — multi-model buy-score batch starting");

    let mut config = ScoreConfig::load("score_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ScoreConfig::default()
    });

    // Override symbols from env if available.
    if let Ok(syms) = std::env::var("MERIDIAN_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if config.symbols.is_empty() {
        config.symbols = vec![
            "BTCUSDT".into(),
            "ETHUSDT".into(),
            "ONDOUSDT".into(),
        ];
    }

    info!(
        symbols = ?config.symbols,
        lookback_hours = config.lookback_hours,
        timeframe = %config.main_interval(),
        "Scoring configured symbols"
    );

    // ── 2. Fetch & score ─────────────────────────────────────────────────
    let client = BinanceClient::new();
    let now = Utc::now();
    let batch = engine::run_batch(&config, now, &client).await;

    let failed = batch.outcomes.values().filter(|o| o.is_failed()).count();
    if failed > 0 {
        warn!(failed, total = batch.outcomes.len(), "some symbols failed and were isolated");
    }

    // ── 3. Write the report ──────────────────────────────────────────────
    let report = ScoreReport::from_batch(&batch, &config, now);
    report.save(&config.output_path)?;

    info!(
        path = %config.output_path,
        symbols = batch.outcomes.len(),
        buckets = batch.timeline.len(),
        failed,
        "batch report written"
    );

    Ok(())
}
