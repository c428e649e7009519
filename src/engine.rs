// =============================================================================
// Batch Scoring Engine
// =============================================================================
//
// Orchestrates one scoring pass: master timeline, per-symbol indicator
// frames, the ten-model bank, cross-resolution collapse for the fast-lead
// model, and the meta ensemble. Per-symbol failures are values, not
// exceptions: a symbol that cannot be fetched or scored renders as an
// explicit `Failed` outcome with all-null series of timeline length, and the
// rest of the batch is unaffected.
//
// The computation itself is synchronous and single-threaded; only the candle
// fetch at the batch boundary is async.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ScoreConfig;
use crate::frame::IndicatorFrame;
use crate::market_data::candle::closes;
use crate::market_data::{Candle, MarketDataProvider};
use crate::models::{bank, ensemble, ModelParams, MODEL_IDS};
use crate::indicators::rolling::{rolling_mean_min_periods, some};
use crate::smooth::smooth;
use crate::timeline::MasterTimeline;

/// All aligned series for one successfully scored symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolScores {
    /// Close price per bucket, `None` where no candle landed.
    pub close: Vec<Option<f64>>,
    /// Model id ("M1".."M10") to aligned score series.
    pub scores: BTreeMap<String, Vec<Option<f64>>>,
}

/// Per-symbol result: either a full set of aligned series or an isolated
/// failure that renders as all-null output of the correct shape.
#[derive(Debug, Clone)]
pub enum SymbolOutcome {
    Computed(SymbolScores),
    Failed { reason: String },
}

impl SymbolOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One complete batch: the shared timeline plus every symbol's outcome.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub timeline: MasterTimeline,
    pub outcomes: BTreeMap<String, SymbolOutcome>,
}

/// Fetch and score every configured symbol onto a timeline anchored at
/// `now`. Never fails as a whole; each symbol's trouble stays its own.
pub async fn run_batch(
    config: &ScoreConfig,
    now: DateTime<Utc>,
    provider: &dyn MarketDataProvider,
) -> BatchReport {
    let timeline = MasterTimeline::build(now, config.lookback_hours, config.step_minutes);
    info!(
        buckets = timeline.len(),
        lookback_hours = config.lookback_hours,
        step_minutes = config.step_minutes,
        "master timeline built"
    );

    let mut outcomes = BTreeMap::new();
    for symbol in &config.symbols {
        let main = match provider
            .fetch_klines(symbol, &config.main_interval(), config.main_limit())
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol, error = %e, "main candle fetch failed — isolating symbol");
                outcomes.insert(
                    symbol.clone(),
                    SymbolOutcome::Failed {
                        reason: e.to_string(),
                    },
                );
                continue;
            }
        };

        // A missing fast feed only costs the fast-lead model, not the symbol.
        let fast = match provider
            .fetch_klines(symbol, &config.fast_interval(), config.fast_limit())
            .await
        {
            Ok(candles) => Some(candles),
            Err(e) => {
                warn!(symbol, error = %e, "fast candle fetch failed — fast-lead model will be null");
                None
            }
        };

        let scores = compute_symbol(config, &timeline, symbol, &main, fast.as_deref());
        outcomes.insert(symbol.clone(), SymbolOutcome::Computed(scores));
    }

    BatchReport { timeline, outcomes }
}

/// Score one symbol's candle batches onto the shared timeline. Pure function
/// of its inputs.
pub fn compute_symbol(
    config: &ScoreConfig,
    timeline: &MasterTimeline,
    symbol: &str,
    main: &[Candle],
    fast: Option<&[Candle]>,
) -> SymbolScores {
    let main_ts: Vec<i64> = main.iter().map(|c| c.open_time).collect();
    let close = timeline.align_exact(&main_ts, &some(&closes(main)));

    let frame = IndicatorFrame::compute(main, &config.frame).drop_warmup();
    let mut scores: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();

    // --- Main-frame models (all but M3 and M10) ------------------------------
    type ModelFn = fn(&IndicatorFrame, &ModelParams) -> Vec<Option<f64>>;
    let main_models: [(&str, ModelFn); 8] = [
        ("M1", bank::m1_baseline),
        ("M2", bank::m2_z_pullback),
        ("M4", bank::m4_macd_turn),
        ("M5", bank::m5_squeeze),
        ("M6", bank::m6_pullback_uptrend),
        ("M7", bank::m7_vwap_pullback),
        ("M8", bank::m8_roc_trough),
        ("M9", bank::m9_stoch_trend),
    ];

    if frame.is_empty() {
        warn!(
            symbol,
            candles = main.len(),
            "insufficient warm-up history — main-frame models are all-null"
        );
        for (id, _) in &main_models {
            scores.insert((*id).to_string(), timeline.null_series());
        }
    } else {
        debug!(symbol, rows = frame.len(), "indicator frame ready");
        for (id, model) in &main_models {
            let mut series = model(&frame, &config.models);
            if config.smoothing.enabled {
                series = some(&smooth(&series, &config.smoothing.params));
            }
            scores.insert((*id).to_string(), timeline.align_exact(&frame.ts, &series));
        }
    }

    // --- M3: fast-resolution lead, collapsed onto the master grid ------------
    let m3 = match fast {
        Some(fast_candles) => {
            let fast_frame =
                IndicatorFrame::compute(fast_candles, &config.frame).drop_warmup();
            if fast_frame.is_empty() {
                warn!(
                    symbol,
                    candles = fast_candles.len(),
                    "insufficient fast-resolution history — fast-lead model is all-null"
                );
                timeline.null_series()
            } else {
                let mut lead = bank::m3_fast_lead(&fast_frame, &config.models);
                if config.smoothing.enabled {
                    lead = some(&smooth(&lead, &config.smoothing.params));
                }
                let collapsed = timeline.collapse_fine(&fast_frame.ts, &lead, config.collapse_k);
                rolling_mean_min_periods(&collapsed, 2, 1)
            }
        }
        None => timeline.null_series(),
    };
    scores.insert("M3".to_string(), m3);

    // --- M10: fixed-weight meta ensemble -------------------------------------
    let inputs: Vec<(&[Option<f64>], f64)> = config
        .ensemble_weights
        .iter()
        .filter_map(|(id, &w)| scores.get(id).map(|s| (s.as_slice(), w)))
        .collect();

    let all_inputs_null = inputs
        .iter()
        .all(|(series, _)| series.iter().all(Option::is_none));
    let m10 = if inputs.is_empty() || all_inputs_null {
        debug!(symbol, "ensemble inputs all null — meta model is all-null");
        timeline.null_series()
    } else {
        ensemble::combine(&inputs, config.ensemble_ema_span, timeline.len())
    };
    scores.insert("M10".to_string(), m10);

    SymbolScores { close, scores }
}

/// All-null series for every model id, used when a symbol failed outright.
pub fn null_symbol_series(timeline: &MasterTimeline) -> BTreeMap<String, Vec<Option<f64>>> {
    MODEL_IDS
        .iter()
        .map(|id| ((*id).to_string(), timeline.null_series()))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
    }

    fn test_config() -> ScoreConfig {
        let mut cfg = ScoreConfig::default();
        cfg.symbols = vec!["AAAUSDT".into(), "BBBUSDT".into(), "CCCUSDT".into()];
        cfg.lookback_hours = 48;
        cfg.step_minutes = 15;
        cfg
    }

    /// `count` candles at `step_min` spacing ending exactly on the floored
    /// `now` bucket, with close prices from `price_at`.
    fn candles_ending_at(
        now: DateTime<Utc>,
        count: usize,
        step_min: i64,
        price_at: impl Fn(usize) -> f64,
    ) -> Vec<Candle> {
        let end = crate::timeline::floor_to_step(now, step_min as u32);
        (0..count)
            .map(|i| {
                let t = end - chrono::Duration::minutes(step_min * (count - 1 - i) as i64);
                let p = price_at(i);
                Candle {
                    open_time: t.timestamp_millis(),
                    open: p,
                    high: p,
                    low: p,
                    close: p,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    // ---- Linear uptrend ----------------------------------------------------

    #[test]
    fn uptrend_never_triggers_baseline_rule() {
        let cfg = test_config();
        let now = test_now();
        let timeline = MasterTimeline::build(now, cfg.lookback_hours, cfg.step_minutes);

        // 260 synthetic 15m candles: strictly rising close, zero intraday
        // range, constant volume.
        let main = candles_ending_at(now, 260, 15, |i| 100.0 + i as f64 * 0.5);

        let frame = IndicatorFrame::compute(&main, &cfg.frame).drop_warmup();
        let last_rsi = frame.rsi.last().copied().flatten().unwrap();
        assert!(last_rsi > 95.0, "RSI should trend toward 100, got {last_rsi}");
        assert!(last_rsi <= 100.0);
        let n = frame.len();
        assert!(frame.ema_short[n - 1] > frame.ema_long[n - 1]);

        let out = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, None);
        let m1 = &out.scores["M1"];
        assert_eq!(m1.len(), timeline.len());
        assert!(m1.iter().any(Option::is_some));
        for v in m1.iter().flatten() {
            assert_eq!(*v, 0.0, "price never touches the lower band");
        }
    }

    // ---- Zero variance -----------------------------------------------------

    #[test]
    fn flat_prices_stay_finite() {
        let cfg = test_config();
        let now = test_now();
        let timeline = MasterTimeline::build(now, cfg.lookback_hours, cfg.step_minutes);

        let main = candles_ending_at(now, 50, 15, |_| 250.0);
        let out = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, None);

        let m5 = &out.scores["M5"];
        assert_eq!(m5.len(), timeline.len());
        assert!(m5.iter().any(Option::is_some), "squeeze model should have opinions");
        for v in m5.iter().flatten() {
            assert!(v.is_finite());
            assert!((0.0..=100.0).contains(v));
        }
    }

    // ---- Length and determinism properties --------------------------------

    #[test]
    fn every_series_matches_timeline_length() {
        let cfg = test_config();
        let now = test_now();
        let timeline = MasterTimeline::build(now, cfg.lookback_hours, cfg.step_minutes);

        let main = candles_ending_at(now, 400, 15, |i| 100.0 + (i as f64 * 0.21).sin() * 4.0);
        let fast = candles_ending_at(now, 800, 5, |i| 100.0 + (i as f64 * 0.13).sin() * 4.0);

        let out = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, Some(&fast));
        assert_eq!(out.close.len(), timeline.len());
        assert_eq!(out.scores.len(), MODEL_IDS.len());
        for id in MODEL_IDS {
            assert_eq!(out.scores[id].len(), timeline.len(), "length mismatch for {id}");
        }
    }

    #[test]
    fn compute_symbol_is_deterministic() {
        let cfg = test_config();
        let now = test_now();
        let timeline = MasterTimeline::build(now, cfg.lookback_hours, cfg.step_minutes);
        let main = candles_ending_at(now, 300, 15, |i| 100.0 + (i as f64 * 0.17).sin() * 5.0);
        let fast = candles_ending_at(now, 700, 5, |i| 100.0 + (i as f64 * 0.11).sin() * 5.0);

        let a = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, Some(&fast));
        let b = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, Some(&fast));
        assert_eq!(a, b);
    }

    #[test]
    fn insufficient_history_yields_all_null_models() {
        let cfg = test_config();
        let now = test_now();
        let timeline = MasterTimeline::build(now, cfg.lookback_hours, cfg.step_minutes);

        // Far fewer candles than any rolling window needs.
        let main = candles_ending_at(now, 5, 15, |i| 100.0 + i as f64);
        let out = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, None);

        for id in MODEL_IDS {
            assert_eq!(out.scores[id].len(), timeline.len());
            assert!(
                out.scores[id].iter().all(Option::is_none),
                "{id} should be all-null on insufficient data"
            );
        }
        // The raw close prices still align — they need no warm-up.
        assert!(out.close.iter().any(Option::is_some));
    }

    #[test]
    fn fast_lead_collapses_onto_timeline() {
        let cfg = test_config();
        let now = test_now();
        let timeline = MasterTimeline::build(now, cfg.lookback_hours, cfg.step_minutes);
        let main = candles_ending_at(now, 400, 15, |i| 100.0 + (i as f64 * 0.21).sin() * 4.0);
        let fast = candles_ending_at(now, 800, 5, |i| 100.0 + (i as f64 * 0.13).sin() * 4.0);

        let out = compute_symbol(&cfg, &timeline, "AAAUSDT", &main, Some(&fast));
        let m3 = &out.scores["M3"];
        assert!(m3.iter().any(Option::is_some));
        for v in m3.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    // ---- Per-symbol failure isolation -------------------------------------

    struct MockProvider {
        data: HashMap<(String, String), Vec<Candle>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn fetch_klines(
            &self,
            symbol: &str,
            interval: &str,
            _limit: u32,
        ) -> Result<Vec<Candle>> {
            if self.failing.iter().any(|s| s == symbol) {
                return Err(anyhow!("simulated provider outage for {symbol}"));
            }
            self.data
                .get(&(symbol.to_string(), interval.to_string()))
                .cloned()
                .ok_or_else(|| anyhow!("no mock data for {symbol}@{interval}"))
        }
    }

    #[tokio::test]
    async fn failed_symbol_is_isolated() {
        let cfg = test_config();
        let now = test_now();

        let mut data = HashMap::new();
        for symbol in ["AAAUSDT", "CCCUSDT"] {
            data.insert(
                (symbol.to_string(), cfg.main_interval()),
                candles_ending_at(now, 400, 15, |i| 100.0 + (i as f64 * 0.21).sin() * 4.0),
            );
            data.insert(
                (symbol.to_string(), cfg.fast_interval()),
                candles_ending_at(now, 800, 5, |i| 100.0 + (i as f64 * 0.13).sin() * 4.0),
            );
        }
        let provider = MockProvider {
            data,
            failing: vec!["BBBUSDT".to_string()],
        };

        let report = run_batch(&cfg, now, &provider).await;
        assert_eq!(report.outcomes.len(), 3);

        match &report.outcomes["BBBUSDT"] {
            SymbolOutcome::Failed { reason } => {
                assert!(reason.contains("simulated provider outage"));
            }
            SymbolOutcome::Computed(_) => panic!("failed symbol must not compute"),
        }

        for symbol in ["AAAUSDT", "CCCUSDT"] {
            match &report.outcomes[symbol] {
                SymbolOutcome::Computed(s) => {
                    assert!(s.close.iter().any(Option::is_some));
                    assert!(s.scores["M10"].iter().any(Option::is_some));
                    for id in MODEL_IDS {
                        assert_eq!(s.scores[id].len(), report.timeline.len());
                    }
                }
                SymbolOutcome::Failed { reason } => {
                    panic!("{symbol} unexpectedly failed: {reason}")
                }
            }
        }
    }

    #[tokio::test]
    async fn missing_fast_feed_only_nulls_fast_lead() {
        let mut cfg = test_config();
        cfg.symbols = vec!["AAAUSDT".to_string()];
        let now = test_now();

        // Main data present, fast interval entirely absent from the mock.
        let mut data = HashMap::new();
        data.insert(
            ("AAAUSDT".to_string(), cfg.main_interval()),
            candles_ending_at(now, 400, 15, |i| 100.0 + (i as f64 * 0.21).sin() * 4.0),
        );
        let provider = MockProvider {
            data,
            failing: vec![],
        };

        let report = run_batch(&cfg, now, &provider).await;
        match &report.outcomes["AAAUSDT"] {
            SymbolOutcome::Computed(s) => {
                assert!(s.scores["M3"].iter().all(Option::is_none));
                assert!(s.scores["M2"].iter().any(Option::is_some));
            }
            SymbolOutcome::Failed { reason } => panic!("unexpected failure: {reason}"),
        }
    }
}
