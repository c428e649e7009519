// =============================================================================
// Indicator Frame — fixed-shape indicator table over a candle batch
// =============================================================================
//
// One row per candle plus statically-typed derived columns. Recursive
// indicators (EMAs, MACD, VWAP) are dense; rolling ones carry `None` through
// their warm-up. `drop_warmup` trims leading rows until every required
// column is populated, so the model bank can assume a fully-formed table.

use serde::{Deserialize, Serialize};

use crate::indicators::atr::atr;
use crate::indicators::bollinger::bollinger;
use crate::indicators::ema::ema;
use crate::indicators::macd::macd;
use crate::indicators::roc::roc;
use crate::indicators::rsi::rsi;
use crate::indicators::stoch_rsi::stoch_rsi;
use crate::indicators::vwap::session_vwap;
use crate::market_data::Candle;
use crate::scale::EPS;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ema_short() -> usize {
    20
}

fn default_ema_long() -> usize {
    50
}

fn default_ema_trend() -> usize {
    200
}

fn default_ema_drift() -> usize {
    100
}

fn default_bb_length() -> usize {
    20
}

fn default_bb_k() -> f64 {
    2.0
}

fn default_rsi_length() -> usize {
    14
}

fn default_rsi_fast_length() -> usize {
    7
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_roc_length() -> usize {
    5
}

fn default_stoch_length() -> usize {
    14
}

fn default_stoch_k() -> usize {
    3
}

fn default_stoch_d() -> usize {
    3
}

fn default_atr_length() -> usize {
    14
}

/// Window sizes for every derived column in the frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameParams {
    #[serde(default = "default_ema_short")]
    pub ema_short: usize,
    #[serde(default = "default_ema_long")]
    pub ema_long: usize,
    #[serde(default = "default_ema_trend")]
    pub ema_trend: usize,
    #[serde(default = "default_ema_drift")]
    pub ema_drift: usize,
    #[serde(default = "default_bb_length")]
    pub bb_length: usize,
    #[serde(default = "default_bb_k")]
    pub bb_k: f64,
    #[serde(default = "default_rsi_length")]
    pub rsi_length: usize,
    #[serde(default = "default_rsi_fast_length")]
    pub rsi_fast_length: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    #[serde(default = "default_roc_length")]
    pub roc_length: usize,
    #[serde(default = "default_stoch_length")]
    pub stoch_length: usize,
    #[serde(default = "default_stoch_k")]
    pub stoch_k: usize,
    #[serde(default = "default_stoch_d")]
    pub stoch_d: usize,
    #[serde(default = "default_atr_length")]
    pub atr_length: usize,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            ema_short: default_ema_short(),
            ema_long: default_ema_long(),
            ema_trend: default_ema_trend(),
            ema_drift: default_ema_drift(),
            bb_length: default_bb_length(),
            bb_k: default_bb_k(),
            rsi_length: default_rsi_length(),
            rsi_fast_length: default_rsi_fast_length(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            roc_length: default_roc_length(),
            stoch_length: default_stoch_length(),
            stoch_k: default_stoch_k(),
            stoch_d: default_stoch_d(),
            atr_length: default_atr_length(),
        }
    }
}

// =============================================================================
// IndicatorFrame
// =============================================================================

/// Candle batch augmented with every indicator column the model bank reads.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    /// Candle open times in epoch milliseconds.
    pub ts: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,

    pub ema_short: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub ema_trend: Vec<f64>,
    pub ema_drift: Vec<f64>,

    pub atr: Vec<Option<f64>>,
    pub bb_low: Vec<Option<f64>>,
    pub bb_mid: Vec<Option<f64>>,
    pub bb_high: Vec<Option<f64>>,
    pub bb_width: Vec<Option<f64>>,
    /// %B position inside the bands, epsilon-guarded so flat bands give 0.
    pub pct_b: Vec<Option<f64>>,

    pub rsi: Vec<Option<f64>>,
    /// Shorter RSI used by the fast-resolution lead model.
    pub rsi_fast: Vec<Option<f64>>,

    pub macd_line: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_hist: Vec<f64>,

    pub roc: Vec<Option<f64>>,
    pub stoch_k: Vec<Option<f64>>,
    pub stoch_d: Vec<Option<f64>>,

    pub vwap: Vec<f64>,
}

impl IndicatorFrame {
    /// Compute every derived column for `candles` (oldest first).
    pub fn compute(candles: &[Candle], params: &FrameParams) -> Self {
        let n = candles.len();
        let close: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let bands = bollinger(&close, params.bb_length, params.bb_k);
        let pct_b: Vec<Option<f64>> = (0..n)
            .map(|i| match (bands.low[i], bands.high[i]) {
                (Some(lo), Some(hi)) => {
                    let v = (close[i] - lo) / ((hi - lo) + EPS);
                    v.is_finite().then_some(v)
                }
                _ => None,
            })
            .collect();

        let macd_series = macd(
            &close,
            params.macd_fast,
            params.macd_slow,
            params.macd_signal,
        );
        let stoch = stoch_rsi(&close, params.stoch_length, params.stoch_k, params.stoch_d);

        Self {
            ts: candles.iter().map(|c| c.open_time).collect(),
            open: candles.iter().map(|c| c.open).collect(),
            high: candles.iter().map(|c| c.high).collect(),
            low: candles.iter().map(|c| c.low).collect(),
            volume: candles.iter().map(|c| c.volume).collect(),

            ema_short: ema(&close, params.ema_short),
            ema_long: ema(&close, params.ema_long),
            ema_trend: ema(&close, params.ema_trend),
            ema_drift: ema(&close, params.ema_drift),

            atr: atr(candles, params.atr_length),
            bb_low: bands.low,
            bb_mid: bands.mid,
            bb_high: bands.high,
            bb_width: bands.width,
            pct_b,

            rsi: rsi(&close, params.rsi_length),
            rsi_fast: rsi(&close, params.rsi_fast_length),

            macd_line: macd_series.line,
            macd_signal: macd_series.signal,
            macd_hist: macd_series.histogram,

            roc: roc(&close, params.roc_length),
            stoch_k: stoch.k,
            stoch_d: stoch.d,

            vwap: session_vwap(candles),
            close,
        }
    }

    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }

    /// Number of leading rows where at least one required rolling column is
    /// still unpopulated. Equals `len()` when the batch never fully warms up.
    pub fn warmup_len(&self) -> usize {
        (0..self.len())
            .find(|&i| {
                self.atr[i].is_some()
                    && self.bb_mid[i].is_some()
                    && self.pct_b[i].is_some()
                    && self.rsi[i].is_some()
                    && self.rsi_fast[i].is_some()
                    && self.roc[i].is_some()
                    && self.stoch_k[i].is_some()
                    && self.stoch_d[i].is_some()
            })
            .unwrap_or(self.len())
    }

    /// Drop the warm-up rows so every remaining row has all required columns
    /// populated. An under-filled batch collapses to an empty frame.
    pub fn drop_warmup(mut self) -> Self {
        let cut = self.warmup_len();

        fn trim<T>(v: &mut Vec<T>, cut: usize) {
            v.drain(..cut.min(v.len()));
        }

        trim(&mut self.ts, cut);
        trim(&mut self.open, cut);
        trim(&mut self.high, cut);
        trim(&mut self.low, cut);
        trim(&mut self.close, cut);
        trim(&mut self.volume, cut);
        trim(&mut self.ema_short, cut);
        trim(&mut self.ema_long, cut);
        trim(&mut self.ema_trend, cut);
        trim(&mut self.ema_drift, cut);
        trim(&mut self.atr, cut);
        trim(&mut self.bb_low, cut);
        trim(&mut self.bb_mid, cut);
        trim(&mut self.bb_high, cut);
        trim(&mut self.bb_width, cut);
        trim(&mut self.pct_b, cut);
        trim(&mut self.rsi, cut);
        trim(&mut self.rsi_fast, cut);
        trim(&mut self.macd_line, cut);
        trim(&mut self.macd_signal, cut);
        trim(&mut self.macd_hist, cut);
        trim(&mut self.roc, cut);
        trim(&mut self.stoch_k, cut);
        trim(&mut self.stoch_d, cut);
        trim(&mut self.vwap, cut);

        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                open_time: i as i64 * 900_000,
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn frame_columns_match_candle_count() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let frame = IndicatorFrame::compute(&candles(&closes), &FrameParams::default());
        assert_eq!(frame.len(), 60);
        assert_eq!(frame.ema_short.len(), 60);
        assert_eq!(frame.atr.len(), 60);
        assert_eq!(frame.stoch_d.len(), 60);
        assert_eq!(frame.vwap.len(), 60);
    }

    #[test]
    fn warmup_is_bollinger_bound_with_defaults() {
        // With defaults the Bollinger window (20) is the last column to fill:
        // atr fills at 13, stoch D at 18, bands at 19.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let frame = IndicatorFrame::compute(&candles(&closes), &FrameParams::default());
        assert_eq!(frame.warmup_len(), 19);

        let trimmed = frame.drop_warmup();
        assert_eq!(trimmed.len(), 41);
        assert!(trimmed.atr[0].is_some());
        assert!(trimmed.bb_mid[0].is_some());
        assert!(trimmed.stoch_d[0].is_some());
    }

    #[test]
    fn underfilled_batch_collapses_to_empty() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let frame = IndicatorFrame::compute(&candles(&closes), &FrameParams::default());
        assert_eq!(frame.warmup_len(), 10);
        assert!(frame.drop_warmup().is_empty());
    }

    #[test]
    fn flat_batch_stays_populated_after_trim() {
        // Zero variance must not knock out %B or the stochastic columns.
        let closes = vec![100.0; 50];
        let frame =
            IndicatorFrame::compute(&candles(&closes), &FrameParams::default()).drop_warmup();
        assert!(!frame.is_empty());
        for i in 0..frame.len() {
            assert_eq!(frame.bb_width[i], Some(0.0));
            assert!(frame.pct_b[i].unwrap().abs() < 1e-9);
            assert!(frame.stoch_k[i].is_some());
        }
    }

    #[test]
    fn band_ordering_holds_after_trim() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.4).sin() * 6.0).collect();
        let frame =
            IndicatorFrame::compute(&candles(&closes), &FrameParams::default()).drop_warmup();
        for i in 0..frame.len() {
            let (lo, mid, hi) = (
                frame.bb_low[i].unwrap(),
                frame.bb_mid[i].unwrap(),
                frame.bb_high[i].unwrap(),
            );
            assert!(lo <= mid && mid <= hi);
        }
    }
}
