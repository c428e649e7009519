// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   macd_line = EMA(fast) - EMA(slow)
//   signal    = EMA(macd_line, signal_span)
//   histogram = macd_line - signal
//
// Built entirely from recursive EMAs, so all three series are dense and the
// same length as the input. Defaults elsewhere in the engine: 12 / 26 / 9.

use crate::indicators::ema::ema;

/// The three MACD series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD line, signal line, and histogram for `series`.
///
/// Returns empty series when the input is empty or any span is zero.
pub fn macd(series: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    let ema_fast = ema(series, fast);
    let ema_slow = ema(series, slow);

    if ema_fast.is_empty() || ema_slow.is_empty() {
        return MacdSeries {
            line: Vec::new(),
            signal: Vec::new(),
            histogram: Vec::new(),
        };
    }

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema(&line, signal_span);
    if signal.is_empty() {
        return MacdSeries {
            line: Vec::new(),
            signal: Vec::new(),
            histogram: Vec::new(),
        };
    }

    let histogram: Vec<f64> = line.iter().zip(signal.iter()).map(|(m, s)| m - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}
