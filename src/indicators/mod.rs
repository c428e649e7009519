// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free transforms over price/volume series. Recursive
// indicators (EMA, MACD) are defined from the first sample and return dense
// series; every rolling-window computation returns `None` (never zero) until
// its window is fully populated, so callers can see exactly where the warm-up
// period ends.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rolling;
pub mod rsi;
pub mod stoch_rsi;
pub mod vwap;
