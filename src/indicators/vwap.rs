// =============================================================================
// Session VWAP — anchored to UTC calendar days
// =============================================================================
//
// Volume-weighted average price over the current session, where a session is
// one UTC calendar day derived from each candle's open time:
//
//   typical = (high + low + close) / 3
//   VWAP    = cumsum(typical * volume) / (cumsum(volume) + eps)
//
// Both running sums reset at every UTC day boundary. The epsilon keeps a
// zero-volume session at 0 instead of dividing by zero.

use chrono::NaiveDate;

use crate::market_data::Candle;
use crate::scale::EPS;

/// Compute the session-anchored VWAP series for a candle slice (oldest
/// first). Output is dense: every row has a value from the first candle of
/// its session onward.
pub fn session_vwap(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());

    let mut session: Option<NaiveDate> = None;
    let mut cum_pv = 0.0;
    let mut cum_v = 0.0;

    for c in candles {
        let day = c.open_instant().date_naive();
        if session != Some(day) {
            session = Some(day);
            cum_pv = 0.0;
            cum_v = 0.0;
        }

        cum_pv += c.typical_price() * c.volume;
        cum_v += c.volume;
        out.push(cum_pv / (cum_v + EPS));
    }

    out
}
