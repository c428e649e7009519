// =============================================================================
// Binance REST API Client — public market-data endpoints
// =============================================================================
//
// Only unsigned endpoints are used: candle retrieval needs no API key. Every
// response updates the rate-limit tracker from the exchange's usage headers,
// and requests are refused pre-flight once the weight budget is spent.
// =============================================================================

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::binance::rate_limit::RateLimitTracker;
use crate::market_data::{Candle, MarketDataProvider};

/// Request weight of GET /api/v3/klines at limit <= 1000.
const KLINES_WEIGHT: u32 = 2;
/// Binance rejects kline requests above this limit.
const MAX_KLINES_LIMIT: u32 = 1000;

/// REST client for Binance public market data.
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    rate_limit: RateLimitTracker,
}

impl BinanceClient {
    /// Create a new client against the production endpoint.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        debug!("BinanceClient initialised (base_url=https://api.binance.com)");

        Self {
            base_url: "https://api.binance.com".to_string(),
            client,
            rate_limit: RateLimitTracker::new(),
        }
    }

    /// GET /api/v3/klines — fetch up to `limit` candles, oldest first.
    #[instrument(skip(self), name = "binance::klines")]
    pub async fn klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        if !self.rate_limit.can_send_request(KLINES_WEIGHT) {
            bail!("rate-limit budget exhausted — refusing klines request");
        }

        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol,
            interval,
            limit.min(MAX_KLINES_LIMIT)
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET /api/v3/klines request failed for {symbol}"))?;

        self.rate_limit.update_from_headers(resp.headers());

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Binance GET /api/v3/klines returned {status} for {symbol}: {body}");
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .with_context(|| format!("failed to parse klines response for {symbol}"))?;

        let candles = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                parse_kline_row(row).with_context(|| format!("malformed kline row {i} for {symbol}"))
            })
            .collect::<Result<Vec<Candle>>>()?;

        debug!(symbol, interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn fetch_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        self.klines(symbol, interval, limit).await
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Parse one positional kline row:
/// `[open_time, open, high, low, close, volume, close_time, ...]`
/// where prices and volume arrive as decimal strings.
fn parse_kline_row(row: &Value) -> Result<Candle> {
    let open_time = row
        .get(0)
        .and_then(Value::as_i64)
        .context("missing open_time")?;

    Ok(Candle {
        open_time,
        open: parse_price_field(row, 1).context("bad open")?,
        high: parse_price_field(row, 2).context("bad high")?,
        low: parse_price_field(row, 3).context("bad low")?,
        close: parse_price_field(row, 4).context("bad close")?,
        volume: parse_price_field(row, 5).context("bad volume")?,
    })
}

fn parse_price_field(row: &Value, index: usize) -> Result<f64> {
    let field = row.get(index).with_context(|| format!("missing field {index}"))?;
    let value: f64 = field
        .as_str()
        .with_context(|| format!("field {index} is not a string"))?
        .parse()
        .with_context(|| format!("field {index} is not a decimal number"))?;
    if !value.is_finite() {
        bail!("field {index} is non-finite");
    }
    Ok(value)
}
