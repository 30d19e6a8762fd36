// =============================================================================
// Yahoo Finance chart API client — public daily OHLCV history
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range={range}&interval=1d
//
// The response carries parallel arrays (timestamp, open, high, low, close,
// volume) that may contain nulls on non-trading or partial days; such rows are
// skipped.  Bar dates are taken in the exchange's own UTC offset (`gmtoffset`)
// so they match the trading day rather than the UTC calendar day.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, instrument, warn};

use super::PriceSource;
use crate::types::PriceBar;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Thin client over the public chart endpoint.  No credentials involved.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against the public Yahoo endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against another host serving the same API (mirrors,
    /// recorded fixtures).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (trend-features)")
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client for YahooClient")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    /// GET /v8/finance/chart/{symbol} with a daily interval.
    #[instrument(skip(self), name = "yahoo::get_chart")]
    pub async fn get_chart(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d&includePrePost=false",
            self.base_url,
            encode_symbol(symbol),
            range
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} failed"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!(
                "chart API returned {} for {}: {}",
                status,
                symbol,
                describe_error(&body)
            );
        }

        let bars = parse_chart(&body).with_context(|| format!("malformed chart payload for {symbol}"))?;
        debug!(symbol, range, count = bars.len(), "daily bars fetched");
        Ok(bars)
    }
}

impl PriceSource for YahooClient {
    async fn daily_history(&self, ticker: &str, range: &str) -> Result<Vec<PriceBar>> {
        self.get_chart(ticker, range).await
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Convert a chart payload into ascending daily bars.
pub fn parse_chart(body: &serde_json::Value) -> Result<Vec<PriceBar>> {
    let chart = &body["chart"];
    if !chart["error"].is_null() {
        anyhow::bail!("chart error: {}", describe_error(body));
    }

    let result = chart["result"]
        .as_array()
        .and_then(|r| r.first())
        .context("chart response has no result entry")?;

    let offset_secs = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);
    let offset = i32::try_from(offset_secs)
        .ok()
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("invalid gmtoffset {offset_secs}"))?;

    // A valid symbol with no trading history has no timestamp array at all.
    let Some(timestamps) = result["timestamp"].as_array() else {
        return Ok(Vec::new());
    };

    let quote = &result["indicators"]["quote"][0];
    let column = |name: &str| -> Result<&Vec<serde_json::Value>> {
        quote[name]
            .as_array()
            .with_context(|| format!("chart quote block missing '{name}' array"))
    };
    let (open, high, low, close, volume) = (
        column("open")?,
        column("high")?,
        column("low")?,
        column("close")?,
        column("volume")?,
    );

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let ts = ts.as_i64().context("non-integer timestamp in chart response")?;
        let values = (
            field(open, i),
            field(high, i),
            field(low, i),
            field(close, i),
        );
        let (Some(o), Some(h), Some(l), Some(c)) = values else {
            skipped += 1;
            continue;
        };

        let date = DateTime::from_timestamp(ts, 0)
            .with_context(|| format!("timestamp {ts} out of range"))?
            .with_timezone(&offset)
            .date_naive();

        bars.push(PriceBar {
            date,
            timestamp: ts,
            open: o,
            high: h,
            low: l,
            close: c,
            // Indices such as ^VIX report no volume.
            volume: field(volume, i).unwrap_or(0.0),
        });
    }

    if skipped > 0 {
        warn!(skipped, kept = bars.len(), "dropped chart rows with missing prices");
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Finite number at position `i`, or `None` for null / missing / NaN.
fn field(values: &[serde_json::Value], i: usize) -> Option<f64> {
    values.get(i)?.as_f64().filter(|v| v.is_finite())
}

fn describe_error(body: &serde_json::Value) -> String {
    let err = &body["chart"]["error"];
    match (err["code"].as_str(), err["description"].as_str()) {
        (Some(code), Some(desc)) => format!("{code} - {desc}"),
        _ => body.to_string(),
    }
}

/// Index tickers start with '^', which must be escaped in the URL path.
fn encode_symbol(symbol: &str) -> String {
    symbol.trim().replace('^', "%5E")
}
