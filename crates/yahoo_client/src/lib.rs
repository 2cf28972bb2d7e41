//! Yahoo Finance chart API client.
//!
//! Fetches recent daily closes from `query1.finance.yahoo.com` and
//! exposes them through the `QuoteFeed` port consumed by the snapshot
//! cache.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use common::config::FeedConfig;
use common::{Error, QuoteFeed};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// Yahoo rejects requests without a browser-ish User-Agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; pulse-bot/0.1)";

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn resolve_base_url(configured: &str) -> String {
    if let Ok(override_url) = std::env::var("PULSE_FEED_BASE_URL") {
        let normalized = normalize_base_url(&override_url);
        if !normalized.is_empty() {
            info!("Using PULSE_FEED_BASE_URL override: {}", normalized);
            return normalized;
        }
        warn!("Ignoring empty PULSE_FEED_BASE_URL override");
    }

    let normalized = normalize_base_url(configured);
    if normalized.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        normalized
    }
}

// ── Chart response types ──────────────────────────────────────────────

/// Envelope returned by `/v8/finance/chart/{symbol}`.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "regularMarketPrice", default)]
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuote {
    /// Daily closes aligned with `timestamp`; entries can be null on
    /// half-days and fresh listings.
    #[serde(default)]
    pub close: Option<Vec<Option<f64>>>,
}

// ── Implementation ────────────────────────────────────────────────────

/// Chart API client with connection pooling, User-Agent, and a
/// per-request timeout.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    /// Build the client. Base URL resolution: `PULSE_FEED_BASE_URL` env
    /// override > configured value > built-in default.
    pub fn new(cfg: &FeedConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .expect("failed to build Yahoo HTTP client");

        Self {
            client,
            base_url: resolve_base_url(&cfg.base_url),
        }
    }

    /// Fetch the raw daily chart for one symbol.
    pub async fn fetch_chart(&self, symbol: &str, range_days: u32) -> Result<ChartResult, Error> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}d",
            self.base_url, symbol, range_days
        );

        debug!("Fetching chart: {}", url);

        let resp = self.client.get(&url).send().await.map_err(|e| Error::Feed {
            symbol: symbol.to_string(),
            message: format!("HTTP error: {}", e),
        })?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Feed {
                symbol: symbol.to_string(),
                message: format!(
                    "chart API returned {}: {}",
                    status,
                    body_snippet(&body, 500)
                ),
            });
        }

        let data: ChartResponse = resp.json().await.map_err(|e| Error::Feed {
            symbol: symbol.to_string(),
            message: format!("JSON parse error: {}", e),
        })?;

        first_chart_result(symbol, data)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new(&FeedConfig::default())
    }
}

/// At most `max` bytes of `body`, cut back to a char boundary.
fn body_snippet(body: &str, max: usize) -> &str {
    let mut end = body.len().min(max);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

fn first_chart_result(symbol: &str, data: ChartResponse) -> Result<ChartResult, Error> {
    if let Some(err) = data.chart.error {
        return Err(Error::Feed {
            symbol: symbol.to_string(),
            message: format!("chart API error {}: {}", err.code, err.description),
        });
    }

    data.chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        })
        .ok_or_else(|| Error::Feed {
            symbol: symbol.to_string(),
            message: "chart API returned no result".to_string(),
        })
}

/// Closing values from a chart, oldest → newest, nulls dropped.
pub fn extract_closes(result: &ChartResult) -> Vec<f64> {
    result
        .indicators
        .quote
        .first()
        .and_then(|quote| quote.close.as_ref())
        .map(|closes| closes.iter().filter_map(|c| *c).collect())
        .unwrap_or_default()
}

#[async_trait]
impl QuoteFeed for YahooClient {
    async fn recent_closes(&self, symbol: &str, lookback_days: u32) -> Result<Vec<f64>, Error> {
        let result = self.fetch_chart(symbol, lookback_days).await?;
        let closes = extract_closes(&result);
        debug!("{}: {} closes in window", symbol, closes.len());
        Ok(closes)
    }
}
