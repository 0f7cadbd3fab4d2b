//! Yahoo Finance history provider.
//!
//! Fetches closing prices from Yahoo's v8 chart API. One HTTP request per
//! call, no retries; each call is bounded by the client timeout on its own.

use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trendwatch_core::{DataError, HistoryProvider, Interval, PricePoint, PriceSeries};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Connection settings for [`YahooHistoryProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    /// Lookback range for daily bars (Yahoo range syntax, e.g. "3mo").
    pub daily_range: String,
    /// Lookback range for weekly bars.
    pub weekly_range: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            daily_range: Interval::Daily.default_range().to_string(),
            weekly_range: Interval::Weekly.default_range().to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

impl YahooConfig {
    fn range_for(&self, interval: Interval) -> &str {
        match interval {
            Interval::Daily => &self.daily_range,
            Interval::Weekly => &self.weekly_range,
        }
    }
}

/// Yahoo Finance history provider.
pub struct YahooHistoryProvider {
    client: reqwest::Client,
    config: YahooConfig,
}

impl YahooHistoryProvider {
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    /// Build the chart URL for `symbol`. The symbol is pushed as an encoded
    /// path segment so `^GSPC` or `EURUSD=X` survive intact.
    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url, DataError> {
        let mut url = reqwest::Url::parse(self.config.base_url.trim_end_matches('/'))
            .map_err(|e| DataError::Upstream(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DataError::Upstream("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    /// Parse a chart API body into a price series.
    fn parse_response(
        symbol: &str,
        interval: Interval,
        resp: ChartResponse,
    ) -> Result<PriceSeries, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound(symbol.to_string()),
            Some(err) => DataError::Upstream(format!("{}: {}", err.code, err.description)),
            None => DataError::ParseError("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        // Listed symbols with no trades in range come back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ParseError("no quote data".into()))?;

        // Adjusted closes when Yahoo provides them, raw closes otherwise.
        let closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose)
            .filter(|a| !a.is_empty())
            .unwrap_or(quote.close);

        let mut points = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };
            let Ok(close) = Decimal::try_from(close) else {
                continue;
            };
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| DataError::ParseError(format!("invalid timestamp: {ts}")))?;
            points.push(PricePoint { timestamp, close });
        }

        Ok(PriceSeries::new(symbol, interval, points))
    }
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<PriceSeries, DataError> {
        let url = self.chart_url(symbol)?;
        let range = self.config.range_for(interval);
        tracing::debug!(%symbol, %interval, range, "Fetching chart history");

        let resp = self
            .client
            .get(url)
            .query(&[
                ("range", range),
                ("interval", interval.yahoo_code()),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        // Unknown symbols come back as 404 with a chart error payload.
        match serde_json::from_str::<ChartResponse>(&body) {
            Ok(chart) if status.is_success() || chart.chart.error.is_some() => {
                Self::parse_response(symbol, interval, chart)
            }
            Ok(_) => Err(DataError::Upstream(format!("HTTP {status} for {symbol}"))),
            Err(_) if !status.is_success() => {
                Err(DataError::Upstream(format!("HTTP {status} for {symbol}")))
            }
            Err(e) => Err(DataError::ParseError(format!(
                "failed to parse response for {symbol}: {e}"
            ))),
        }
    }
}
