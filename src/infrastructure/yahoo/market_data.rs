use super::common::{ChartResponse, fill_gaps};
use crate::domain::market::Bar;
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

// ===== Market Data Service (Yahoo chart API) =====

pub struct YahooMarketDataService {
    client: Client,
    base_url: String,
}

impl YahooMarketDataService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn day_start_secs(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    }
}

/// Turn a chart payload into bars. Null cells are forward- then back-filled
/// per column; records without a timestamp are skipped.
pub fn bars_from_chart(response: ChartResponse) -> Result<Vec<Bar>> {
    if let Some(err) = response.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Ok(Vec::new());
        }
        anyhow::bail!(
            "Yahoo chart error {}: {}",
            err.code,
            err.description.unwrap_or_default()
        );
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let mut quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let len = timestamps.len();
    for column in [
        &mut quote.open,
        &mut quote.high,
        &mut quote.low,
        &mut quote.close,
        &mut quote.volume,
    ] {
        fill_gaps(column, len);
    }

    let mut bars = Vec::with_capacity(len);
    for (i, ts) in timestamps.into_iter().enumerate() {
        let Some(timestamp) = ts.and_then(|secs| Utc.timestamp_opt(secs, 0).single()) else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close)) =
            (quote.open[i], quote.high[i], quote.low[i], quote.close[i])
        else {
            continue;
        };
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: quote.volume[i].unwrap_or(0.0),
        });
    }

    Ok(bars)
}

#[async_trait]
impl MarketDataService for YahooMarketDataService {
    async fn get_historical_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let period1 = Self::day_start_secs(start).to_string();
        let period2 = Self::day_start_secs(end).to_string();

        debug!(
            "YahooMarketDataService: fetching {} {} bars [{}, {})",
            ticker, interval, start, end
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", interval),
                ("includePrePost", "false"),
                ("events", ""),
            ])
            .send()
            .await
            .context("Failed to send request to Yahoo chart API")?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("YahooMarketDataService: unknown symbol {}", ticker);
            return Ok(Vec::new());
        }
        if !status.is_success() {
            anyhow::bail!("Yahoo chart API returned status: {}", status);
        }

        let body: ChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo chart response")?;

        let bars = bars_from_chart(body)?;
        info!(
            "YahooMarketDataService: fetched {} bars for {}",
            bars.len(),
            ticker
        );
        Ok(bars)
    }
}
