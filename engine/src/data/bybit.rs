// Bybit v5 public market-data client (klines and 24h tickers)
use super::market_data::MarketDataProvider;
use super::validation::validate_bars;
use crate::config::settings::EngineSettings;
use crate::error::EngineError;
use serde::Deserialize;
use shared::models::{Bar, Ticker24h, Timeframe};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Response envelope shared by every Bybit v5 endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    /// Rows of `[start, open, high, low, close, volume, turnover]`, newest first,
    /// every field a string.
    #[serde(default)]
    list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TickerResult {
    #[serde(default)]
    list: Vec<RawTicker>,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "highPrice24h")]
    high_price_24h: String,
    #[serde(rename = "lowPrice24h")]
    low_price_24h: String,
    #[serde(rename = "prevPrice24h")]
    prev_price_24h: String,
    #[serde(rename = "price24hPcnt")]
    price_24h_pcnt: String,
    #[serde(rename = "volume24h")]
    volume_24h: String,
    #[serde(rename = "turnover24h")]
    turnover_24h: String,
}

fn unwrap_envelope<T>(envelope: Envelope<T>, what: &str) -> Result<T, EngineError> {
    if envelope.ret_code != 0 {
        return Err(EngineError::MarketDataError(format!(
            "Bybit {} error: {} (retCode {})",
            what, envelope.ret_msg, envelope.ret_code
        )));
    }
    envelope
        .result
        .ok_or_else(|| EngineError::MarketDataError(format!("Bybit {} response has no result", what)))
}

fn parse_number(field: &str, raw: &str) -> Result<f64, EngineError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| EngineError::MarketDataError(format!("invalid {} '{}': {}", field, raw, e)))
}

fn parse_kline_row(idx: usize, row: &[String]) -> Result<Bar, EngineError> {
    if row.len() < 6 {
        return Err(EngineError::MarketDataError(format!(
            "kline row {} has {} field(s), expected at least 6",
            idx,
            row.len()
        )));
    }
    let start_time = row[0]
        .trim()
        .parse::<i64>()
        .map_err(|e| EngineError::MarketDataError(format!("invalid start time '{}' in kline row {}: {}", row[0], idx, e)))?;
    let turnover = match row.get(6) {
        Some(raw) => Some(parse_number("turnover", raw)?),
        None => None,
    };
    Ok(Bar {
        start_time,
        open: parse_number("open", &row[1])?,
        high: parse_number("high", &row[2])?,
        low: parse_number("low", &row[3])?,
        close: parse_number("close", &row[4])?,
        volume: parse_number("volume", &row[5])?,
        turnover,
    })
}

/// Parses a `/v5/market/kline` body into validated bars, oldest first.
pub fn parse_kline_response(body: &str) -> Result<Vec<Bar>, EngineError> {
    let envelope: Envelope<KlineResult> = serde_json::from_str(body)?;
    let result = unwrap_envelope(envelope, "kline")?;
    let mut bars = result
        .list
        .iter()
        .enumerate()
        .map(|(idx, row)| parse_kline_row(idx, row))
        .collect::<Result<Vec<Bar>, EngineError>>()?;
    bars.sort_by_key(|b| b.start_time);
    validate_bars(&bars)?;
    Ok(bars)
}

/// Parses a `/v5/market/tickers` body for a single symbol.
pub fn parse_ticker_response(body: &str) -> Result<Ticker24h, EngineError> {
    let envelope: Envelope<TickerResult> = serde_json::from_str(body)?;
    let result = unwrap_envelope(envelope, "ticker")?;
    let raw = result
        .list
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::MarketDataError("No ticker returned".to_string()))?;

    let last_price = parse_number("lastPrice", &raw.last_price)?;
    let open_price = parse_number("prevPrice24h", &raw.prev_price_24h)?;
    Ok(Ticker24h {
        last_price,
        high_24h: parse_number("highPrice24h", &raw.high_price_24h)?,
        low_24h: parse_number("lowPrice24h", &raw.low_price_24h)?,
        price_change: last_price - open_price,
        price_change_pct: parse_number("price24hPcnt", &raw.price_24h_pcnt)? * 100.0,
        volume: parse_number("volume24h", &raw.volume_24h)?,
        quote_volume: parse_number("turnover24h", &raw.turnover_24h)?,
        open_price,
    })
}

#[derive(Debug, Clone)]
pub struct BybitClient {
    base_url: String,
    category: String,
    client: reqwest::Client,
}

impl BybitClient {
    pub fn new(settings: &EngineSettings) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        debug!(base_url = %settings.bybit_base_url, category = %settings.category, "BybitClient initialised");
        Ok(BybitClient {
            base_url: settings.bybit_base_url.trim_end_matches('/').to_string(),
            category: settings.category.clone(),
            client,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Bybit request failed");
        }
        Ok(response.error_for_status()?.text().await?)
    }
}

impl MarketDataProvider for BybitClient {
    #[instrument(skip(self), fields(category = %self.category))]
    async fn klines(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> Result<Vec<Bar>, EngineError> {
        let limit = limit.to_string();
        let body = self
            .get(
                "/v5/market/kline",
                &[
                    ("category", self.category.as_str()),
                    ("symbol", symbol),
                    ("interval", timeframe.bybit_interval()),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;
        let bars = parse_kline_response(&body)?;
        debug!(count = bars.len(), "Fetched klines");
        Ok(bars)
    }

    #[instrument(skip(self), fields(category = %self.category))]
    async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h, EngineError> {
        let body = self
            .get(
                "/v5/market/tickers",
                &[("category", self.category.as_str()), ("symbol", symbol)],
            )
            .await?;
        parse_ticker_response(&body)
    }
}
