// Provider seam for market data, plus an in-memory provider
use crate::error::EngineError;
use shared::models::{Bar, Ticker24h, Timeframe};
use std::collections::HashMap;
use std::future::Future;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// A source of bars and 24h tickers. Implementations map their own payload
/// shapes onto the shared models and hand back bars oldest first.
pub trait MarketDataProvider: Send + Sync {
    fn klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Bar>, EngineError>> + Send;

    fn ticker_24h(&self, symbol: &str) -> impl Future<Output = Result<Ticker24h, EngineError>> + Send;
}

/// Bars kept per symbol and timeframe, for offline runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, HashMap<Timeframe, Vec<Bar>>>,
    tickers: HashMap<String, Ticker24h>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `new_bars`, keeping the series sorted and one bar per timestamp.
    /// A later bar for an existing timestamp replaces the stored one.
    pub fn add_bars(&mut self, symbol: &str, timeframe: Timeframe, new_bars: Vec<Bar>) {
        let series = self
            .bars
            .entry(symbol.to_string())
            .or_default()
            .entry(timeframe)
            .or_default();
        let mut merged: Vec<Bar> = new_bars;
        merged.extend(series.drain(..));
        merged.sort_by_key(|b| b.start_time);
        merged.dedup_by_key(|b| b.start_time);
        *series = merged;
    }

    pub fn set_ticker(&mut self, symbol: &str, ticker: Ticker24h) {
        self.tickers.insert(symbol.to_string(), ticker);
    }

    pub fn bars(&self, symbol: &str, timeframe: Timeframe) -> Option<&[Bar]> {
        self.bars
            .get(symbol)
            .and_then(|by_tf| by_tf.get(&timeframe))
            .map(Vec::as_slice)
    }
}

impl MarketDataProvider for InMemoryProvider {
    async fn klines(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> Result<Vec<Bar>, EngineError> {
        let bars = self
            .bars(symbol, timeframe)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                EngineError::MarketDataError(format!(
                    "No kline data found for symbol '{}' and timeframe {}",
                    symbol, timeframe
                ))
            })?;
        let skip = bars.len().saturating_sub(limit);
        Ok(bars[skip..].to_vec())
    }

    async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h, EngineError> {
        self.tickers
            .get(symbol)
            .cloned()
            .ok_or_else(|| EngineError::MarketDataError(format!("No ticker found for symbol '{}'", symbol)))
    }
}

/// Approximates a 24h ticker from the bars covering the day that ends with the
/// last bar's close. Quote volume uses turnover, or `volume * close` when a bar
/// has none.
pub fn ticker_from_bars(bars: &[Bar], timeframe: Timeframe) -> Option<Ticker24h> {
    let last = bars.last()?;
    let window_start = last.start_time + timeframe.duration_millis() - DAY_MILLIS;
    let day: Vec<&Bar> = bars.iter().filter(|b| b.start_time >= window_start).collect();
    let first = day.first()?;

    let high_24h = day.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low_24h = day.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let volume = day.iter().map(|b| b.volume).sum();
    let quote_volume = day.iter().map(|b| b.turnover.unwrap_or(b.volume * b.close)).sum();
    let open_price = first.open;
    let price_change = last.close - open_price;
    let price_change_pct = if open_price == 0.0 {
        0.0
    } else {
        price_change / open_price * 100.0
    };

    Some(Ticker24h {
        last_price: last.close,
        high_24h,
        low_24h,
        price_change,
        price_change_pct,
        volume,
        quote_volume,
        open_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(start_time: i64, close: f64) -> Bar {
        Bar {
            start_time,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 2.0,
            turnover: None,
        }
    }

    #[tokio::test]
    async fn merges_sorts_and_dedups() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars("ETHUSDT", Timeframe::Hour1, vec![bar(3, 30.0), bar(1, 10.0)]);
        provider.add_bars("ETHUSDT", Timeframe::Hour1, vec![bar(2, 20.0), bar(3, 31.0)]);

        let bars = provider.klines("ETHUSDT", Timeframe::Hour1, 10).await.unwrap();
        let times: Vec<i64> = bars.iter().map(|b| b.start_time).collect();
        assert_eq!(times, vec![1, 2, 3]);
        assert_eq!(bars[2].close, 31.0);
    }

    #[tokio::test]
    async fn limit_keeps_newest_bars() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars("BTCUSDT", Timeframe::Minute5, (0..10).map(|i| bar(i, 100.0)).collect());
        let bars = provider.klines("BTCUSDT", Timeframe::Minute5, 3).await.unwrap();
        assert_eq!(bars.iter().map(|b| b.start_time).collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn missing_data_is_an_error() {
        let provider = InMemoryProvider::new();
        assert!(matches!(
            provider.klines("BTCUSDT", Timeframe::Hour4, 10).await,
            Err(EngineError::MarketDataError(_))
        ));
        assert!(provider.ticker_24h("BTCUSDT").await.is_err());
    }

    #[test]
    fn ticker_covers_last_day_only() {
        let hour = Timeframe::Hour1.duration_millis();
        let bars: Vec<Bar> = (0..30).map(|i| bar(i * hour, 100.0 + i as f64)).collect();
        let ticker = ticker_from_bars(&bars, Timeframe::Hour1).unwrap();
        // bars 6..=29 form the last 24 hours
        assert_eq!(ticker.open_price, 106.0);
        assert_eq!(ticker.last_price, 129.0);
        assert_eq!(ticker.price_change, 23.0);
        assert_eq!(ticker.high_24h, 130.0);
        assert_eq!(ticker.low_24h, 105.0);
        assert_eq!(ticker.volume, 48.0);
    }

    #[test]
    fn no_bars_no_ticker() {
        assert!(ticker_from_bars(&[], Timeframe::Hour1).is_none());
    }
}
