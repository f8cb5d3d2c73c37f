// Report service: fetch bars and ticker, run the engine, pick the latest values
use super::command::ReportRequest;
use crate::config::settings::EngineSettings;
use crate::data::market_data::MarketDataProvider;
use crate::engine::{IndicatorEngine, LatestSnapshot};
use crate::error::EngineError;
use crate::indicators::{TrendSignal, VolumeProfile};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::Ticker24h;
use shared::utils::format_optional;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketReport {
    pub coin: String,
    pub symbol: String,
    pub timeframe: String,
    pub ticker: Ticker24h,
    /// Open time of the newest bar.
    pub close_time: Option<DateTime<Utc>>,
    pub bars_used: usize,
    pub latest: LatestSnapshot,
    pub volume_profile: VolumeProfile,
    pub trend: TrendSignal,
}

impl MarketReport {
    /// One-line plain summary; undefined values render as `-`.
    pub fn summary(&self) -> String {
        let l = &self.latest;
        let poc = format_optional(self.volume_profile.poc.map(|p| p.price), 2);
        format!(
            "{} {} price={} ema9/21={}/{} rsi={} macd={}/{}/{} bb={}/{}/{} obv={} poc={} trend={}",
            self.coin,
            self.timeframe.to_uppercase(),
            format_optional(Some(l.close), 4),
            format_optional(Some(l.ema_fast), 4),
            format_optional(Some(l.ema_slow), 4),
            format_optional(l.rsi, 2),
            format_optional(Some(l.macd), 4),
            format_optional(Some(l.macd_signal), 4),
            format_optional(Some(l.macd_histogram), 4),
            format_optional(l.bollinger_upper, 4),
            format_optional(l.bollinger_basis, 4),
            format_optional(l.bollinger_lower, 4),
            format_optional(Some(l.obv), 0),
            poc,
            self.trend,
        )
    }
}

pub struct ReportService<P> {
    provider: P,
    engine: IndicatorEngine,
    kline_limit: usize,
}

impl<P: MarketDataProvider> ReportService<P> {
    pub fn new(provider: P, settings: &EngineSettings) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(ReportService {
            provider,
            engine: IndicatorEngine::new(settings.engine_config())?,
            kline_limit: settings.kline_limit,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn build_report(&self, request: &ReportRequest) -> Result<MarketReport, EngineError> {
        debug!(symbol = %request.symbol, timeframe = %request.timeframe, "Building report");

        let (bars, ticker) = tokio::try_join!(
            self.provider.klines(&request.symbol, request.timeframe, self.kline_limit),
            self.provider.ticker_24h(&request.symbol),
        )
        .map_err(|e| {
            warn!(symbol = %request.symbol, error_detail = ?e, "Market data fetch failed");
            e
        })?;

        let indicators = self.engine.compute(&bars).map_err(|e| {
            warn!(symbol = %request.symbol, bars = bars.len(), error_detail = ?e, "Indicator computation rejected");
            e
        })?;

        let close_time = bars.last().and_then(|b| b.start_datetime());
        let report = MarketReport {
            coin: request.coin.clone(),
            symbol: request.symbol.clone(),
            timeframe: request.timeframe.label().to_string(),
            ticker,
            close_time,
            bars_used: bars.len(),
            latest: indicators.latest,
            volume_profile: indicators.volume_profile,
            trend: indicators.trend,
        };
        info!(symbol = %report.symbol, timeframe = %report.timeframe, trend = %report.trend, "Report built");
        Ok(report)
    }
}
