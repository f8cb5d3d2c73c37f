// Engine settings, loaded from a JSON file and overridden by environment variables
use crate::engine::IndicatorConfig;
use crate::error::EngineError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub bybit_base_url: String,
    pub category: String,
    /// Bars requested per report; a margin above `min_bars` keeps long EMAs stable.
    pub kline_limit: usize,
    pub min_bars: usize,
    pub request_timeout_secs: u64,
    /// Command coin -> exchange symbol, e.g. `eth` -> `ETHUSDT`.
    pub coins: BTreeMap<String, String>,
    pub indicators: IndicatorConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let coins = [("btc", "BTCUSDT"), ("eth", "ETHUSDT"), ("link", "LINKUSDT")]
            .into_iter()
            .map(|(coin, symbol)| (coin.to_string(), symbol.to_string()))
            .collect();
        EngineSettings {
            bybit_base_url: "https://api.bybit.com".to_string(),
            category: "spot".to_string(),
            kline_limit: 210,
            min_bars: 50,
            request_timeout_secs: 10,
            coins,
            indicators: IndicatorConfig::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Reads `path` when given (defaults otherwise), applies environment
    /// overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut settings = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    EngineError::ConfigError(format!("Failed to read config file '{}': {}", p.display(), e))
                })?;
                Self::from_json_str(&raw)?
            }
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        tracing::debug!(
            base_url = %settings.bybit_base_url,
            category = %settings.category,
            kline_limit = settings.kline_limit,
            min_bars = settings.min_bars,
            "Engine settings loaded"
        );
        Ok(settings)
    }

    /// Overrides from `BYBIT_BASE_URL`, `BYBIT_CATEGORY`, `ENGINE_KLINE_LIMIT`
    /// and `ENGINE_MIN_BARS`, looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BYBIT_BASE_URL") {
            self.bybit_base_url = url;
        }
        if let Some(category) = lookup("BYBIT_CATEGORY") {
            self.category = category;
        }
        if let Some(raw) = lookup("ENGINE_KLINE_LIMIT") {
            self.kline_limit = parse_usize("ENGINE_KLINE_LIMIT", &raw)?;
        }
        if let Some(raw) = lookup("ENGINE_MIN_BARS") {
            self.min_bars = parse_usize("ENGINE_MIN_BARS", &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_bars == 0 {
            return Err(EngineError::ConfigError("min_bars must be greater than 0".to_string()));
        }
        if self.kline_limit < self.min_bars {
            return Err(EngineError::ConfigError(format!(
                "kline_limit ({}) is below min_bars ({})",
                self.kline_limit, self.min_bars
            )));
        }
        if self.coins.is_empty() {
            return Err(EngineError::ConfigError("at least one coin must be configured".to_string()));
        }
        self.indicators.validate()
    }

    /// Indicator config with the report's `min_bars` applied.
    pub fn engine_config(&self) -> IndicatorConfig {
        IndicatorConfig {
            min_bars: self.min_bars,
            ..self.indicators.clone()
        }
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize, EngineError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| EngineError::ConfigError(format!("{} must be a non-negative integer, got '{}': {}", key, raw, e)))
}
