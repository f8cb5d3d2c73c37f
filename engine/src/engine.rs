// Indicator engine: runs the full indicator set over one bar sequence
use crate::error::EngineError;
use crate::indicators::{
    bollinger, ema, macd, obv, rsi, volume_profile, BollingerBands, Macd, Series, TrendInputs, TrendSignal,
    VolumeProfile,
};
use serde::{Deserialize, Serialize};
use shared::models::{Bar, VolumeSource};

/// Periods and options for every indicator the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_mult: f64,
    pub profile_bins: usize,
    pub volume_source: VolumeSource,
    /// Shortest bar sequence `compute` accepts.
    pub min_bars: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            ema_fast: 9,
            ema_slow: 21,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_mult: 2.0,
            profile_bins: 24,
            volume_source: VolumeSource::Base,
            min_bars: 1,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let periods = [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("profile_bins", self.profile_bins),
            ("min_bars", self.min_bars),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, v)| *v == 0) {
            return Err(EngineError::InvalidParameter(format!("{} must be greater than 0", name)));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(EngineError::InvalidParameter(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !(self.bollinger_mult.is_finite() && self.bollinger_mult > 0.0) {
            return Err(EngineError::InvalidParameter(format!(
                "bollinger_mult must be a positive number, got {}",
                self.bollinger_mult
            )));
        }
        Ok(())
    }

    /// Bars needed before every latest value is defined:
    /// `max(macd_slow + macd_signal, bollinger_period, rsi_period + 1) + 1`.
    pub fn warmup_bars(&self) -> usize {
        (self.macd_slow + self.macd_signal)
            .max(self.bollinger_period)
            .max(self.rsi_period + 1)
            + 1
    }
}

/// Latest element of every series, the values a report displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestSnapshot {
    pub start_time: i64,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bollinger_upper: Option<f64>,
    pub bollinger_basis: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub obv: f64,
}

impl LatestSnapshot {
    pub fn trend_inputs(&self) -> TrendInputs {
        TrendInputs {
            ema_fast: self.ema_fast,
            ema_slow: self.ema_slow,
            macd_histogram: self.macd_histogram,
            rsi: self.rsi,
        }
    }
}

/// Every series aligned to the input bars, plus the derived profile and trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub rsi: Series,
    pub macd: Macd,
    pub bollinger: BollingerBands,
    pub obv: Vec<f64>,
    pub volume_profile: VolumeProfile,
    pub latest: LatestSnapshot,
    pub trend: TrendSignal,
}

impl IndicatorReport {
    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(IndicatorEngine { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Computes the full indicator set over `bars` (oldest first).
    ///
    /// Fails with `InsufficientData` for an empty sequence or one shorter than
    /// `min_bars`. Indicators whose warm-up exceeds the history are returned
    /// with undefined entries rather than failing.
    pub fn compute(&self, bars: &[Bar]) -> Result<IndicatorReport, EngineError> {
        let cfg = &self.config;
        let required = cfg.min_bars.max(1);
        if bars.len() < required {
            return Err(EngineError::insufficient(required, bars.len()));
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume_in(cfg.volume_source)).collect();

        let ema_fast = ema(&closes, cfg.ema_fast);
        let ema_slow = ema(&closes, cfg.ema_slow);
        let rsi = rsi(&closes, cfg.rsi_period);
        let macd = macd(&closes, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        let bollinger = bollinger(&closes, cfg.bollinger_period, cfg.bollinger_mult);
        let obv = obv(&closes, &volumes);
        let volume_profile = volume_profile(bars, cfg.profile_bins, cfg.volume_source);

        let i = bars.len() - 1;
        let latest = LatestSnapshot {
            start_time: bars[i].start_time,
            close: closes[i],
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            rsi: rsi[i],
            macd: macd.macd_line[i],
            macd_signal: macd.signal_line[i],
            macd_histogram: macd.histogram[i],
            bollinger_upper: bollinger.upper[i],
            bollinger_basis: bollinger.basis[i],
            bollinger_lower: bollinger.lower[i],
            obv: obv[i],
        };
        let trend = TrendSignal::classify(&latest.trend_inputs());

        Ok(IndicatorReport {
            ema_fast,
            ema_slow,
            rsi,
            macd,
            bollinger,
            obv,
            volume_profile,
            latest,
            trend,
        })
    }
}
