use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One OHLCV observation for a fixed interval.
///
/// `start_time` is the interval open time in epoch milliseconds. `volume` is in
/// base-asset units and `turnover`, when the provider reports it, in quote-asset
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub start_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub turnover: Option<f64>,
}

impl Bar {
    /// `(high + low + close) / 3`, the price a bar contributes to a volume profile.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_time)
    }

    pub fn volume_in(&self, source: VolumeSource) -> f64 {
        match source {
            VolumeSource::Base => self.volume,
            VolumeSource::Quote => self.turnover.unwrap_or(self.volume),
        }
    }
}

/// Which volume figure volume-weighted indicators read from a bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSource {
    #[default]
    Base,
    /// Quote turnover, falling back to base volume for bars without one.
    Quote,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour12,
    Hour24,
}

impl Timeframe {
    pub const ALL: [Timeframe; 9] = [
        Timeframe::Minute5,
        Timeframe::Minute15,
        Timeframe::Minute30,
        Timeframe::Hour1,
        Timeframe::Hour2,
        Timeframe::Hour4,
        Timeframe::Hour6,
        Timeframe::Hour12,
        Timeframe::Hour24,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour2 => "2h",
            Timeframe::Hour4 => "4h",
            Timeframe::Hour6 => "6h",
            Timeframe::Hour12 => "12h",
            Timeframe::Hour24 => "24h",
        }
    }

    /// Interval code understood by the Bybit v5 kline endpoint.
    pub fn bybit_interval(self) -> &'static str {
        match self {
            Timeframe::Minute5 => "5",
            Timeframe::Minute15 => "15",
            Timeframe::Minute30 => "30",
            Timeframe::Hour1 => "60",
            Timeframe::Hour2 => "120",
            Timeframe::Hour4 => "240",
            Timeframe::Hour6 => "360",
            Timeframe::Hour12 => "720",
            Timeframe::Hour24 => "D",
        }
    }

    pub fn duration_millis(self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Timeframe::Minute5 => 5 * MINUTE,
            Timeframe::Minute15 => 15 * MINUTE,
            Timeframe::Minute30 => 30 * MINUTE,
            Timeframe::Hour1 => 60 * MINUTE,
            Timeframe::Hour2 => 120 * MINUTE,
            Timeframe::Hour4 => 240 * MINUTE,
            Timeframe::Hour6 => 360 * MINUTE,
            Timeframe::Hour12 => 720 * MINUTE,
            Timeframe::Hour24 => 1440 * MINUTE,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTimeframe(pub String);

impl fmt::Display for UnknownTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported timeframe '{}'", self.0)
    }
}

impl std::error::Error for UnknownTimeframe {}

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.label() == wanted)
            .ok_or(UnknownTimeframe(wanted))
    }
}

/// Rolling 24 hour statistics for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker24h {
    pub last_price: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub price_change: f64,
    /// Percent, i.e. the exchange's change rate multiplied by 100.
    pub price_change_pct: f64,
    pub volume: f64,
    pub quote_volume: f64,
    pub open_price: f64,
}
