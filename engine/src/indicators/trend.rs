// Overall trend light derived from the latest indicator values
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendSignal {
    Bullish,
    Neutral,
    Bearish,
}

/// Latest values the trend heuristic reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendInputs {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd_histogram: f64,
    pub rsi: Option<f64>,
}

const RSI_BULLISH_ABOVE: f64 = 55.0;
const RSI_BEARISH_BELOW: f64 = 45.0;

impl TrendInputs {
    /// +1 for a fast EMA above the slow one, +1 for a positive MACD histogram,
    /// +1 for RSI above 55 and -1 for RSI below 45. An undefined RSI scores 0.
    pub fn score(&self) -> i32 {
        let mut score = 0;
        if self.ema_fast > self.ema_slow {
            score += 1;
        }
        if self.macd_histogram > 0.0 {
            score += 1;
        }
        match self.rsi {
            Some(rsi) if rsi > RSI_BULLISH_ABOVE => score += 1,
            Some(rsi) if rsi < RSI_BEARISH_BELOW => score -= 1,
            _ => {}
        }
        score
    }
}

impl TrendSignal {
    pub fn classify(inputs: &TrendInputs) -> Self {
        TrendSignal::from_score(inputs.score())
    }

    pub fn from_score(score: i32) -> Self {
        if score >= 2 {
            TrendSignal::Bullish
        } else if score <= -1 {
            TrendSignal::Bearish
        } else {
            TrendSignal::Neutral
        }
    }
}

impl fmt::Display for TrendSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendSignal::Bullish => "Bullish",
            TrendSignal::Neutral => "Neutral",
            TrendSignal::Bearish => "Bearish",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(ema_fast: f64, ema_slow: f64, macd_histogram: f64, rsi: Option<f64>) -> TrendInputs {
        TrendInputs {
            ema_fast,
            ema_slow,
            macd_histogram,
            rsi,
        }
    }

    #[test]
    fn bullish_at_score_two() {
        let i = inputs(101.0, 100.0, 0.5, Some(60.0));
        assert_eq!(i.score(), 3);
        assert_eq!(TrendSignal::classify(&i), TrendSignal::Bullish);
        assert_eq!(TrendSignal::classify(&inputs(101.0, 100.0, 0.5, Some(50.0))), TrendSignal::Bullish);
    }

    #[test]
    fn bearish_when_only_rsi_is_weak() {
        let i = inputs(99.0, 100.0, -0.1, Some(40.0));
        assert_eq!(i.score(), -1);
        assert_eq!(TrendSignal::classify(&i), TrendSignal::Bearish);
    }

    #[test]
    fn neutral_on_ties() {
        let i = inputs(100.0, 100.0, 0.0, Some(50.0));
        assert_eq!(i.score(), 0);
        assert_eq!(TrendSignal::classify(&i), TrendSignal::Neutral);
    }

    #[test]
    fn rsi_thresholds_are_exclusive() {
        assert_eq!(inputs(0.0, 0.0, 0.0, Some(55.0)).score(), 0);
        assert_eq!(inputs(0.0, 0.0, 0.0, Some(45.0)).score(), 0);
        assert_eq!(inputs(0.0, 0.0, 0.0, None).score(), 0);
    }

    #[test]
    fn one_positive_vote_stays_neutral() {
        assert_eq!(TrendSignal::classify(&inputs(101.0, 100.0, -1.0, Some(50.0))), TrendSignal::Neutral);
    }
}
