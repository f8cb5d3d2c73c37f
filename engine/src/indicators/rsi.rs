// Relative Strength Index (RSI) indicator implementation
use super::{closes, IndicatorCalculator, Series};
use serde_json::Value;
use shared::models::Bar;

/// Wilder-smoothed RSI.
///
/// Index 0 and the first `period` price changes only feed the raw gain/loss
/// sums, so the first defined value sits at index `period + 1`. From there the
/// sums are smoothed with `avg = (avg * (period - 1) + x) / period`. A zero
/// average loss yields exactly 100.
pub fn rsi(values: &[f64], period: usize) -> Series {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let p = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (idx, pair) in values.windows(2).enumerate() {
        let i = idx + 1;
        let change = pair[1] - pair[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i <= period {
            avg_gain += gain;
            avg_loss += loss;
            continue;
        }

        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Bar]) -> Series {
        rsi(&closes(data), self.period)
    }
}
