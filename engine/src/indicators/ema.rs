// Exponential Moving Average (EMA) indicator implementation
use super::{closes, IndicatorCalculator, Series};
use serde_json::Value;
use shared::models::Bar;

/// EMA with smoothing factor `2 / (period + 1)`.
///
/// The first output is seeded with the first input rather than with an SMA of
/// the first `period` values, so the series is defined at every index and its
/// early values lean towards `values[0]`. The recurrence
/// `v * k + prev * (1 - k)` is evaluated as `prev + k * (v - prev)`, which keeps
/// a constant input exactly constant. The two forms agree algebraically but
/// not bitwise: results can differ from the literal form by a few ulps (about
/// 1e-12 on prices near 2000), and the literal form drifts on constants
/// (period 9 over 3.3 gives 3.3000000000000007).
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            None => v,
            Some(p) => p + k * (v - p),
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Bar]) -> Series {
        ema(&closes(data), self.period).into_iter().map(Some).collect()
    }
}
