// On-Balance Volume (OBV)
use super::{IndicatorCalculator, Series};
use serde_json::Value;
use shared::models::{Bar, VolumeSource};

/// Cumulative volume, seeded at 0: an up-close adds that bar's volume, a
/// down-close subtracts it and an unchanged close leaves the total alone.
/// A missing volume counts as zero.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    let mut total = 0.0;
    out.push(total);
    for (idx, pair) in closes.windows(2).enumerate() {
        let volume = volumes.get(idx + 1).copied().unwrap_or(0.0);
        if pair[1] > pair[0] {
            total += volume;
        } else if pair[1] < pair[0] {
            total -= volume;
        }
        out.push(total);
    }
    out
}

pub struct Obv {
    source: VolumeSource,
}

impl Obv {
    pub fn new(source: VolumeSource) -> Self {
        Self { source }
    }
}

impl IndicatorCalculator for Obv {
    fn name(&self) -> &str {
        "OBV"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "volume_source": self.source })
    }

    fn calculate(&self, data: &[Bar]) -> Series {
        let closes: Vec<f64> = data.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = data.iter().map(|b| b.volume_in(self.source)).collect();
        obv(&closes, &volumes).into_iter().map(Some).collect()
    }
}
