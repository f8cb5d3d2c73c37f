// Technical indicators module
//
// Every function here is a pure transform over an ordered input slice. Series
// are aligned to their input: element `i` belongs to bar `i`, and `None` marks
// an index still inside the indicator's warm-up window.
//
// `IndicatorEngine` calls the free functions directly. `calculator_for` is
// library API for callers that want one named series built from JSON
// parameters; the engine does not go through it.
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod trend;
pub mod volume_profile;

pub use bollinger::{bollinger, BollingerBands};
pub use ema::{ema, Ema};
pub use macd::{macd, Macd};
pub use obv::{obv, Obv};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, stdev, Sma, Stdev};
pub use trend::{TrendInputs, TrendSignal};
pub use volume_profile::{volume_profile, PriceLevel, VolumeProfile};

use crate::error::EngineError;
use serde_json::Value;
use shared::models::{Bar, VolumeSource};

/// An indicator series aligned to its input.
pub type Series = Vec<Option<f64>>;

// Common trait for single-line indicators computed straight from bars.
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value;
    fn calculate(&self, data: &[Bar]) -> Series;
}

pub(crate) fn closes(data: &[Bar]) -> Vec<f64> {
    data.iter().map(|b| b.close).collect()
}

/// Builds a calculator by kind (`sma`, `ema`, `stdev`, `rsi`, `obv`) from JSON
/// parameters, e.g. `{"period": 21}` or `{"volume_source": "quote"}`.
pub fn calculator_for(kind: &str, parameters: &Value) -> Result<Box<dyn IndicatorCalculator>, EngineError> {
    let calculator: Box<dyn IndicatorCalculator> = match kind.trim().to_lowercase().as_str() {
        "sma" => Box::new(Sma::new(period_param(parameters, 20)?)),
        "ema" => Box::new(Ema::new(period_param(parameters, 20)?)),
        "stdev" => Box::new(Stdev::new(period_param(parameters, 20)?)),
        "rsi" => Box::new(Rsi::new(period_param(parameters, 14)?)),
        "obv" => {
            let source = match parameters.get("volume_source") {
                Some(v) => serde_json::from_value::<VolumeSource>(v.clone())
                    .map_err(|e| EngineError::InvalidParameter(format!("volume_source: {}", e)))?,
                None => VolumeSource::default(),
            };
            Box::new(Obv::new(source))
        }
        other => {
            return Err(EngineError::InvalidParameter(format!("Unknown indicator type: {}", other)));
        }
    };
    Ok(calculator)
}

fn period_param(parameters: &Value, default: usize) -> Result<usize, EngineError> {
    let period = match parameters.get("period") {
        None | Some(Value::Null) => default,
        Some(v) => v
            .as_u64()
            .and_then(|p| usize::try_from(p).ok())
            .ok_or_else(|| EngineError::InvalidParameter(format!("period must be a positive integer, got {}", v)))?,
    };
    if period == 0 {
        return Err(EngineError::InvalidParameter("Indicator period cannot be 0".to_string()));
    }
    Ok(period)
}

#[cfg(test)]
pub(crate) mod test_support {
    use shared::models::Bar;

    pub fn bar_at(i: usize, close: f64) -> Bar {
        Bar {
            start_time: 1_700_000_000_000 + i as i64 * 60_000,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
            turnover: None,
        }
    }

    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes.iter().enumerate().map(|(i, c)| bar_at(i, *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::bars_from_closes;
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_calculators_by_name() {
        let ema = calculator_for("EMA", &json!({ "period": 9 })).unwrap();
        assert_eq!(ema.name(), "EMA(9)");
        assert_eq!(ema.parameters(), json!({ "period": 9 }));

        let rsi = calculator_for("rsi", &json!({})).unwrap();
        assert_eq!(rsi.name(), "RSI(14)");
    }

    #[test]
    fn rejects_unknown_kind_and_zero_period() {
        assert!(matches!(
            calculator_for("vwap", &json!({})),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(matches!(
            calculator_for("sma", &json!({ "period": 0 })),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(matches!(
            calculator_for("sma", &json!({ "period": "ten" })),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn calculators_align_with_input() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        for kind in ["sma", "ema", "stdev", "rsi", "obv"] {
            let calc = calculator_for(kind, &json!({ "period": 2 })).unwrap();
            assert_eq!(calc.calculate(&bars).len(), bars.len(), "{}", kind);
        }
    }
}
