// Simple Moving Average (SMA) and rolling standard deviation
use super::{closes, IndicatorCalculator, Series};
use serde_json::Value;
use shared::models::Bar;

/// Running-sum SMA, defined once a full window of `period` values has been seen.
pub fn sma(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out.push(Some(sum / period as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Population standard deviation (divides by `period`) over the `period` most
/// recent values.
///
/// Each output makes two passes over its own window slice, O(period) per index.
/// Values are shifted by the window's first element before averaging, so a
/// window of equal values gives exactly `0.0` even for a constant like `0.1`.
pub fn stdev(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    let p = period as f64;
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let origin = window[0];
            let mean = window.iter().map(|x| x - origin).sum::<f64>() / p;
            let variance = window.iter().map(|x| (x - origin - mean).powi(2)).sum::<f64>() / p;
            Some(variance.sqrt())
        })
        .collect()
}

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("SMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Bar]) -> Series {
        sma(&closes(data), self.period)
    }
}

pub struct Stdev {
    name: String,
    period: usize,
}

impl Stdev {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("STDEV({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Stdev {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Bar]) -> Series {
        stdev(&closes(data), self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_series_eq(a: &[Option<f64>], b: &[Option<f64>]) {
        assert_eq!(a.len(), b.len(), "Series differ in length");
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            match (x, y) {
                (None, None) => {}
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9, "Mismatch at index {}: {} != {}", i, x, y),
                _ => panic!("Mismatch at index {}: {:?} != {:?}", i, x, y),
            }
        }
    }

    #[test]
    fn test_sma_calculation() {
        let results = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_series_eq(&results, &[None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_sma_insufficient_data() {
        assert_series_eq(&sma(&[1.0, 2.0], 3), &[None, None]);
    }

    #[test]
    fn test_sma_period_one() {
        assert_series_eq(&sma(&[1.0, 2.0, 3.0], 1), &[Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_sma_empty_data() {
        assert!(sma(&[], 3).is_empty());
    }

    #[test]
    fn zero_period_is_undefined_everywhere() {
        assert_series_eq(&sma(&[1.0, 2.0], 0), &[None, None]);
        assert_series_eq(&stdev(&[1.0, 2.0], 0), &[None, None]);
    }

    #[test]
    fn stdev_is_population_deviation() {
        // window [2,4,4,4,5,5,7,9]: mean 5, population sd 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let out = stdev(&values, 8);
        assert!(out[..7].iter().all(Option::is_none));
        assert_series_eq(&out[7..], &[Some(2.0)]);
    }

    #[test]
    fn stdev_of_constant_input_is_zero() {
        let out = stdev(&[7.25; 30], 20);
        assert!(out[..19].iter().all(Option::is_none));
        assert!(out[19..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn stdev_of_inexact_constant_is_exactly_zero() {
        let out = stdev(&[0.1; 40], 20);
        assert!(out[19..].iter().all(|v| *v == Some(0.0)));

        // flat stretch after moving prices
        let out = stdev(&[1.3, 2.7, 0.1, 0.1, 0.1], 3);
        assert_eq!(out[4], Some(0.0));
    }

    #[test]
    fn stdev_window_slides() {
        let out = stdev(&[1.0, 3.0, 5.0, 5.0], 2);
        assert_series_eq(&out, &[None, Some(1.0), Some(1.0), Some(0.0)]);
    }
}
