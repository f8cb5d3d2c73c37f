// Bollinger Bands
use super::sma::{sma, stdev};
use super::Series;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub basis: Series,
    pub upper: Series,
    pub lower: Series,
}

/// `basis = SMA(period)`, bands at `basis ± mult * stdev(period)`; undefined
/// wherever either input is.
pub fn bollinger(values: &[f64], period: usize, mult: f64) -> BollingerBands {
    let basis = sma(values, period);
    let sd = stdev(values, period);
    let band = |sign: f64| -> Series {
        basis
            .iter()
            .zip(&sd)
            .map(|(b, s)| match (b, s) {
                (Some(b), Some(s)) => Some(b + sign * mult * s),
                _ => None,
            })
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);
    BollingerBands { basis, upper, lower }
}
