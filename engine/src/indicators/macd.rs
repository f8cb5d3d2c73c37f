// Moving Average Convergence Divergence (MACD)
use super::ema::ema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macd {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// `macd = EMA(fast) - EMA(slow)`, `signal = EMA(macd, signal)` and
/// `histogram = macd - signal`. All three lines are defined at every index
/// because the EMAs are seeded with their first input.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);
    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ema(&macd_line, signal);
    let histogram = macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();
    Macd {
        macd_line,
        signal_line,
        histogram,
    }
}
