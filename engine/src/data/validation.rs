use crate::error::EngineError;
use shared::models::Bar;

/// Checks the invariants the indicator engine relies on: strictly ascending
/// unique timestamps, positive finite prices with `low <= open, close <= high`,
/// and non-negative volumes.
pub fn validate_bars(bars: &[Bar]) -> Result<(), EngineError> {
    for (i, bar) in bars.iter().enumerate() {
        validate_bar(i, bar)?;
    }
    if let Some((i, pair)) = bars
        .windows(2)
        .enumerate()
        .find(|(_, pair)| pair[1].start_time <= pair[0].start_time)
    {
        return Err(EngineError::MarketDataError(format!(
            "bars out of order at index {}: {} follows {}",
            i + 1,
            pair[1].start_time,
            pair[0].start_time
        )));
    }
    Ok(())
}

fn validate_bar(i: usize, bar: &Bar) -> Result<(), EngineError> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Err(EngineError::MarketDataError(format!(
            "bar {} at {} has a non-positive or non-finite price",
            i, bar.start_time
        )));
    }
    if bar.low > bar.open.min(bar.close) || bar.high < bar.open.max(bar.close) {
        return Err(EngineError::MarketDataError(format!(
            "bar {} at {} has open/close outside its low/high range",
            i, bar.start_time
        )));
    }
    let volume_ok = bar.volume.is_finite() && bar.volume >= 0.0;
    let turnover_ok = bar.turnover.map_or(true, |t| t.is_finite() && t >= 0.0);
    if !volume_ok || !turnover_ok {
        return Err(EngineError::MarketDataError(format!(
            "bar {} at {} has a negative or non-finite volume",
            i, bar.start_time
        )));
    }
    Ok(())
}
