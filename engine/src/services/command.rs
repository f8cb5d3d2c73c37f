// Chat command parsing: `/eth15m`, `/btc4h`, `/link24h`, `/help`
use crate::error::EngineError;
use serde::Serialize;
use shared::models::Timeframe;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    /// Upper-cased command coin, e.g. `ETH`.
    pub coin: String,
    /// Exchange symbol, e.g. `ETHUSDT`.
    pub symbol: String,
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Report(ReportRequest),
}

/// Parses `/<coin><n><m|h|d>` against the configured coin map.
///
/// Matching is case-insensitive and ignores surrounding whitespace. The
/// `<n><suffix>` part must name a supported timeframe, so `/eth24h` is valid
/// while `/eth24d` and `/eth3h` are not.
pub fn parse_command(text: &str, coins: &BTreeMap<String, String>) -> Result<Command, EngineError> {
    let normalized = text.trim().to_lowercase();
    let body = normalized
        .strip_prefix('/')
        .ok_or_else(|| EngineError::CommandError(text.trim().to_string()))?;

    if body == "start" || body == "help" {
        return Ok(Command::Help);
    }

    let unrecognized = || EngineError::CommandError(text.trim().to_string());

    let digits_at = body.find(|c: char| c.is_ascii_digit()).ok_or_else(unrecognized)?;
    let (coin, tf_label) = body.split_at(digits_at);
    if coin.is_empty() || !coin.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(unrecognized());
    }

    let symbol = coins.get(coin).ok_or_else(unrecognized)?;
    let timeframe = tf_label.parse::<Timeframe>().map_err(|_| unrecognized())?;

    Ok(Command::Report(ReportRequest {
        coin: coin.to_uppercase(),
        symbol: symbol.clone(),
        timeframe,
    }))
}

/// Lists every accepted command for the configured coins.
pub fn help_text(coins: &BTreeMap<String, String>) -> String {
    let mut lines = vec!["Use commands like:".to_string()];
    for coin in coins.keys() {
        let commands: Vec<String> = Timeframe::ALL
            .iter()
            .map(|tf| format!("/{}{}", coin, tf.label()))
            .collect();
        lines.push(format!("  {}", commands.join(", ")));
    }
    lines.push(
        "Indicators: MACD(12,26,9), OBV, EMA(9/21), RSI(14), Bollinger(20,2), Volume Profile (POC & top nodes)"
            .to_string(),
    );
    lines.join("\n")
}
