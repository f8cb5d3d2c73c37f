// Engine main entry point
use anyhow::Context;
use clap::Parser;
use engine::config::settings::EngineSettings;
use engine::data::bybit::BybitClient;
use engine::data::csv_parser::BarCsvLoader;
use engine::data::market_data::{ticker_from_bars, InMemoryProvider, MarketDataProvider};
use engine::services::command::help_text;
use engine::services::{parse_command, Command, ReportRequest, ReportService};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Builds an indicator report for one chat-style command, e.g. `/eth15m`.
#[derive(Parser, Debug)]
#[command(name = "engine", about = "Bybit indicator reports: MACD, RSI, EMA 9/21, Bollinger, OBV, volume profile")]
struct CliArgs {
    /// JSON settings file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read bars from this CSV export instead of fetching them from Bybit
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Command such as /eth15m, /btc4h or /help
    command: String,
}

async fn run_report<P: MarketDataProvider>(
    provider: P,
    settings: &EngineSettings,
    request: &ReportRequest,
) -> anyhow::Result<()> {
    let service = ReportService::new(provider, settings)?;
    let report = service.build_report(request).await?;
    info!(summary = %report.summary(), "Report ready");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CliArgs::parse();
    let settings = EngineSettings::load(args.config.as_deref()).context("loading engine settings")?;

    let request = match parse_command(&args.command, &settings.coins) {
        Ok(Command::Help) => {
            println!("{}", help_text(&settings.coins));
            return Ok(());
        }
        Ok(Command::Report(request)) => request,
        Err(e) => {
            error!(command = %args.command, "Command not recognized");
            println!("{}", help_text(&settings.coins));
            return Err(e.into());
        }
    };

    match args.csv {
        Some(path) => {
            info!(path = %path.display(), symbol = %request.symbol, "Loading bars from CSV");
            let bars = BarCsvLoader::load_bars_from_csv(&path)?;
            let mut provider = InMemoryProvider::new();
            if let Some(ticker) = ticker_from_bars(&bars, request.timeframe) {
                provider.set_ticker(&request.symbol, ticker);
            }
            provider.add_bars(&request.symbol, request.timeframe, bars);
            run_report(provider, &settings, &request).await
        }
        None => {
            info!(symbol = %request.symbol, timeframe = %request.timeframe, "Fetching from Bybit");
            let client = BybitClient::new(&settings)?;
            run_report(client, &settings, &request).await
        }
    }
}
