//! Riskboard
//!
//! Liquidation risk dashboard for AAVE V3 accounts.
//! Features:
//! - Health factor and risk classification
//! - Single-asset and market-wide liquidation price estimates
//! - Market quotes with 24h trend (CoinGecko)
//! - Fear & Greed sentiment gauge

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use riskboard_api::{CoinGeckoClient, FearGreedClient, MarketQuote, SentimentReading};
use riskboard_chain::{AaveV3Protocol, ProviderManager};
use riskboard_core::{DashboardConfig, PositionAggregator};

use report::DashboardOutput;

/// Environment variable names.
mod env {
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Riskboard CLI
#[derive(Parser)]
#[command(name = "riskboard")]
#[command(version, about = "Liquidation risk dashboard for AAVE V3 accounts")]
struct Cli {
    /// Account address to assess
    address: Address,

    /// Path to a TOML config file (overrides CONFIG_PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Skip market quotes and use oracle prices for the market-wide estimate
    #[arg(long)]
    no_market: bool,

    /// Skip the sentiment index
    #[arg(long)]
    no_sentiment: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let config = load_config(&cli)?;
    config.log_config();

    let provider = Arc::new(ProviderManager::connect(&config.network.rpc_url, config.network.chain_id).await?);
    let protocol = Arc::new(AaveV3Protocol::new(config.contracts.resolve()?, provider));
    info!(
        protocol = %protocol.config().protocol_id,
        pool = %protocol.config().pool_address,
        "Lending protocol reader ready"
    );
    let assets = config.tracked_assets()?;

    let market = if config.feeds.enable_market_feed && !cli.no_market {
        Some(Arc::new(CoinGeckoClient::with_settings(
            config.feeds.market_api_url.clone(),
            config.feeds.request_timeout(),
            config.feeds.quote_cache_ttl(),
        )?))
    } else {
        None
    };
    let sentiment = if config.feeds.enable_sentiment && !cli.no_sentiment {
        Some(FearGreedClient::with_settings(
            config.feeds.sentiment_api_url.clone(),
            config.feeds.request_timeout(),
        )?)
    } else {
        None
    };

    let mut aggregator = PositionAggregator::new(protocol, assets);
    if let Some(market) = &market {
        aggregator = aggregator.with_market_feed(market.clone());
    }

    let market_ids: Vec<String> = aggregator
        .assets()
        .iter()
        .filter_map(|a| a.market_id.clone())
        .collect();

    // Quotes first: the aggregator's market-wide pricing then hits the client cache
    let (quotes, sentiment) = tokio::join!(
        fetch_quotes(market.as_deref(), &market_ids),
        fetch_sentiment(sentiment.as_ref())
    );

    info!(user = %cli.address, "Assessing account");
    let report = aggregator.assess(cli.address).await?;

    let output = DashboardOutput {
        report: &report,
        quotes: &quotes,
        sentiment: sentiment.as_ref(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report::render(&output));
    }

    Ok(())
}

/// Install the tracing subscriber. Logs go to stderr so `--json` output
/// stays machine-readable; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let json = std::env::var(env::LOG_FORMAT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,riskboard_core=debug,riskboard_chain=debug")),
        )
        .init();
}

/// Load configuration from `--config`, else `CONFIG_PATH`, else defaults.
fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    match &cli.config {
        Some(path) => {
            let mut config = DashboardConfig::from_file(path)?;
            config.apply_env_overrides()?;
            Ok(config)
        }
        None => DashboardConfig::load().context("Failed to load configuration"),
    }
}

async fn fetch_quotes(client: Option<&CoinGeckoClient>, ids: &[String]) -> Vec<MarketQuote> {
    let Some(client) = client else {
        return Vec::new();
    };
    match client.markets(ids).await {
        Ok(quotes) => quotes,
        Err(e) => {
            warn!(error = %e, "Failed to load market quotes");
            Vec::new()
        }
    }
}

async fn fetch_sentiment(client: Option<&FearGreedClient>) -> Option<SentimentReading> {
    let client = client?;
    match client.latest().await {
        Ok(reading) => Some(reading),
        Err(e) => {
            warn!(error = %e, "Failed to load sentiment index");
            None
        }
    }
}
