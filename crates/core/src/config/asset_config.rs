//! Tracked asset configuration loading from TOML files.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::aggregator::TrackedAsset;

/// Individual tracked asset (TOML-loadable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Display symbol, also used as the estimate's asset id (e.g., "WETH")
    pub symbol: String,
    /// Underlying token address (as hex string)
    pub token: String,
    /// Market feed id (e.g., CoinGecko "ethereum")
    #[serde(default)]
    pub market_id: Option<String>,
    /// Whether this asset is tracked
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl AssetConfig {
    pub fn new(symbol: &str, token: &str, market_id: Option<&str>) -> Self {
        Self {
            symbol: symbol.to_string(),
            token: token.to_string(),
            market_id: market_id.map(str::to_string),
            active: true,
        }
    }

    /// Parse token address.
    pub fn token_address(&self) -> anyhow::Result<Address> {
        self.token
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid token address '{}' for {}: {}", self.token, self.symbol, e))
    }

    /// Resolve into the adapter's tracked asset.
    pub fn resolve(&self) -> anyhow::Result<TrackedAsset> {
        Ok(TrackedAsset {
            symbol: self.symbol.clone(),
            token: self.token_address()?,
            market_id: self.market_id.clone(),
        })
    }
}

/// Default tracked assets on Arbitrum One.
pub fn arbitrum_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig::new("WETH", "0x82af49447d8a07e3bd95bd0d56f35241523fbab1", Some("ethereum")),
        AssetConfig::new("WBTC", "0x2f2a2543b76a4166549f7aab2e75bef0aefc5b0f", Some("bitcoin")),
    ]
}
