//! Dashboard configuration with TOML loading and environment overrides.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use riskboard_chain::AaveV3Config;

use super::asset_config::{arbitrum_assets, AssetConfig};
use crate::aggregator::TrackedAsset;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Network and RPC endpoint
    #[serde(default)]
    pub network: NetworkConfig,

    /// Lending protocol contract addresses
    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Tracked collateral assets
    #[serde(default = "arbitrum_assets")]
    pub assets: Vec<AssetConfig>,

    /// Market and sentiment feeds
    #[serde(default)]
    pub feeds: FeedsConfig,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Expected chain ID; the RPC endpoint must match
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// HTTP RPC URL (`${VAR}` is expanded from the environment)
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
}

fn default_chain_id() -> u64 {
    42161
}
fn default_rpc_url() -> String {
    "https://arb1.arbitrum.io/rpc".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            rpc_url: default_rpc_url(),
        }
    }
}

/// AAVE V3 contract addresses (hex strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    #[serde(default = "default_pool")]
    pub pool: String,

    #[serde(default = "default_data_provider")]
    pub data_provider: String,

    #[serde(default = "default_oracle")]
    pub oracle: String,
}

fn default_pool() -> String {
    "0x794a61358D6845594F94dc1DB02A252b5b4814aD".to_string()
}
fn default_data_provider() -> String {
    "0xa170dba2cd1f68cdde8551c9e4b907bc6e0c9097".to_string()
}
fn default_oracle() -> String {
    "0x13C9c8ad3E14f0C4C9Ff5C4DB41dA0E0Cf3A32FA".to_string()
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            pool: default_pool(),
            data_provider: default_data_provider(),
            oracle: default_oracle(),
        }
    }
}

impl ContractsConfig {
    /// Parse addresses into the chain crate's protocol config.
    pub fn resolve(&self) -> Result<AaveV3Config> {
        let parse = |name: &str, s: &str| -> Result<Address> {
            s.parse()
                .map_err(|e| anyhow::anyhow!("Invalid {} address '{}': {}", name, s, e))
        };

        Ok(AaveV3Config {
            pool_address: parse("pool", &self.pool)?,
            data_provider_address: parse("data_provider", &self.data_provider)?,
            oracle_address: parse("oracle", &self.oracle)?,
            ..Default::default()
        })
    }
}

/// Market price and sentiment feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Use market prices for the market-wide estimate (falls back to oracle)
    #[serde(default = "default_true")]
    pub enable_market_feed: bool,

    /// Fetch the sentiment index
    #[serde(default = "default_true")]
    pub enable_sentiment: bool,

    #[serde(default = "default_market_api_url")]
    pub market_api_url: String,

    #[serde(default = "default_sentiment_api_url")]
    pub sentiment_api_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Market quote cache TTL (seconds)
    #[serde(default = "default_quote_cache_ttl")]
    pub quote_cache_ttl_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_market_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_sentiment_api_url() -> String {
    "https://api.alternative.me".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_quote_cache_ttl() -> u64 {
    300
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            enable_market_feed: default_true(),
            enable_sentiment: default_true(),
            market_api_url: default_market_api_url(),
            sentiment_api_url: default_sentiment_api_url(),
            request_timeout_secs: default_request_timeout(),
            quote_cache_ttl_secs: default_quote_cache_ttl(),
        }
    }
}

impl FeedsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
    pub fn quote_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_cache_ttl_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            contracts: ContractsConfig::default(),
            assets: arbitrum_assets(),
            feeds: FeedsConfig::default(),
        }
    }
}

/// Expand a `${VAR}` reference; anything else is returned unchanged.
fn expand_env(s: &str) -> String {
    if s.starts_with("${") && s.ends_with('}') {
        let var_name = &s[2..s.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else {
        s.to_string()
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.network.rpc_url = expand_env(&config.network.rpc_url);
        Ok(config)
    }

    /// Load from `CONFIG_PATH` if set, else defaults; then apply environment
    /// overrides (`RPC_URL`, `CHAIN_ID`).
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `RPC_URL` and `CHAIN_ID` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Ok(chain_id) = std::env::var("CHAIN_ID") {
            self.network.chain_id = chain_id
                .parse()
                .with_context(|| format!("Invalid CHAIN_ID '{}'", chain_id))?;
        }
        Ok(())
    }

    /// Resolve the active tracked assets.
    pub fn tracked_assets(&self) -> Result<Vec<TrackedAsset>> {
        self.assets
            .iter()
            .filter(|a| a.active)
            .map(AssetConfig::resolve)
            .collect()
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(
            chain_id = self.network.chain_id,
            rpc = %self.network.rpc_url,
            "Network configuration loaded"
        );
        tracing::info!(
            pool = %self.contracts.pool,
            data_provider = %self.contracts.data_provider,
            oracle = %self.contracts.oracle,
            "Protocol contracts"
        );
        tracing::info!(
            assets = ?self.assets.iter().filter(|a| a.active).map(|a| a.symbol.as_str()).collect::<Vec<_>>(),
            "Tracked assets"
        );
        tracing::info!(
            market_feed = self.feeds.enable_market_feed,
            sentiment = self.feeds.enable_sentiment,
            timeout_secs = self.feeds.request_timeout_secs,
            cache_ttl_secs = self.feeds.quote_cache_ttl_secs,
            "Feed settings"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.network.chain_id, 42161);
        assert_eq!(config.assets.len(), 2);
        assert_eq!(config.feeds.quote_cache_ttl(), Duration::from_secs(300));
        assert!(config.contracts.resolve().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            [network]
            rpc_url = "https://example.invalid/rpc"

            [[assets]]
            symbol = "WETH"
            token = "0x82af49447d8a07e3bd95bd0d56f35241523fbab1"
            market_id = "ethereum"

            [[assets]]
            symbol = "ARB"
            token = "0x912CE59144191C1204E64559FE8253a0e49E6548"
            active = false
            "#,
        )
        .unwrap();

        assert_eq!(config.network.chain_id, 42161);
        assert_eq!(config.network.rpc_url, "https://example.invalid/rpc");
        assert_eq!(config.contracts.pool, default_pool());

        let tracked = config.tracked_assets().unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].symbol, "WETH");
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("RISKBOARD_TEST_RPC", "https://rpc.example.invalid");

        assert_eq!(expand_env("${RISKBOARD_TEST_RPC}"), "https://rpc.example.invalid");
        assert_eq!(expand_env("literal"), "literal");
        assert_eq!(expand_env("${RISKBOARD_NONEXISTENT}"), "${RISKBOARD_NONEXISTENT}");

        let config = DashboardConfig::from_toml(
            r#"
            [network]
            rpc_url = "${RISKBOARD_TEST_RPC}"
            "#,
        )
        .unwrap();
        assert_eq!(config.network.rpc_url, "https://rpc.example.invalid");

        std::env::remove_var("RISKBOARD_TEST_RPC");
    }

    #[test]
    fn test_sample_config() {
        let config = DashboardConfig::from_toml(include_str!("../../../../config/arbitrum.toml")).unwrap();
        assert_eq!(config.network.chain_id, 42161);
        assert_eq!(config.assets.len(), 3);
        assert_eq!(config.tracked_assets().unwrap().len(), 2);
        assert!(config.contracts.resolve().is_ok());
    }

    // Single test: RPC_URL, CHAIN_ID and CONFIG_PATH are process-wide
    #[test]
    fn test_env_overrides_and_config_path() {
        let mut config = DashboardConfig::default();
        std::env::set_var("RPC_URL", "http://localhost:8545");
        std::env::set_var("CHAIN_ID", "1");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.network.rpc_url, "http://localhost:8545");
        assert_eq!(config.network.chain_id, 1);

        std::env::set_var("CHAIN_ID", "abc");
        let err = config.apply_env_overrides().unwrap_err().to_string();
        assert!(err.contains("Invalid CHAIN_ID"));

        std::env::remove_var("RPC_URL");
        std::env::remove_var("CHAIN_ID");
        std::env::set_var(
            "CONFIG_PATH",
            concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/arbitrum.toml"),
        );
        let loaded = DashboardConfig::load().unwrap();
        assert_eq!(loaded.assets.len(), 3);
        assert_eq!(loaded.network.chain_id, 42161);

        std::env::set_var("CONFIG_PATH", "/nonexistent/riskboard.toml");
        assert!(DashboardConfig::load().is_err());
        std::env::remove_var("CONFIG_PATH");
    }

    #[test]
    fn test_invalid_contract_address() {
        let contracts = ContractsConfig {
            pool: "not-an-address".to_string(),
            ..Default::default()
        };
        assert!(contracts.resolve().is_err());
    }

    #[test]
    fn test_serialization() {
        let config = DashboardConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("chain_id = 42161"));

        let parsed = DashboardConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.assets, config.assets);
    }
}
