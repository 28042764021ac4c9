//! Configuration for the risk dashboard.
//!
//! - Network (chain id, RPC endpoint)
//! - Lending protocol contract addresses
//! - Tracked collateral assets
//! - Market and sentiment feed settings

mod asset_config;
mod dashboard;

pub use asset_config::{arbitrum_assets, AssetConfig};
pub use dashboard::{ContractsConfig, DashboardConfig, FeedsConfig, NetworkConfig};
