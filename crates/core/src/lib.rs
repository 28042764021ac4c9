//! Position risk engine.
//!
//! This crate turns a lending-protocol account into a risk report:
//! - Unit normalization of raw fixed-point protocol values
//! - Health factor classification (Danger/Warning/Safe)
//! - Single-asset and market-wide liquidation price estimates
//! - Position aggregation over a pluggable lending data source
//! - Dashboard configuration (TOML + environment overrides)

mod aggregator;
pub mod config;
mod error;
pub mod estimator;
mod health;
mod position;
pub mod units;

pub use aggregator::{PositionAggregator, RiskReport, TrackedAsset};
pub use config::{arbitrum_assets, AssetConfig, ContractsConfig, DashboardConfig, FeedsConfig, NetworkConfig};
pub use error::{Result, RiskError};
pub use estimator::{drop_factor, estimate_market_wide, estimate_single_asset, single_asset_price};
pub use health::{classify, RiskLevel, LIQUIDATION_HEALTH_FACTOR, SAFE_HEALTH_FACTOR};
pub use position::{AccountSnapshot, AssetPrice, LiquidationEstimate, LiquidationPrice, ReservePosition};
