//! AAVE V3 implementation of [`LendingDataSource`].
//!
//! Works with AAVE V3 deployments and forks exposing the standard Pool,
//! Protocol Data Provider and AaveOracle views.

use super::{AccountData, LendingDataSource, ReserveConfiguration, UserReserveData};
use crate::contracts::{IAaveOracle, IPool, IPoolDataProvider};
use crate::provider::ProviderManager;
use alloy::primitives::{Address, U256};
use alloy::providers::ProviderBuilder;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Contract addresses for an AAVE V3 market.
#[derive(Debug, Clone)]
pub struct AaveV3Config {
    /// Protocol identifier
    pub protocol_id: String,
    /// Pool contract address
    pub pool_address: Address,
    /// Protocol Data Provider address
    pub data_provider_address: Address,
    /// AaveOracle address
    pub oracle_address: Address,
}

impl Default for AaveV3Config {
    fn default() -> Self {
        Self {
            protocol_id: "aave-v3".to_string(),
            pool_address: Address::ZERO,
            data_provider_address: Address::ZERO,
            oracle_address: Address::ZERO,
        }
    }
}

/// AAVE V3 protocol reader.
#[derive(Debug)]
pub struct AaveV3Protocol {
    /// Protocol configuration
    config: AaveV3Config,
    /// Provider manager for RPC calls
    provider: Arc<ProviderManager>,
}

impl AaveV3Protocol {
    /// Create a new AAVE V3 reader.
    pub fn new(config: AaveV3Config, provider: Arc<ProviderManager>) -> Self {
        Self { config, provider }
    }

    /// Get the configured contract addresses.
    pub fn config(&self) -> &AaveV3Config {
        &self.config
    }
}

#[async_trait]
impl LendingDataSource for AaveV3Protocol {
    fn protocol_id(&self) -> &str {
        &self.config.protocol_id
    }

    async fn user_account_data(&self, user: Address) -> Result<AccountData> {
        debug!(user = %user, pool = %self.config.pool_address, "Fetching account data");

        let provider = ProviderBuilder::new().on_http(self.provider.rpc_url().parse()?);
        let pool = IPool::new(self.config.pool_address, &provider);

        let data = pool
            .getUserAccountData(user)
            .call()
            .await
            .context("getUserAccountData failed")?;

        Ok(AccountData {
            total_collateral_base: data.totalCollateralBase,
            total_debt_base: data.totalDebtBase,
            available_borrows_base: data.availableBorrowsBase,
            current_liquidation_threshold: data.currentLiquidationThreshold,
            ltv: data.ltv,
            health_factor: data.healthFactor,
        })
    }

    async fn user_reserve_data(&self, asset: Address, user: Address) -> Result<UserReserveData> {
        debug!(user = %user, asset = %asset, "Fetching user reserve data");

        let provider = ProviderBuilder::new().on_http(self.provider.rpc_url().parse()?);
        let data_provider = IPoolDataProvider::new(self.config.data_provider_address, &provider);

        let data = data_provider
            .getUserReserveData(asset, user)
            .call()
            .await
            .context("getUserReserveData failed")?;

        Ok(UserReserveData {
            current_atoken_balance: data.currentATokenBalance,
            current_variable_debt: data.currentVariableDebt,
            usage_as_collateral_enabled: data.usageAsCollateralEnabled,
        })
    }

    async fn reserve_configuration(&self, asset: Address) -> Result<ReserveConfiguration> {
        debug!(asset = %asset, "Fetching reserve configuration");

        let provider = ProviderBuilder::new().on_http(self.provider.rpc_url().parse()?);
        let data_provider = IPoolDataProvider::new(self.config.data_provider_address, &provider);

        let cfg = data_provider
            .getReserveConfigurationData(asset)
            .call()
            .await
            .context("getReserveConfigurationData failed")?;

        Ok(ReserveConfiguration {
            decimals: cfg.decimals,
            ltv: cfg.ltv,
            liquidation_threshold: cfg.liquidationThreshold,
            liquidation_bonus: cfg.liquidationBonus,
            usage_as_collateral_enabled: cfg.usageAsCollateralEnabled,
            is_active: cfg.isActive,
            is_frozen: cfg.isFrozen,
        })
    }

    async fn asset_price(&self, asset: Address) -> Result<U256> {
        let provider = ProviderBuilder::new().on_http(self.provider.rpc_url().parse()?);
        let oracle = IAaveOracle::new(self.config.oracle_address, &provider);

        let price = oracle
            .getAssetPrice(asset)
            .call()
            .await
            .context("getAssetPrice failed")?;

        debug!(asset = %asset, price = %price._0, "Oracle price fetched");
        Ok(price._0)
    }
}
