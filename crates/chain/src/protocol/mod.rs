//! Protocol abstraction layer for lending data sources.
//!
//! [`LendingDataSource`] is the capability the risk engine's adapter is
//! handed: four read-only views returning raw protocol integers. Values stay
//! in their fixed-point encoding here; normalization happens in the core
//! crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use riskboard_chain::{AaveV3Protocol, LendingDataSource};
//!
//! let protocol = AaveV3Protocol::new(config, provider);
//! let account = protocol.user_account_data(user).await?;
//! let reserve = fetch_reserve(&protocol, weth, user).await?;
//! ```

mod aave_v3;

pub use aave_v3::{AaveV3Config, AaveV3Protocol};

use alloy::primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Aggregate account view (`getUserAccountData`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountData {
    /// Total collateral in base currency (8 decimals)
    pub total_collateral_base: U256,
    /// Total debt in base currency (8 decimals)
    pub total_debt_base: U256,
    /// Remaining borrow capacity in base currency (8 decimals)
    pub available_borrows_base: U256,
    /// Weighted liquidation threshold (basis points)
    pub current_liquidation_threshold: U256,
    /// Weighted loan-to-value (basis points)
    pub ltv: U256,
    /// Health factor (WAD, uint256 max when there is no debt)
    pub health_factor: U256,
}

/// Per-reserve user view (`getUserReserveData`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserReserveData {
    /// aToken balance (asset-native decimals)
    pub current_atoken_balance: U256,
    /// Variable debt (asset-native decimals)
    pub current_variable_debt: U256,
    /// Whether the user has this reserve enabled as collateral
    pub usage_as_collateral_enabled: bool,
}

/// Reserve configuration view (`getReserveConfigurationData`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveConfiguration {
    /// Token decimals
    pub decimals: U256,
    /// Loan-to-value (basis points)
    pub ltv: U256,
    /// Liquidation threshold (basis points)
    pub liquidation_threshold: U256,
    /// Liquidation bonus (basis points, 10500 = 5% bonus)
    pub liquidation_bonus: U256,
    /// Whether the reserve can be used as collateral at all
    pub usage_as_collateral_enabled: bool,
    pub is_active: bool,
    pub is_frozen: bool,
}

/// Everything needed to value one collateral reserve for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveReading {
    pub asset: Address,
    pub user_reserve: UserReserveData,
    pub configuration: ReserveConfiguration,
    /// Oracle price in base currency (8 decimals)
    pub price: U256,
}

/// Read-only lending protocol data source.
#[async_trait]
pub trait LendingDataSource: Send + Sync + Debug {
    /// Get protocol identifier (e.g., "aave-v3").
    fn protocol_id(&self) -> &str;

    /// Fetch aggregate account data for a user.
    async fn user_account_data(&self, user: Address) -> Result<AccountData>;

    /// Fetch a user's balance in one reserve.
    async fn user_reserve_data(&self, asset: Address, user: Address) -> Result<UserReserveData>;

    /// Fetch a reserve's risk configuration.
    async fn reserve_configuration(&self, asset: Address) -> Result<ReserveConfiguration>;

    /// Fetch an asset's oracle price.
    async fn asset_price(&self, asset: Address) -> Result<U256>;
}

/// Fetch user reserve data, reserve configuration and oracle price for one
/// asset concurrently. Fails if any of the three reads fails.
pub async fn fetch_reserve(
    source: &dyn LendingDataSource,
    asset: Address,
    user: Address,
) -> Result<ReserveReading> {
    let (user_reserve, configuration, price) = tokio::try_join!(
        source.user_reserve_data(asset, user),
        source.reserve_configuration(asset),
        source.asset_price(asset),
    )?;

    Ok(ReserveReading {
        asset,
        user_reserve,
        configuration,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StaticSource {
        fail_price: bool,
    }

    #[async_trait]
    impl LendingDataSource for StaticSource {
        fn protocol_id(&self) -> &str {
            "static"
        }

        async fn user_account_data(&self, _user: Address) -> Result<AccountData> {
            Ok(AccountData::default())
        }

        async fn user_reserve_data(&self, _asset: Address, _user: Address) -> Result<UserReserveData> {
            Ok(UserReserveData {
                current_atoken_balance: U256::from(2u64),
                current_variable_debt: U256::ZERO,
                usage_as_collateral_enabled: true,
            })
        }

        async fn reserve_configuration(&self, _asset: Address) -> Result<ReserveConfiguration> {
            Ok(ReserveConfiguration {
                decimals: U256::from(18u64),
                liquidation_threshold: U256::from(8000u64),
                ..Default::default()
            })
        }

        async fn asset_price(&self, _asset: Address) -> Result<U256> {
            if self.fail_price {
                anyhow::bail!("oracle unavailable");
            }
            Ok(U256::from(300_000_000_000u64))
        }
    }

    #[tokio::test]
    async fn test_fetch_reserve_joins_reads() {
        let source = StaticSource { fail_price: false };
        let asset = Address::repeat_byte(1);

        let reading = fetch_reserve(&source, asset, Address::ZERO).await.unwrap();
        assert_eq!(reading.asset, asset);
        assert_eq!(reading.price, U256::from(300_000_000_000u64));
        assert_eq!(reading.configuration.liquidation_threshold, U256::from(8000u64));
        assert!(reading.user_reserve.usage_as_collateral_enabled);
    }

    #[tokio::test]
    async fn test_fetch_reserve_propagates_failure() {
        let source = StaticSource { fail_price: true };
        let result = fetch_reserve(&source, Address::repeat_byte(1), Address::ZERO).await;
        assert!(result.is_err());
    }
}
