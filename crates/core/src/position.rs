//! Position value objects consumed by the liquidation estimators.
//!
//! All values are normalized floats. Constructors validate the invariants
//! (ratios in [0, 1], non-negative finite amounts, positive prices) and never
//! clamp. Conversions from raw protocol views go through [`crate::units`]
//! exactly once.

use serde::{Deserialize, Serialize};

use riskboard_chain::{AccountData, ReserveReading};

use crate::error::{Result, RiskError};
use crate::units;

fn check_ratio(field: &'static str, value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RiskError::InvalidRatio { field, value });
    }
    Ok(value)
}

fn check_amount(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(RiskError::InvalidAmount { field, value });
    }
    Ok(value)
}

fn check_price(asset: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RiskError::InvalidPrice {
            asset: asset.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Account-level aggregate figures for one risk query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    total_collateral_usd: f64,
    total_debt_usd: f64,
    liquidation_threshold: f64,
    health_factor: f64,
}

impl AccountSnapshot {
    pub fn new(
        total_collateral_usd: f64,
        total_debt_usd: f64,
        liquidation_threshold: f64,
        health_factor: f64,
    ) -> Result<Self> {
        if health_factor.is_nan() || health_factor < 0.0 {
            return Err(RiskError::InvalidHealthFactor(health_factor));
        }

        Ok(Self {
            total_collateral_usd: check_amount("total_collateral_usd", total_collateral_usd)?,
            total_debt_usd: check_amount("total_debt_usd", total_debt_usd)?,
            liquidation_threshold: check_ratio("liquidation_threshold", liquidation_threshold)?,
            health_factor,
        })
    }

    pub fn total_collateral_usd(&self) -> f64 {
        self.total_collateral_usd
    }

    pub fn total_debt_usd(&self) -> f64 {
        self.total_debt_usd
    }

    /// Weighted liquidation threshold as a ratio (0.80 for 80%).
    pub fn liquidation_threshold(&self) -> f64 {
        self.liquidation_threshold
    }

    pub fn health_factor(&self) -> f64 {
        self.health_factor
    }

    /// Collateral value counted toward the liquidation boundary.
    pub fn collateral_at_threshold(&self) -> f64 {
        self.total_collateral_usd * self.liquidation_threshold
    }

    pub fn has_debt(&self) -> bool {
        self.total_debt_usd > 0.0
    }
}

impl TryFrom<&AccountData> for AccountSnapshot {
    type Error = RiskError;

    fn try_from(data: &AccountData) -> Result<Self> {
        Self::new(
            units::from_base_currency(data.total_collateral_base),
            units::from_base_currency(data.total_debt_base),
            units::from_bps(data.current_liquidation_threshold),
            units::from_wad(data.health_factor),
        )
    }
}

/// One collateral asset held by the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservePosition {
    asset_id: String,
    collateral_amount: f64,
    liquidation_threshold: f64,
    price_usd: f64,
}

impl ReservePosition {
    pub fn new(
        asset_id: impl Into<String>,
        collateral_amount: f64,
        liquidation_threshold: f64,
        price_usd: f64,
    ) -> Result<Self> {
        let asset_id = asset_id.into();
        let price_usd = check_price(&asset_id, price_usd)?;

        Ok(Self {
            collateral_amount: check_amount("collateral_amount", collateral_amount)?,
            liquidation_threshold: check_ratio("liquidation_threshold", liquidation_threshold)?,
            price_usd,
            asset_id,
        })
    }

    /// Normalize an on-chain reserve reading.
    ///
    /// A reserve the user has not enabled as collateral (or that the protocol
    /// does not accept as collateral) contributes a zero collateral amount.
    pub fn from_reading(asset_id: impl Into<String>, reading: &ReserveReading) -> Result<Self> {
        let decimals = units::decimals_from_u256(reading.configuration.decimals)?;
        let counts_as_collateral = reading.user_reserve.usage_as_collateral_enabled
            && reading.configuration.usage_as_collateral_enabled;

        let collateral_amount = if counts_as_collateral {
            units::scale_down(reading.user_reserve.current_atoken_balance, decimals)
        } else {
            0.0
        };

        Self::new(
            asset_id,
            collateral_amount,
            units::from_bps(reading.configuration.liquidation_threshold),
            units::from_base_currency(reading.price),
        )
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn collateral_amount(&self) -> f64 {
        self.collateral_amount
    }

    /// Reserve liquidation threshold as a ratio.
    pub fn liquidation_threshold(&self) -> f64 {
        self.liquidation_threshold
    }

    pub fn price_usd(&self) -> f64 {
        self.price_usd
    }

    /// Current value counted toward the liquidation boundary.
    pub fn value_at_threshold(&self) -> f64 {
        self.collateral_amount * self.price_usd * self.liquidation_threshold
    }
}

/// Current price of a tracked asset, as fed to the market-wide estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPrice {
    asset_id: String,
    price_usd: f64,
}

impl AssetPrice {
    pub fn new(asset_id: impl Into<String>, price_usd: f64) -> Result<Self> {
        let asset_id = asset_id.into();
        let price_usd = check_price(&asset_id, price_usd)?;
        Ok(Self { asset_id, price_usd })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn price_usd(&self) -> f64 {
        self.price_usd
    }
}

/// Outcome of a liquidation price estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "price_usd", rename_all = "snake_case")]
pub enum LiquidationPrice {
    /// Price (USD) at which the position reaches HF = 1.0
    Estimated(f64),
    /// Position is already at or past the boundary at current prices
    AtCurrentPrice,
    /// No meaningful estimate (no debt, no collateral in this asset, or the
    /// asset's price alone cannot drive the position to HF = 1.0)
    Unavailable,
}

impl LiquidationPrice {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Estimated(price) => Some(*price),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Liquidation price estimate for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationEstimate {
    pub asset_id: String,
    pub price: LiquidationPrice,
}

impl LiquidationEstimate {
    pub fn new(asset_id: impl Into<String>, price: LiquidationPrice) -> Self {
        Self {
            asset_id: asset_id.into(),
            price,
        }
    }

    pub fn unavailable(asset_id: impl Into<String>) -> Self {
        Self::new(asset_id, LiquidationPrice::Unavailable)
    }
}
