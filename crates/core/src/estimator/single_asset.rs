//! Single-asset liquidation price.
//!
//! Subtracts the risk-weighted contribution of every other position from the
//! liquidation boundary, then solves HF = 1.0 for this asset's price:
//!
//! ```text
//! other    = max(collateral × LT_account − amount × price × LT_asset, 0)
//! residual = debt − other
//! price*   = residual / (amount × LT_asset)
//! ```

use crate::position::{AccountSnapshot, LiquidationEstimate, LiquidationPrice, ReservePosition};

/// Price of `asset` at which the account's health factor reaches 1.0,
/// assuming only that asset's price moves.
pub fn single_asset_price(account: &AccountSnapshot, asset: &ReservePosition) -> LiquidationPrice {
    let weighted_amount = asset.collateral_amount() * asset.liquidation_threshold();
    if weighted_amount <= 0.0 {
        return LiquidationPrice::Unavailable;
    }

    // No debt or no collateral: nothing to liquidate
    if !account.has_debt() || account.total_collateral_usd() <= 0.0 {
        return LiquidationPrice::Unavailable;
    }

    let other_at_threshold =
        (account.collateral_at_threshold() - asset.value_at_threshold()).max(0.0);
    let residual_debt = account.total_debt_usd() - other_at_threshold;

    // Other collateral alone keeps HF >= 1.0
    if residual_debt <= 0.0 {
        return LiquidationPrice::Unavailable;
    }

    let price = residual_debt / weighted_amount;
    if !price.is_finite() {
        return LiquidationPrice::Unavailable;
    }

    LiquidationPrice::Estimated(price)
}

/// Single-asset estimate tagged with the asset id.
pub fn estimate_single_asset(
    account: &AccountSnapshot,
    asset: &ReservePosition,
) -> LiquidationEstimate {
    LiquidationEstimate::new(asset.asset_id(), single_asset_price(account, asset))
}
