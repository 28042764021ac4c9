//! Market-wide liquidation price.
//!
//! Treats the whole portfolio as scaling uniformly with the market and finds
//! the factor at which collateral-at-threshold equals debt:
//!
//! ```text
//! drop_factor = debt / (LT_account × collateral)
//! price*      = price_now × drop_factor
//! ```

use crate::position::{AccountSnapshot, AssetPrice, LiquidationEstimate, LiquidationPrice};

/// Uniform price multiplier at which the account reaches HF = 1.0.
///
/// `None` when the account has no debt or no collateral. A zero liquidation
/// threshold with open debt yields `+inf`.
pub fn drop_factor(account: &AccountSnapshot) -> Option<f64> {
    if !account.has_debt() || account.total_collateral_usd() <= 0.0 {
        return None;
    }
    let collateral_at_threshold = account.collateral_at_threshold();
    if collateral_at_threshold <= 0.0 {
        return Some(f64::INFINITY);
    }
    Some(account.total_debt_usd() / collateral_at_threshold)
}

/// Market-wide estimate for each tracked asset, in input order.
pub fn estimate_market_wide(
    account: &AccountSnapshot,
    tracked: &[AssetPrice],
) -> Vec<LiquidationEstimate> {
    let outcome = |asset: &AssetPrice| match drop_factor(account) {
        None => LiquidationPrice::Unavailable,
        Some(factor) if factor >= 1.0 => LiquidationPrice::AtCurrentPrice,
        Some(factor) => LiquidationPrice::Estimated(asset.price_usd() * factor),
    };

    tracked
        .iter()
        .map(|asset| LiquidationEstimate::new(asset.asset_id(), outcome(asset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> Vec<AssetPrice> {
        vec![
            AssetPrice::new("ETH", 3000.0).unwrap(),
            AssetPrice::new("BTC", 60_000.0).unwrap(),
        ]
    }

    #[test]
    fn test_reference_scenario() {
        let account = AccountSnapshot::new(10_000.0, 6_000.0, 0.8, 1.3333).unwrap();
        assert!((drop_factor(&account).unwrap() - 0.75).abs() < 1e-12);

        let estimates = estimate_market_wide(&account, &prices());
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].asset_id, "ETH");
        assert!((estimates[0].price.value().unwrap() - 2250.0).abs() < 1e-9);
        assert_eq!(estimates[1].asset_id, "BTC");
        assert!((estimates[1].price.value().unwrap() - 45_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_debt_is_unavailable() {
        let account = AccountSnapshot::new(10_000.0, 0.0, 0.8, f64::INFINITY).unwrap();
        assert_eq!(drop_factor(&account), None);
        assert!(estimate_market_wide(&account, &prices())
            .iter()
            .all(|e| e.price == LiquidationPrice::Unavailable));
    }

    #[test]
    fn test_no_collateral_is_unavailable() {
        let account = AccountSnapshot::new(0.0, 500.0, 0.0, 0.0).unwrap();
        assert!(estimate_market_wide(&account, &prices())
            .iter()
            .all(|e| e.price.is_unavailable()));
    }

    #[test]
    fn test_exact_boundary_is_at_current_price() {
        // 8000 at threshold, 8000 debt: factor exactly 1
        let account = AccountSnapshot::new(10_000.0, 8_000.0, 0.8, 1.0).unwrap();
        assert_eq!(drop_factor(&account), Some(1.0));
        assert!(estimate_market_wide(&account, &prices())
            .iter()
            .all(|e| e.price == LiquidationPrice::AtCurrentPrice));
    }

    #[test]
    fn test_past_boundary_is_at_current_price() {
        let account = AccountSnapshot::new(10_000.0, 9_000.0, 0.8, 0.89).unwrap();
        let estimates = estimate_market_wide(&account, &prices());
        assert_eq!(estimates[0].price, LiquidationPrice::AtCurrentPrice);
    }

    #[test]
    fn test_zero_threshold_with_debt() {
        let account = AccountSnapshot::new(10_000.0, 100.0, 0.0, 0.0).unwrap();
        assert_eq!(drop_factor(&account), Some(f64::INFINITY));
        let estimates = estimate_market_wide(&account, &prices());
        assert_eq!(estimates[1].price, LiquidationPrice::AtCurrentPrice);
    }

    #[test]
    fn test_empty_input() {
        let account = AccountSnapshot::new(10_000.0, 6_000.0, 0.8, 1.3333).unwrap();
        assert!(estimate_market_wide(&account, &[]).is_empty());
    }
}
