//! Liquidation price estimators.
//!
//! Two first-order models answering different questions:
//! - [`single_asset`]: only one collateral asset's price moves, everything
//!   else held fixed. Needs that asset's balance and threshold.
//! - [`market_wide`]: every tracked price moves by the same proportion. Needs
//!   only the account aggregates and current prices.
//!
//! Neither models protocol liquidation mechanics (close factor, bonus,
//! interest accrual, cascades).

pub mod market_wide;
pub mod single_asset;

pub use market_wide::{drop_factor, estimate_market_wide};
pub use single_asset::{estimate_single_asset, single_asset_price};
