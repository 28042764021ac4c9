//! Position aggregator.
//!
//! Fetches a user's account view and per-asset reserve views from a
//! [`LendingDataSource`], normalizes them and runs both liquidation
//! estimators. Per-asset failures degrade that asset to `Unavailable`;
//! only a failed account read aborts the assessment.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use riskboard_api::MarketFeed;
use riskboard_chain::{fetch_reserve, LendingDataSource};

use crate::estimator::{estimate_market_wide, estimate_single_asset};
use crate::health::RiskLevel;
use crate::position::{AccountSnapshot, AssetPrice, LiquidationEstimate, ReservePosition};

/// An asset whose liquidation price is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedAsset {
    /// Display symbol, used as the estimate's asset id
    pub symbol: String,
    /// Underlying token address
    pub token: Address,
    /// Market feed id (e.g., CoinGecko "ethereum")
    pub market_id: Option<String>,
}

/// Full risk assessment for one account.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub user: Address,
    pub account: AccountSnapshot,
    pub risk: RiskLevel,
    /// Per-asset estimate, holding every other asset constant
    pub single_asset: Vec<LiquidationEstimate>,
    /// Per-asset estimate, assuming the whole market moves together
    pub market_wide: Vec<LiquidationEstimate>,
    pub generated_at: DateTime<Utc>,
}

/// Stateless adapter between a lending data source and the estimators.
#[derive(Debug, Clone)]
pub struct PositionAggregator {
    source: Arc<dyn LendingDataSource>,
    market: Option<Arc<dyn MarketFeed>>,
    assets: Vec<TrackedAsset>,
}

impl PositionAggregator {
    pub fn new(source: Arc<dyn LendingDataSource>, assets: Vec<TrackedAsset>) -> Self {
        Self {
            source,
            market: None,
            assets,
        }
    }

    /// Price the market-wide estimate from a market feed instead of the oracle.
    pub fn with_market_feed(mut self, market: Arc<dyn MarketFeed>) -> Self {
        self.market = Some(market);
        self
    }

    pub fn assets(&self) -> &[TrackedAsset] {
        &self.assets
    }

    /// Assess a user's liquidation risk.
    pub async fn assess(&self, user: Address) -> Result<RiskReport> {
        let account_data = self
            .source
            .user_account_data(user)
            .await
            .with_context(|| format!("Failed to fetch account data for {}", user))?;

        let account = AccountSnapshot::try_from(&account_data).context("Invalid account data")?;
        let risk = RiskLevel::from_health_factor(account.health_factor())?;

        info!(
            user = %user,
            protocol = self.source.protocol_id(),
            collateral_usd = account.total_collateral_usd(),
            debt_usd = account.total_debt_usd(),
            health_factor = account.health_factor(),
            risk = %risk,
            "Account assessed"
        );

        if !account.has_debt() {
            debug!(user = %user, "No debt, skipping reserve reads");
            let unavailable = || {
                self.assets
                    .iter()
                    .map(|a| LiquidationEstimate::unavailable(&a.symbol))
                    .collect::<Vec<_>>()
            };
            return Ok(RiskReport {
                user,
                account,
                risk,
                single_asset: unavailable(),
                market_wide: unavailable(),
                generated_at: Utc::now(),
            });
        }

        let reserves = join_all(self.assets.iter().map(|asset| self.load_reserve(asset, user)));
        let (reserves, market_prices) = futures::join!(reserves, self.market_prices());

        let single_asset = self
            .assets
            .iter()
            .zip(&reserves)
            .map(|(asset, reserve)| match reserve {
                Some(position) => estimate_single_asset(&account, position),
                None => LiquidationEstimate::unavailable(&asset.symbol),
            })
            .collect();

        let market_wide = self.market_wide(&account, &reserves, &market_prices);

        Ok(RiskReport {
            user,
            account,
            risk,
            single_asset,
            market_wide,
            generated_at: Utc::now(),
        })
    }

    /// Read and normalize one reserve. Failures are logged and yield `None`.
    async fn load_reserve(&self, asset: &TrackedAsset, user: Address) -> Option<ReservePosition> {
        let reading = match fetch_reserve(self.source.as_ref(), asset.token, user).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(asset = %asset.symbol, error = %e, "Failed to fetch reserve data");
                return None;
            }
        };

        match ReservePosition::from_reading(&asset.symbol, &reading) {
            Ok(position) => {
                debug!(
                    asset = %asset.symbol,
                    amount = position.collateral_amount(),
                    price_usd = position.price_usd(),
                    "Reserve loaded"
                );
                Some(position)
            }
            Err(e) => {
                warn!(asset = %asset.symbol, error = %e, "Invalid reserve data");
                None
            }
        }
    }

    /// Market feed prices keyed by market id. Empty when no feed is
    /// configured or the feed fails.
    async fn market_prices(&self) -> HashMap<String, f64> {
        let Some(feed) = &self.market else {
            return HashMap::new();
        };

        let ids: Vec<String> = self.assets.iter().filter_map(|a| a.market_id.clone()).collect();
        if ids.is_empty() {
            return HashMap::new();
        }

        match feed.usd_prices(&ids).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(error = %e, "Market feed unavailable, falling back to oracle prices");
                HashMap::new()
            }
        }
    }

    /// Market-wide estimates in tracked-asset order. Prefers the market feed
    /// price, then the oracle price; an asset with neither is `Unavailable`.
    fn market_wide(
        &self,
        account: &AccountSnapshot,
        reserves: &[Option<ReservePosition>],
        market_prices: &HashMap<String, f64>,
    ) -> Vec<LiquidationEstimate> {
        let priced: Vec<Option<AssetPrice>> = self
            .assets
            .iter()
            .zip(reserves)
            .map(|(asset, reserve)| {
                let market = asset.market_id.as_ref().and_then(|id| market_prices.get(id)).copied();
                let price = market.or_else(|| reserve.as_ref().map(ReservePosition::price_usd))?;
                match AssetPrice::new(&asset.symbol, price) {
                    Ok(price) => Some(price),
                    Err(e) => {
                        warn!(asset = %asset.symbol, error = %e, "Unusable market price");
                        None
                    }
                }
            })
            .collect();

        let inputs: Vec<AssetPrice> = priced.iter().flatten().cloned().collect();
        let mut estimates = estimate_market_wide(account, &inputs).into_iter();

        self.assets
            .iter()
            .zip(&priced)
            .map(|(asset, price)| match price {
                Some(_) => estimates
                    .next()
                    .unwrap_or_else(|| LiquidationEstimate::unavailable(&asset.symbol)),
                None => LiquidationEstimate::unavailable(&asset.symbol),
            })
            .collect()
    }
}
