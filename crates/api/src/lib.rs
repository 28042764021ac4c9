//! HTTP clients for off-chain market data.
//!
//! - CoinGecko: current USD prices and 24h change per asset
//! - alternative.me: Fear & Greed market sentiment index

mod coingecko;
mod sentiment;

pub use coingecko::{price_map, CoinGeckoClient, MarketFeed, MarketQuote, PriceTrend, FLAT_CHANGE_PCT};
pub use sentiment::{gauge_angle, FearGreedClient, SentimentReading};
