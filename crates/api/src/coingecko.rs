//! CoinGecko market price client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// 24h moves within this band (percent) are reported as flat.
pub const FLAT_CHANGE_PCT: f64 = 0.1;

/// Direction of the 24h price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Up,
    Down,
    Flat,
}

impl PriceTrend {
    /// Classify a 24h change in percent.
    pub fn from_change_pct(pct: f64) -> Self {
        if pct > FLAT_CHANGE_PCT {
            Self::Up
        } else if pct < -FLAT_CHANGE_PCT {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// One row of `/coins/markets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// CoinGecko coin id (e.g., "ethereum")
    pub id: String,
    pub symbol: String,
    /// USD price; CoinGecko returns null for delisted coins
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl MarketQuote {
    pub fn trend(&self) -> PriceTrend {
        PriceTrend::from_change_pct(self.price_change_percentage_24h.unwrap_or(0.0))
    }
}

/// Source of current market prices keyed by market id.
#[async_trait]
pub trait MarketFeed: Send + Sync + Debug {
    /// USD price for each id the feed knows; unknown ids are omitted.
    async fn usd_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>>;
}

/// Cached quote with timestamp for TTL expiration.
#[derive(Clone)]
struct CachedQuote {
    quote: MarketQuote,
    cached_at: Instant,
}

/// CoinGecko client with a short-lived quote cache.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    /// Quote cache: coin id -> cached quote
    cache: Arc<DashMap<String, CachedQuote>>,
    /// Cache TTL (default: 5 minutes, CoinGecko's public tier rate limit)
    cache_ttl: Duration,
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.base_url)
            .field("cache_size", &self.cache.len())
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    /// Create a client for the public API.
    pub fn new() -> Self {
        Self::with_client(
            reqwest::Client::new(),
            "https://api.coingecko.com/api/v3",
            Duration::from_secs(300),
        )
    }

    /// Create a client with custom base URL, request timeout and cache TTL.
    pub fn with_settings(base_url: impl Into<String>, timeout: Duration, cache_ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, base_url, cache_ttl))
    }

    fn with_client(client: reqwest::Client, base_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache: Arc::new(DashMap::new()),
            cache_ttl,
        }
    }

    /// Fresh cached quote for an id, if any.
    fn cached(&self, id: &str) -> Option<MarketQuote> {
        let entry = self.cache.get(id)?;
        if entry.cached_at.elapsed() < self.cache_ttl {
            Some(entry.quote.clone())
        } else {
            None
        }
    }

    fn store(&self, quotes: &[MarketQuote]) {
        let now = Instant::now();
        for quote in quotes {
            self.cache.insert(
                quote.id.clone(),
                CachedQuote {
                    quote: quote.clone(),
                    cached_at: now,
                },
            );
        }
    }

    /// Fetch market quotes for the given coin ids, in request order. Ids
    /// CoinGecko does not know are omitted. Served from cache when every id
    /// is fresh.
    #[instrument(skip(self))]
    pub async fn markets(&self, ids: &[String]) -> Result<Vec<MarketQuote>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cached: Vec<MarketQuote> = ids.iter().filter_map(|id| self.cached(id)).collect();
        if cached.len() == ids.len() {
            debug!(count = cached.len(), "Cache hit for market quotes");
            return Ok(cached);
        }

        let url = format!("{}/coins/markets", self.base_url);
        let id_list = ids.join(",");
        let per_page = ids.len().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("ids", id_list.as_str()),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ])
            .send()
            .await?
            .error_for_status()
            .context("CoinGecko markets request failed")?;

        let quotes: Vec<MarketQuote> = response.json().await?;
        debug!(requested = ids.len(), received = quotes.len(), "Fetched market quotes");

        self.store(&quotes);
        Ok(in_request_order(ids, quotes))
    }
}

/// Reorder quotes to follow `ids`; CoinGecko sorts by market cap.
fn in_request_order(ids: &[String], quotes: Vec<MarketQuote>) -> Vec<MarketQuote> {
    let mut by_id: HashMap<String, MarketQuote> = quotes.into_iter().map(|q| (q.id.clone(), q)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Collect priced quotes into an id -> USD price map.
pub fn price_map(quotes: &[MarketQuote]) -> HashMap<String, f64> {
    quotes
        .iter()
        .filter_map(|q| q.current_price.map(|p| (q.id.clone(), p)))
        .collect()
}

#[async_trait]
impl MarketFeed for CoinGeckoClient {
    async fn usd_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>> {
        let quotes = self.markets(ids).await?;
        Ok(price_map(&quotes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKETS_RESPONSE: &str = r#"[
        {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":67123.0,
         "market_cap":1320000000000,"price_change_percentage_24h":-1.2345},
        {"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":3012.55,
         "market_cap":362000000000,"price_change_percentage_24h":0.05},
        {"id":"dead-coin","symbol":"dead","name":"Dead","current_price":null,
         "price_change_percentage_24h":null}
    ]"#;

    #[test]
    fn test_parse_markets_response() {
        let quotes: Vec<MarketQuote> = serde_json::from_str(MARKETS_RESPONSE).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].id, "bitcoin");
        assert_eq!(quotes[0].trend(), PriceTrend::Down);
        assert_eq!(quotes[1].trend(), PriceTrend::Flat);
        assert_eq!(quotes[2].current_price, None);

        let prices = price_map(&quotes);
        assert_eq!(prices.len(), 2);
        assert!((prices["ethereum"] - 3012.55).abs() < 1e-9);
    }

    #[test]
    fn test_price_trend() {
        assert_eq!(PriceTrend::from_change_pct(0.11), PriceTrend::Up);
        assert_eq!(PriceTrend::from_change_pct(0.1), PriceTrend::Flat);
        assert_eq!(PriceTrend::from_change_pct(-0.1), PriceTrend::Flat);
        assert_eq!(PriceTrend::from_change_pct(-2.0), PriceTrend::Down);
    }

    #[test]
    fn test_cache_ttl() {
        let client = CoinGeckoClient::new();
        let quotes: Vec<MarketQuote> = serde_json::from_str(MARKETS_RESPONSE).unwrap();
        client.store(&quotes);
        assert_eq!(client.cached("ethereum").unwrap().symbol, "eth");
        assert!(client.cached("solana").is_none());

        let expired = CoinGeckoClient::with_client(reqwest::Client::new(), "http://localhost", Duration::ZERO);
        expired.store(&quotes);
        assert!(expired.cached("ethereum").is_none());
    }

    #[test]
    fn test_quotes_follow_request_order() {
        let quotes: Vec<MarketQuote> = serde_json::from_str(MARKETS_RESPONSE).unwrap();
        let ids = vec!["ethereum".to_string(), "solana".to_string(), "bitcoin".to_string()];
        let ordered = in_request_order(&ids, quotes);
        let order: Vec<&str> = ordered.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(order, ["ethereum", "bitcoin"]);
    }

    #[tokio::test]
    async fn test_markets_served_from_cache() {
        // Unroutable base URL: the request would fail if the cache were bypassed
        let client = CoinGeckoClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            Duration::from_secs(60),
        );
        let quotes: Vec<MarketQuote> = serde_json::from_str(MARKETS_RESPONSE).unwrap();
        client.store(&quotes);

        let ids = vec!["ethereum".to_string(), "bitcoin".to_string()];
        let prices = client.usd_prices(&ids).await.unwrap();
        assert!((prices["bitcoin"] - 67123.0).abs() < 1e-9);

        let cached = client.markets(&ids).await.unwrap();
        assert_eq!(cached[0].id, "ethereum");
        assert_eq!(cached[1].id, "bitcoin");
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_fetch_live_markets() {
        let client = CoinGeckoClient::new();
        let quotes = client
            .markets(&["bitcoin".to_string(), "ethereum".to_string()])
            .await
            .unwrap();
        assert_eq!(quotes.len(), 2);
    }
}
