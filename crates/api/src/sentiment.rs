//! Fear & Greed index client (alternative.me).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Raw API envelope. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

/// Latest market sentiment reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReading {
    /// Index value in [0, 100]
    pub value: u8,
    /// e.g., "Extreme Fear", "Greed"
    pub classification: String,
    pub timestamp: DateTime<Utc>,
}

impl SentimentReading {
    /// Needle angle for a semicircular gauge.
    pub fn gauge_angle(&self) -> f64 {
        gauge_angle(f64::from(self.value))
    }
}

/// Map an index value in [0, 100] to a needle angle in [-90, 90] degrees.
pub fn gauge_angle(value: f64) -> f64 {
    -90.0 + value / 100.0 * 180.0
}

impl TryFrom<FngEntry> for SentimentReading {
    type Error = anyhow::Error;

    fn try_from(entry: FngEntry) -> Result<Self> {
        let value: u8 = entry
            .value
            .parse()
            .with_context(|| format!("Invalid index value: {}", entry.value))?;
        if value > 100 {
            bail!("Index value out of range: {}", value);
        }
        let secs: i64 = entry
            .timestamp
            .parse()
            .with_context(|| format!("Invalid timestamp: {}", entry.timestamp))?;
        let timestamp = DateTime::<Utc>::from_timestamp(secs, 0)
            .with_context(|| format!("Timestamp out of range: {}", secs))?;

        Ok(Self {
            value,
            classification: entry.value_classification,
            timestamp,
        })
    }
}

/// Fear & Greed index client.
#[derive(Debug, Clone)]
pub struct FearGreedClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for FearGreedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FearGreedClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.alternative.me".to_string(),
        }
    }

    pub fn with_settings(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the most recent index value.
    #[instrument(skip(self))]
    pub async fn latest(&self) -> Result<SentimentReading> {
        let url = format!("{}/fng/", self.base_url);
        let body = self
            .client
            .get(&url)
            .query(&[("limit", "1")])
            .send()
            .await?
            .error_for_status()
            .context("Fear & Greed request failed")?
            .text()
            .await?;

        let reading = parse_latest(&body)?;
        debug!(value = reading.value, classification = %reading.classification, "Fetched sentiment");
        Ok(reading)
    }
}

fn parse_latest(body: &str) -> Result<SentimentReading> {
    let response: FngResponse = serde_json::from_str(body).context("Malformed Fear & Greed response")?;
    let entry = response
        .data
        .into_iter()
        .next()
        .context("Fear & Greed response has no data")?;
    SentimentReading::try_from(entry)
}
