//! Provider management for HTTP RPC connections.
//! Uses Alloy providers for type-safe RPC interactions.

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Provider manager for a read-only RPC endpoint.
#[derive(Debug, Clone)]
pub struct ProviderManager {
    /// HTTP URL used for contract reads
    rpc_url: String,
    /// Chain the endpoint was verified against
    chain_id: u64,
}

impl ProviderManager {
    /// Connect to an RPC endpoint and verify it serves the expected chain.
    pub async fn connect(rpc_url: &str, expected_chain_id: u64) -> Result<Self> {
        info!(rpc = rpc_url, chain_id = expected_chain_id, "Initializing provider");

        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .with_context(|| format!("Invalid RPC URL '{}'", rpc_url))?,
        );

        let chain_id = provider.get_chain_id().await.context("Failed to query chain id")?;
        if chain_id != expected_chain_id {
            bail!(
                "RPC endpoint serves chain {} but chain {} is configured; switch network and try again",
                chain_id,
                expected_chain_id
            );
        }

        let block = provider.get_block_number().await?;
        info!(block = block, chain_id = chain_id, "Provider connection verified");

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            chain_id,
        })
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get the verified chain ID.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get current block number.
    pub async fn block_number(&self) -> Result<u64> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let block = provider.get_block_number().await?;
        Ok(block)
    }

    /// Check if provider is healthy.
    pub async fn health_check(&self) -> Result<bool> {
        let block = self.block_number().await?;
        debug!(block = block, "Provider health check passed");
        Ok(block > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_provider_connects_to_arbitrum() {
        let provider = ProviderManager::connect("https://arb1.arbitrum.io/rpc", 42161).await;
        assert!(provider.is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_provider_rejects_wrong_chain() {
        let provider = ProviderManager::connect("https://arb1.arbitrum.io/rpc", 1).await;
        assert!(provider.is_err());
    }
}
