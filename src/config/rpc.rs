//! RPC endpoint configuration
//!
//! Endpoints are resolved from the environment in this order:
//! 1. Per-chain env vars (ETH_RPC_URL, ARBITRUM_RPC_URL, ...)
//! 2. ALCHEMY_API_KEY, then INFURA_API_KEY, to build provider URLs
//! 3. The public endpoint from the network table (rate limited)
//!
//! ```bash
//! export ETH_RPC_URL="https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY"
//! # or
//! export ALCHEMY_API_KEY="YOUR_KEY"
//! ```

use crate::networks::{self, chains};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Environment variable names
mod env_vars {
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const ARBITRUM_RPC_URL: &str = "ARBITRUM_RPC_URL";
    pub const OPTIMISM_RPC_URL: &str = "OPTIMISM_RPC_URL";
    pub const BASE_RPC_URL: &str = "BASE_RPC_URL";

    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Per-call transport policy for read calls
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Timeout applied to every RPC call
    pub timeout_secs: u64,
    /// Extra attempts after the first failure
    pub retries: u32,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retries: 2,
        }
    }
}

/// RPC URLs indexed by chain ID
#[derive(Debug, Clone)]
pub struct RpcConfig {
    urls: HashMap<u64, String>,
}

impl RpcConfig {
    /// Resolve RPC URLs from environment variables, falling back to public endpoints
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        let per_chain = [
            (chains::ETHEREUM, env_vars::ETH_RPC_URL),
            (chains::ARBITRUM, env_vars::ARBITRUM_RPC_URL),
            (chains::OPTIMISM, env_vars::OPTIMISM_RPC_URL),
            (chains::BASE, env_vars::BASE_RPC_URL),
        ];
        for (chain_id, var) in per_chain {
            if let Ok(url) = std::env::var(var) {
                tracing::debug!(chain_id, var, "Using per-chain RPC URL");
                urls.insert(chain_id, url);
            }
        }

        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
                urls.insert(
                    chains::ETHEREUM,
                    format!("https://eth-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::ARBITRUM,
                    format!("https://arb-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::OPTIMISM,
                    format!("https://opt-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::BASE,
                    format!("https://base-mainnet.g.alchemy.com/v2/{}", key),
                );
            }
        }

        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URLs from INFURA_API_KEY");
                urls.insert(
                    chains::ETHEREUM,
                    format!("https://mainnet.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::ARBITRUM,
                    format!("https://arbitrum-mainnet.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::OPTIMISM,
                    format!("https://optimism-mainnet.infura.io/v3/{}", key),
                );
                // Infura has no Base endpoint
            }
        }

        for network in networks::all() {
            urls.entry(network.chain_id).or_insert_with(|| {
                tracing::warn!(
                    chain = network.name,
                    "No RPC configured, using public RPC (rate limited)"
                );
                network.public_rpc.to_string()
            });
        }

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Check if a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
