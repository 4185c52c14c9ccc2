//! Shared token registry
//!
//! Single source of truth for token metadata (addresses, decimals, symbols)
//! per chain. The same address can mean different tokens on different chains
//! (WETH is 0x4200..06 on both Optimism and Base), so lookups are keyed by
//! `(chain_id, address)`.

use crate::networks::chains;
use alloy::primitives::{address, Address};
use serde::Serialize;
use std::collections::HashMap;

/// Token descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub address: Address,
    /// Token symbol (e.g., "PYUSD", "USDC")
    pub symbol: &'static str,
    pub decimals: u8,
    /// Whether this is a stablecoin (pegged to $1)
    pub is_stablecoin: bool,
}

impl TokenInfo {
    pub const fn stablecoin(address: Address, symbol: &'static str, decimals: u8) -> Self {
        Self {
            address,
            symbol,
            decimals,
            is_stablecoin: true,
        }
    }

    pub const fn token(address: Address, symbol: &'static str, decimals: u8) -> Self {
        Self {
            address,
            symbol,
            decimals,
            is_stablecoin: false,
        }
    }
}

/// Well-known token addresses per chain
pub mod addresses {
    use super::*;

    // === Ethereum Mainnet ===
    pub const PYUSD_ETH: Address = address!("6c3ea9036406852006290770bedfcaba0e23a0e8");
    pub const USDC_ETH: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const USDT_ETH: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
    pub const WETH_ETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

    // === Arbitrum ===
    pub const PYUSD_ARB: Address = address!("46850ad61c2b7d64d08c9c754f45254596696984");
    pub const USDC_ARB: Address = address!("af88d065e77c8cc2239327c5edb3a432268e5831");
    pub const USDT_ARB: Address = address!("fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9");
    pub const WETH_ARB: Address = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");

    // === Optimism ===
    pub const USDC_OPT: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");
    pub const USDT_OPT: Address = address!("94b008aa00579c1307b0ef2c499ad98a8ce58e58");
    pub const WETH_OPT: Address = address!("4200000000000000000000000000000000000006");

    // === Base ===
    pub const USDC_BASE: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");
    pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");
}

/// Token registry providing token info lookups
pub struct TokenRegistry {
    tokens: HashMap<(u64, Address), TokenInfo>,
    tokens_per_chain: HashMap<u64, Vec<Address>>,
}

impl TokenRegistry {
    /// Create a new token registry with all known tokens
    pub fn new() -> Self {
        use addresses::*;

        let table: [(u64, TokenInfo); 13] = [
            (chains::ETHEREUM, TokenInfo::stablecoin(PYUSD_ETH, "PYUSD", 6)),
            (chains::ETHEREUM, TokenInfo::stablecoin(USDC_ETH, "USDC", 6)),
            (chains::ETHEREUM, TokenInfo::stablecoin(USDT_ETH, "USDT", 6)),
            (chains::ETHEREUM, TokenInfo::token(WETH_ETH, "WETH", 18)),
            (chains::ARBITRUM, TokenInfo::stablecoin(PYUSD_ARB, "PYUSD", 6)),
            (chains::ARBITRUM, TokenInfo::stablecoin(USDC_ARB, "USDC", 6)),
            (chains::ARBITRUM, TokenInfo::stablecoin(USDT_ARB, "USDT", 6)),
            (chains::ARBITRUM, TokenInfo::token(WETH_ARB, "WETH", 18)),
            (chains::OPTIMISM, TokenInfo::stablecoin(USDC_OPT, "USDC", 6)),
            (chains::OPTIMISM, TokenInfo::stablecoin(USDT_OPT, "USDT", 6)),
            (chains::OPTIMISM, TokenInfo::token(WETH_OPT, "WETH", 18)),
            (chains::BASE, TokenInfo::stablecoin(USDC_BASE, "USDC", 6)),
            (chains::BASE, TokenInfo::token(WETH_BASE, "WETH", 18)),
        ];

        let mut tokens = HashMap::new();
        let mut tokens_per_chain: HashMap<u64, Vec<Address>> = HashMap::new();
        for (chain_id, info) in table {
            tokens.insert((chain_id, info.address), info);
            tokens_per_chain
                .entry(chain_id)
                .or_default()
                .push(info.address);
        }

        Self {
            tokens,
            tokens_per_chain,
        }
    }

    /// Get token info by chain and address
    pub fn get(&self, chain_id: u64, address: &Address) -> Option<&TokenInfo> {
        self.tokens.get(&(chain_id, *address))
    }

    /// Find a token by symbol on a chain (case-insensitive)
    pub fn by_symbol(&self, chain_id: u64, symbol: &str) -> Option<&TokenInfo> {
        self.tokens_for_chain(chain_id)
            .iter()
            .filter_map(|addr| self.get(chain_id, addr))
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Tokens known on a chain
    pub fn tokens_for_chain(&self, chain_id: u64) -> &[Address] {
        self.tokens_per_chain
            .get(&chain_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the token belongs to the given chain's table
    pub fn is_on_chain(&self, chain_id: u64, address: &Address) -> bool {
        self.tokens.contains_key(&(chain_id, *address))
    }

    /// Check if an address is a known stablecoin on the chain
    pub fn is_stablecoin(&self, chain_id: u64, address: &Address) -> bool {
        self.get(chain_id, address)
            .map(|t| t.is_stablecoin)
            .unwrap_or(false)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global token registry (lazy initialized)
static REGISTRY: std::sync::OnceLock<TokenRegistry> = std::sync::OnceLock::new();

/// Get the global token registry
pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}
