//! Static network, contract and pool tables
//!
//! Everything here is immutable metadata looked up by chain ID. Pool addresses
//! are not stored: they are derived with CREATE2 from the Uniswap V3 factory,
//! so a pool descriptor is always consistent with its tokens and fee tier.

use alloy::primitives::{address, b256, keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use serde::Serialize;

use crate::tokens::addresses;

/// Chain ID constants
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const ARBITRUM: u64 = 42161;
    pub const OPTIMISM: u64 = 10;
    pub const BASE: u64 = 8453;
}

/// Uniswap V3 pool init code hash (same on every deployment)
pub const POOL_INIT_CODE_HASH: B256 =
    b256!("e34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54");

/// Protocol contracts deployed on a network
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProtocolContracts {
    /// Aave V3 Pool (supply/withdraw entry point)
    pub aave_pool: Option<Address>,
    pub uniswap_factory: Address,
    /// Uniswap V3 SwapRouter (the variant whose params carry a deadline)
    pub swap_router: Option<Address>,
    pub position_manager: Address,
    pub quoter: Address,
}

/// Network descriptor
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: &'static str,
    /// Public RPC endpoint (rate limited, fallback only)
    pub public_rpc: &'static str,
    pub contracts: ProtocolContracts,
}

impl NetworkInfo {
    /// CAIP-2 identifier, as expected by the wallet provider
    pub fn caip2(&self) -> String {
        format!("eip155:{}", self.chain_id)
    }
}

const UNISWAP_FACTORY: Address = address!("1f98431c8ad98523631ae4a59f267346ea31f984");
const UNISWAP_SWAP_ROUTER: Address = address!("e592427a0aece92de3edee1f18e0157c05861564");
const UNISWAP_POSITION_MANAGER: Address = address!("c36442b4a4522e871399cd717abdd847ab11fe88");
const UNISWAP_QUOTER_V2: Address = address!("61ffe014ba17989e743c5f6cb21bf9697530b21e");

static NETWORKS: [NetworkInfo; 4] = [
    NetworkInfo {
        chain_id: chains::ETHEREUM,
        name: "ethereum",
        public_rpc: "https://eth.llamarpc.com",
        contracts: ProtocolContracts {
            aave_pool: Some(address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2")),
            uniswap_factory: UNISWAP_FACTORY,
            swap_router: Some(UNISWAP_SWAP_ROUTER),
            position_manager: UNISWAP_POSITION_MANAGER,
            quoter: UNISWAP_QUOTER_V2,
        },
    },
    NetworkInfo {
        chain_id: chains::ARBITRUM,
        name: "arbitrum",
        public_rpc: "https://arb1.arbitrum.io/rpc",
        contracts: ProtocolContracts {
            aave_pool: Some(address!("794a61358d6845594f94dc1db02a252b5b4814ad")),
            uniswap_factory: UNISWAP_FACTORY,
            swap_router: Some(UNISWAP_SWAP_ROUTER),
            position_manager: UNISWAP_POSITION_MANAGER,
            quoter: UNISWAP_QUOTER_V2,
        },
    },
    NetworkInfo {
        chain_id: chains::OPTIMISM,
        name: "optimism",
        public_rpc: "https://mainnet.optimism.io",
        contracts: ProtocolContracts {
            aave_pool: Some(address!("794a61358d6845594f94dc1db02a252b5b4814ad")),
            uniswap_factory: UNISWAP_FACTORY,
            swap_router: Some(UNISWAP_SWAP_ROUTER),
            position_manager: UNISWAP_POSITION_MANAGER,
            quoter: UNISWAP_QUOTER_V2,
        },
    },
    NetworkInfo {
        chain_id: chains::BASE,
        name: "base",
        public_rpc: "https://mainnet.base.org",
        contracts: ProtocolContracts {
            aave_pool: Some(address!("a238dd80c259a72e81d7e4664a9801593f98d1c5")),
            uniswap_factory: address!("33128a8fc17869897dce68ed026d694621f6fdfd"),
            // Base only has SwapRouter02, whose params have no deadline
            swap_router: None,
            position_manager: address!("03a520b32c04bf3beef7beb72e919cf822ed34f1"),
            quoter: address!("3d4e44eb1374240ce5f1b871ab261cd16335b76a"),
        },
    },
];

/// All supported networks
pub fn all() -> &'static [NetworkInfo] {
    &NETWORKS
}

/// Look up a network by chain ID
pub fn network(chain_id: u64) -> Option<&'static NetworkInfo> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Parse a network name or numeric chain ID
pub fn parse_network(name: &str) -> Option<&'static NetworkInfo> {
    let lower = name.to_lowercase();
    if let Ok(id) = lower.parse::<u64>() {
        return network(id);
    }
    let lower = if lower == "mainnet" { "ethereum".to_string() } else { lower };
    NETWORKS.iter().find(|n| n.name == lower)
}

/// Uniswap V3 pool descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolInfo {
    pub chain_id: u64,
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    /// Fee tier in hundredths of a bip (500 = 0.05%)
    pub fee: u32,
}

impl PoolInfo {
    /// Build a pool descriptor from an unordered token pair
    pub fn new(network: &NetworkInfo, token_a: Address, token_b: Address, fee: u32) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);
        Self {
            chain_id: network.chain_id,
            address: pool_address(network.contracts.uniswap_factory, token0, token1, fee),
            token0,
            token1,
            fee,
        }
    }
}

/// Order two tokens the way Uniswap does (ascending address)
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// CREATE2 address of a Uniswap V3 pool. Tokens must already be sorted.
pub fn pool_address(factory: Address, token0: Address, token1: Address, fee: u32) -> Address {
    // abi.encode(token0, token1, uint24 fee): a uint24 word encodes like a uint256
    let salt = keccak256((token0, token1, U256::from(fee)).abi_encode());
    factory.create2(salt, POOL_INIT_CODE_HASH)
}

/// Stablecoin pools the app routes through
pub fn pools(chain_id: u64) -> Vec<PoolInfo> {
    let Some(net) = network(chain_id) else {
        return Vec::new();
    };
    match chain_id {
        chains::ETHEREUM => vec![PoolInfo::new(
            net,
            addresses::PYUSD_ETH,
            addresses::USDC_ETH,
            100,
        )],
        chains::ARBITRUM => vec![PoolInfo::new(
            net,
            addresses::PYUSD_ARB,
            addresses::USDC_ARB,
            100,
        )],
        _ => Vec::new(),
    }
}

/// Find the configured pool for a token pair, in either order
pub fn find_pool(chain_id: u64, token_a: Address, token_b: Address) -> Option<PoolInfo> {
    let (token0, token1) = sort_tokens(token_a, token_b);
    pools(chain_id)
        .into_iter()
        .find(|p| p.token0 == token0 && p.token1 == token1)
}
