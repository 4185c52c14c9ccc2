//! Neobank gateway
//!
//! Server-side half of a stablecoin neobank app:
//! - Verifies wallet-provider session tokens
//! - Reads ERC-20 balances, allowances and quotes over JSON-RPC
//! - Sequences approve-then-act DeFi flows (Aave supply, Uniswap V3 swaps
//!   and full-range liquidity) through custodial or local signers
//!
//! # Security Model
//!
//! - Custodial wallets sign on the provider side; the gateway only relays
//! - The local signer key stays inside [`wallet::SecureWallet`]
//! - Every state-changing route requires a verified session

pub mod api;
pub mod auth;
pub mod calldata;
pub mod chain;
pub mod config;
pub mod networks;
pub mod sequencer;
pub mod tokens;
pub mod wallet;
pub mod yield_projection;

mod error;

pub use config::{Config, RpcConfig};
pub use error::{Error, ErrorClass, Result};
