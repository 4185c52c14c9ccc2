//! Error types for the neobank gateway

use alloy::primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("RPC error: {0}")]
    Chain(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Wallet provider error: {0}")]
    WalletProvider(String),

    #[error("Insufficient balance of {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        required: U256,
        available: U256,
    },

    #[error("Insufficient allowance of {token} for {spender}: required {required}, approved {approved}")]
    InsufficientAllowance {
        token: Address,
        spender: Address,
        required: U256,
        approved: U256,
    },

    #[error("Transaction {0} execution reverted")]
    Reverted(String),

    #[error("Transaction {hash} not confirmed after {attempts} attempts")]
    ConfirmationTimeout { hash: String, attempts: u32 },

    #[error("Unsupported chain ID: {0}")]
    UnsupportedChain(u64),

    #[error("Token {token} is not configured on chain {chain_id}")]
    ChainMismatch { token: Address, chain_id: u64 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Unauthorized,
    Validation,
    Internal,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Unauthorized(_) => ErrorClass::Unauthorized,
            Error::InvalidArgument(_)
            | Error::InsufficientBalance { .. }
            | Error::InsufficientAllowance { .. }
            | Error::ChainMismatch { .. } => ErrorClass::Validation,
            _ => ErrorClass::Internal,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
