//! Balance, allowance and receipt readers
//!
//! Everything the sequencer and the API need to know about on-chain state
//! goes through [`ChainReader`]. The production implementation talks JSON-RPC
//! ([`RpcChainReader`]); tests substitute an in-memory one.

mod rpc;
pub mod units;

pub use rpc::RpcChainReader;

use crate::tokens::registry;
use crate::Result;
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

/// Read-only view of one chain
#[async_trait]
pub trait ChainReader: Send + Sync {
    fn chain_id(&self) -> u64;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn decimals(&self, token: Address) -> Result<u8>;

    /// Expected output of a single-pool exact-input swap
    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256>;

    /// `None` while pending, then whether the transaction succeeded
    async fn receipt_status(&self, hash: B256) -> Result<Option<bool>>;
}

/// An on-chain amount with its display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub token: Address,
    #[serde(serialize_with = "units::serialize_decimal")]
    pub raw: U256,
    pub decimals: u8,
    /// Fixed-point string with exactly `decimals` fractional digits
    pub formatted: String,
}

impl TokenBalance {
    pub fn new(token: Address, raw: U256, decimals: u8) -> Self {
        Self {
            token,
            raw,
            decimals,
            formatted: units::format_units_fixed(raw, decimals),
        }
    }

    pub fn zero(token: Address, decimals: u8) -> Self {
        Self::new(token, U256::ZERO, decimals)
    }
}

/// Token decimals, from the registry when known, else from the contract
pub async fn token_decimals(reader: &dyn ChainReader, token: Address) -> Result<u8> {
    match registry().get(reader.chain_id(), &token) {
        Some(info) => Ok(info.decimals),
        None => reader.decimals(token).await,
    }
}

pub async fn read_balance(
    reader: &dyn ChainReader,
    token: Address,
    owner: Address,
) -> Result<TokenBalance> {
    let decimals = token_decimals(reader, token).await?;
    let raw = reader.balance_of(token, owner).await?;
    Ok(TokenBalance::new(token, raw, decimals))
}

pub async fn read_allowance(
    reader: &dyn ChainReader,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<TokenBalance> {
    let decimals = token_decimals(reader, token).await?;
    let raw = reader.allowance(token, owner, spender).await?;
    Ok(TokenBalance::new(token, raw, decimals))
}

/// Balance for display refreshes: failures read as zero
pub async fn read_balance_or_zero(
    reader: &dyn ChainReader,
    token: Address,
    owner: Address,
) -> TokenBalance {
    match read_balance(reader, token, owner).await {
        Ok(balance) => balance,
        Err(e) => {
            tracing::warn!(%token, %owner, error = %e, "Balance refresh failed, showing zero");
            let decimals = registry()
                .get(reader.chain_id(), &token)
                .map(|t| t.decimals)
                .unwrap_or(18);
            TokenBalance::zero(token, decimals)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::chains;
    use crate::tokens::addresses;
    use crate::Error;
    use std::collections::HashMap;

    struct FixedReader {
        balances: HashMap<Address, U256>,
        fail: bool,
    }

    #[async_trait]
    impl ChainReader for FixedReader {
        fn chain_id(&self) -> u64 {
            chains::ETHEREUM
        }

        async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256> {
            if self.fail {
                return Err(Error::Chain("connection refused".into()));
            }
            Ok(self.balances.get(&token).copied().unwrap_or_default())
        }

        async fn allowance(&self, _: Address, _: Address, _: Address) -> Result<U256> {
            Ok(U256::from(7u64))
        }

        async fn decimals(&self, _token: Address) -> Result<u8> {
            Ok(9)
        }

        async fn quote_exact_input_single(
            &self,
            _: Address,
            _: Address,
            _: Address,
            _: u32,
            amount_in: U256,
        ) -> Result<U256> {
            Ok(amount_in)
        }

        async fn receipt_status(&self, _hash: B256) -> Result<Option<bool>> {
            Ok(Some(true))
        }
    }

    fn reader(fail: bool) -> FixedReader {
        let mut balances = HashMap::new();
        balances.insert(addresses::PYUSD_ETH, U256::from(12_340_000u64));
        FixedReader { balances, fail }
    }

    #[tokio::test]
    async fn test_read_balance_formats_with_registry_decimals() {
        let balance = read_balance(&reader(false), addresses::PYUSD_ETH, Address::ZERO)
            .await
            .unwrap();
        assert_eq!(balance.decimals, 6);
        assert_eq!(balance.formatted, "12.340000");
    }

    #[tokio::test]
    async fn test_unknown_token_asks_contract_for_decimals() {
        let unknown = Address::repeat_byte(0x99);
        let balance = read_allowance(&reader(false), unknown, Address::ZERO, Address::ZERO)
            .await
            .unwrap();
        assert_eq!(balance.decimals, 9);
        assert_eq!(balance.formatted, "0.000000007");
    }

    #[tokio::test]
    async fn test_read_balance_surfaces_rpc_errors() {
        let err = read_balance(&reader(true), addresses::PYUSD_ETH, Address::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Chain(_)));
    }

    #[tokio::test]
    async fn test_refresh_falls_back_to_zero() {
        let balance = read_balance_or_zero(&reader(true), addresses::PYUSD_ETH, Address::ZERO).await;
        assert_eq!(balance.raw, U256::ZERO);
        assert_eq!(balance.formatted, "0.000000");
    }
}
