//! JSON-RPC backed chain reader

use super::ChainReader;
use crate::calldata::{IQuoterV2, IERC20};
use crate::config::{RpcConfig, TransportConfig};
use crate::{Error, Result};
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;

/// Chain reader over an HTTP provider, with per-call timeout and retries
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider,
    chain_id: u64,
    transport: TransportConfig,
}

impl RpcChainReader {
    pub fn connect(rpc: &RpcConfig, chain_id: u64, transport: TransportConfig) -> Result<Self> {
        let url = rpc.get(chain_id).ok_or(Error::UnsupportedChain(chain_id))?;
        let url: url::Url = url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL for chain {}: {}", chain_id, e)))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self {
            provider,
            chain_id,
            transport,
        })
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    async fn with_retry<T, E, F, Fut>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let attempts = self.transport.retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.transport.timeout(), call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = format!("timed out after {}s", self.transport.timeout_secs)
                }
            }
            tracing::debug!(op, attempt, attempts, error = %last_error, "RPC call failed");
        }

        Err(Error::Chain(format!("{} failed: {}", op, last_error)))
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        let contract = IERC20::new(token, self.provider.clone());
        self.with_retry("balanceOf", || {
            let contract = &contract;
            async move { contract.balanceOf(owner).call().await }
        })
        .await
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let contract = IERC20::new(token, self.provider.clone());
        self.with_retry("allowance", || {
            let contract = &contract;
            async move { contract.allowance(owner, spender).call().await }
        })
        .await
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        let contract = IERC20::new(token, self.provider.clone());
        self.with_retry("decimals", || {
            let contract = &contract;
            async move { contract.decimals().call().await }
        })
        .await
    }

    async fn quote_exact_input_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256> {
        crate::calldata::tick_spacing(fee)?;
        let contract = IQuoterV2::new(quoter, self.provider.clone());
        let params = IQuoterV2::QuoteExactInputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            amountIn: amount_in,
            fee: U24::from(fee),
            sqrtPriceLimitX96: U160::ZERO,
        };
        let quote = self
            .with_retry("quoteExactInputSingle", || {
                let contract = &contract;
                let params = params.clone();
                async move { contract.quoteExactInputSingle(params).call().await }
            })
            .await?;
        Ok(quote.amountOut)
    }

    async fn receipt_status(&self, hash: B256) -> Result<Option<bool>> {
        let receipt = self
            .with_retry("eth_getTransactionReceipt", || {
                let provider = &self.provider;
                async move { provider.get_transaction_receipt(hash).await }
            })
            .await?;
        Ok(receipt.map(|r| r.status()))
    }
}
