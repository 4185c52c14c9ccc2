//! Local private-key signer
//!
//! Used by the CLI to drive flows without the wallet provider.
//! - The key lives only inside alloy's `PrivateKeySigner`
//! - It is never serialized and never logged
//! - `Debug` output is redacted

use super::TransactionSender;
use crate::calldata::TxRequest;
use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

/// Private key wallet that only exposes its address and signing
pub struct SecureWallet {
    address: Address,
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Load a hex private key from an environment variable
    pub fn from_env(var_name: &str) -> Result<Self> {
        let key_hex = std::env::var(var_name).map_err(|_| {
            Error::Wallet(format!(
                "Environment variable {} not set. Required for local signing.",
                var_name
            ))
        })?;

        Self::from_hex(&key_hex)
    }

    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            address: signer.address(),
            wallet: EthereumWallet::from(signer),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signing handle for alloy providers; exposes no key bytes
    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

/// [`TransactionSender`] that signs locally and broadcasts over RPC
pub struct LocalSender {
    address: Address,
    provider: DynProvider,
}

impl LocalSender {
    pub fn connect(wallet: &SecureWallet, rpc_url: &str) -> Result<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.wallet().clone())
            .connect_http(url)
            .erased();

        Ok(Self {
            address: wallet.address(),
            provider,
        })
    }
}

#[async_trait]
impl TransactionSender for LocalSender {
    fn address(&self) -> Address {
        self.address
    }

    async fn send(&self, tx: &TxRequest) -> Result<B256> {
        let request = TransactionRequest::default()
            .from(self.address)
            .to(tx.to)
            .input(tx.data.clone().into())
            .value(tx.value);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| Error::Wallet(e.to_string()))?;
        let hash = *pending.tx_hash();
        tracing::info!(%hash, to = %tx.to, "Transaction broadcast");
        Ok(hash)
    }
}
