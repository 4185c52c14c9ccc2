//! Wallets and signers
//!
//! Flows never see key material. They submit through a [`TransactionSender`],
//! backed either by the wallet provider's server-side signer
//! ([`ProviderSender`] over [`PrivyClient`]) or by a local private key
//! ([`LocalSender`], CLI only).

pub mod privy;
mod signer;

pub use privy::PrivyClient;
pub use signer::{LocalSender, SecureWallet};

use crate::calldata::TxRequest;
use crate::Result;
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a wallet pays for gas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    ExternallyOwned,
    /// Smart-contract wallet; the provider sponsors its gas
    Smart,
}

/// A wallet held by the wallet provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletRef {
    pub id: String,
    pub address: Address,
    pub kind: WalletKind,
}

/// Signature over an off-chain message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub signature: String,
    pub encoding: String,
}

/// Submits transactions on behalf of one address
#[async_trait]
pub trait TransactionSender: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast, returning the transaction hash without waiting
    async fn send(&self, tx: &TxRequest) -> Result<B256>;
}

/// Server-side wallet API
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Resolve an EVM wallet by id
    async fn wallet(&self, wallet_id: &str) -> Result<WalletRef>;

    async fn send_transaction(
        &self,
        wallet_id: &str,
        chain_id: u64,
        tx: &TxRequest,
        sponsor: bool,
    ) -> Result<B256>;

    async fn sign_solana_message(&self, wallet_id: &str, message: &[u8]) -> Result<SignedMessage>;
}

/// [`TransactionSender`] for a provider-held wallet on one chain
pub struct ProviderSender {
    provider: Arc<dyn WalletProvider>,
    wallet: WalletRef,
    chain_id: u64,
}

impl ProviderSender {
    pub fn new(provider: Arc<dyn WalletProvider>, wallet: WalletRef, chain_id: u64) -> Self {
        Self {
            provider,
            wallet,
            chain_id,
        }
    }

    /// Look the wallet up, then bind it to `chain_id`
    pub async fn resolve(
        provider: Arc<dyn WalletProvider>,
        wallet_id: &str,
        chain_id: u64,
    ) -> Result<Self> {
        let wallet = provider.wallet(wallet_id).await?;
        Ok(Self::new(provider, wallet, chain_id))
    }

    pub fn wallet(&self) -> &WalletRef {
        &self.wallet
    }
}

#[async_trait]
impl TransactionSender for ProviderSender {
    fn address(&self) -> Address {
        self.wallet.address
    }

    async fn send(&self, tx: &TxRequest) -> Result<B256> {
        let sponsor = self.wallet.kind == WalletKind::Smart;
        self.provider
            .send_transaction(&self.wallet.id, self.chain_id, tx, sponsor)
            .await
    }
}
