//! In-memory services for driving the router without a chain or a wallet API

#![allow(dead_code)]

use alloy::primitives::{address, Address, B256, U256};
use async_trait::async_trait;
use axum::Router;
use neobank_gateway::api::{self, AppState};
use neobank_gateway::auth::{SessionClaims, SessionVerifier};
use alloy::sol_types::SolCall;
use neobank_gateway::calldata::{TxRequest, IERC20};
use neobank_gateway::chain::ChainReader;
use neobank_gateway::wallet::{SignedMessage, WalletKind, WalletProvider, WalletRef};
use neobank_gateway::{Config, Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

pub const VALID_TOKEN: &str = "valid-token";
pub const WALLET_ID: &str = "wallet-1";
pub const WALLET_ADDRESS: Address = address!("1111111111111111111111111111111111111111");
pub const KYC_TOKEN: Address = address!("2222222222222222222222222222222222222222");

pub fn claims() -> SessionClaims {
    SessionClaims {
        app_id: "test-app".to_string(),
        user_id: "did:privy:user-1".to_string(),
        issuer: "privy.io".to_string(),
        issued_at: 1_700_000_000,
        expiration: 1_700_003_600,
        session_id: "session-1".to_string(),
    }
}

/// Accepts exactly [`VALID_TOKEN`]
pub struct StaticVerifier;

#[async_trait]
impl SessionVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<SessionClaims> {
        if token == VALID_TOKEN {
            Ok(claims())
        } else {
            Err(Error::Unauthorized("invalid session token".to_string()))
        }
    }
}

/// Chain where every receipt is already mined and successful
#[derive(Default)]
pub struct MemoryChain {
    balances: Mutex<HashMap<(Address, Address), U256>>,
    allowances: Mutex<HashMap<(Address, Address, Address), U256>>,
}

impl MemoryChain {
    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.balances
            .lock()
            .unwrap()
            .insert((token, owner), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances
            .lock()
            .unwrap()
            .insert((token, owner, spender), amount);
    }
}

#[async_trait]
impl ChainReader for MemoryChain {
    fn chain_id(&self) -> u64 {
        1
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(token, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn decimals(&self, _token: Address) -> Result<u8> {
        Ok(18)
    }

    async fn quote_exact_input_single(
        &self,
        _quoter: Address,
        _token_in: Address,
        _token_out: Address,
        _fee: u32,
        amount_in: U256,
    ) -> Result<U256> {
        Ok(amount_in)
    }

    async fn receipt_status(&self, _hash: B256) -> Result<Option<bool>> {
        Ok(Some(true))
    }
}

/// Wallet API that knows one EOA and hands out sequential hashes
///
/// Approvals land on the attached chain so allowance re-checks pass.
#[derive(Default)]
pub struct MemoryWallets {
    pub sent: Mutex<Vec<TxRequest>>,
    pub fail_send: AtomicBool,
    next_hash: AtomicU8,
    chain: Option<Arc<MemoryChain>>,
}

impl MemoryWallets {
    pub fn failing() -> Self {
        let wallets = Self::default();
        wallets.fail_send.store(true, Ordering::SeqCst);
        wallets
    }
}

#[async_trait]
impl WalletProvider for MemoryWallets {
    async fn wallet(&self, wallet_id: &str) -> Result<WalletRef> {
        if wallet_id != WALLET_ID {
            return Err(Error::Wallet(format!("wallet {} not found", wallet_id)));
        }
        Ok(WalletRef {
            id: wallet_id.to_string(),
            address: WALLET_ADDRESS,
            kind: WalletKind::ExternallyOwned,
        })
    }

    async fn send_transaction(
        &self,
        _wallet_id: &str,
        _chain_id: u64,
        tx: &TxRequest,
        _sponsor: bool,
    ) -> Result<B256> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Error::WalletProvider("500: signer unavailable".to_string()));
        }
        if tx.data.starts_with(&IERC20::approveCall::SELECTOR) {
            if let (Some(chain), Ok(call)) = (&self.chain, IERC20::approveCall::abi_decode(&tx.data)) {
                chain.set_allowance(tx.to, WALLET_ADDRESS, call.spender, call.amount);
            }
        }
        self.sent.lock().unwrap().push(tx.clone());
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(B256::with_last_byte(n))
    }

    async fn sign_solana_message(&self, _wallet_id: &str, _message: &[u8]) -> Result<SignedMessage> {
        Ok(SignedMessage {
            signature: "c2lnbmF0dXJl".to_string(),
            encoding: "base64".to_string(),
        })
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.kyc_token = Some(KYC_TOKEN);
    config.sequencer.confirmation.initial_delay_ms = 1;
    config.sequencer.confirmation.max_delay_ms = 1;
    config
}

pub struct TestApp {
    pub chain: Arc<MemoryChain>,
    pub wallets: Arc<MemoryWallets>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_wallets(MemoryWallets::default())
    }

    pub fn with_wallets(mut wallets: MemoryWallets) -> Self {
        let chain = Arc::new(MemoryChain::default());
        wallets.chain = Some(chain.clone());
        let wallets = Arc::new(wallets);
        let state = AppState {
            config: Arc::new(test_config()),
            verifier: Arc::new(StaticVerifier),
            wallets: wallets.clone(),
            chain: chain.clone(),
        };
        Self {
            chain,
            wallets,
            router: api::app(state),
        }
    }
}
