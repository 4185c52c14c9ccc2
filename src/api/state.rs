use crate::auth::{extract_token, PrivyVerifier, SessionClaims, SessionVerifier};
use crate::chain::{ChainReader, RpcChainReader};
use crate::config::{Config, RpcConfig};
use crate::sequencer::SequencerSettings;
use crate::wallet::{PrivyClient, WalletProvider};
use crate::Result;
use axum::http::HeaderMap;
use std::sync::Arc;

use super::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<dyn SessionVerifier>,
    pub wallets: Arc<dyn WalletProvider>,
    pub chain: Arc<dyn ChainReader>,
}

impl AppState {
    /// Wire the production services from configuration
    pub fn from_config(config: Config, rpc: &RpcConfig) -> Result<Self> {
        let verifier = PrivyVerifier::new(&config.auth)?;
        let wallets = PrivyClient::new(&config.wallet_provider, &config.transport)?;
        let chain = RpcChainReader::connect(rpc, config.chain_id, config.transport)?;

        Ok(Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            wallets: Arc::new(wallets),
            chain: Arc::new(chain),
        })
    }

    /// Verified session from the request headers, or 401
    pub async fn require_session(&self, headers: &HeaderMap) -> std::result::Result<SessionClaims, ApiError> {
        let token = extract_token(headers, &self.config.auth.cookie_name)
            .ok_or_else(|| ApiError::unauthorized("Missing session token"))?;
        Ok(self.verifier.verify(&token).await?)
    }

    pub fn sequencer_settings(&self) -> SequencerSettings {
        SequencerSettings::from(&self.config.sequencer)
    }
}
