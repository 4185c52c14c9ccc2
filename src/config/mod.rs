//! Configuration for the neobank gateway
//!
//! Loaded from an optional JSON file, then overridden by environment
//! variables. Every section has defaults, so an empty file (or no file at all)
//! yields a working local configuration.

pub mod rpc;

use crate::{networks, Error, Result};
use alloy::primitives::Address;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use rpc::{RpcConfig, TransportConfig};

/// Environment variable names
pub mod env_vars {
    pub const PRIVY_APP_ID: &str = "PRIVY_APP_ID";
    pub const PRIVY_APP_SECRET: &str = "PRIVY_APP_SECRET";
    pub const PRIVY_VERIFICATION_KEY: &str = "PRIVY_VERIFICATION_KEY";
    pub const PRIVY_API_URL: &str = "PRIVY_API_URL";
    pub const BIND_ADDR: &str = "BIND_ADDR";
    pub const CHAIN_ID: &str = "CHAIN_ID";
    pub const KYC_TOKEN_ADDRESS: &str = "KYC_TOKEN_ADDRESS";
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Maximum accepted request body
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            body_limit_bytes: 64 * 1024,
        }
    }
}

/// Session token verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Identity provider app id, checked as the token audience
    pub app_id: String,
    /// PEM-encoded ES256 verification key
    pub verification_key: Option<String>,
    pub issuer: String,
    /// Cookie consulted when no bearer header is present
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            verification_key: None,
            issuer: "privy.io".to_string(),
            cookie_name: "privy-token".to_string(),
        }
    }
}

/// Server-side wallet provider credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletProviderConfig {
    pub base_url: String,
    pub app_id: String,
    #[serde(skip_serializing)]
    pub app_secret: Option<SecretString>,
}

impl Default for WalletProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.privy.io".to_string(),
            app_id: String::new(),
            app_secret: None,
        }
    }
}

/// Slippage tolerances in basis points
///
/// These are business placeholders; deployments are expected to tune them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SlippageConfig {
    /// Plain swaps
    pub swap_bps: u32,
    /// The swap leg of the growth vault
    pub invest_swap_bps: u32,
    /// Both minimums of a liquidity mint
    pub liquidity_bps: u32,
}

impl Default for SlippageConfig {
    fn default() -> Self {
        Self {
            swap_bps: 2500,
            invest_swap_bps: 500,
            liquidity_bps: 9000,
        }
    }
}

/// Receipt polling schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 8_000,
            max_attempts: 20,
        }
    }
}

/// Transaction sequencer settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub slippage: SlippageConfig,
    /// Seconds added to `now` for swap and mint deadlines
    pub deadline_secs: u64,
    pub confirmation: ConfirmationConfig,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            slippage: SlippageConfig::default(),
            deadline_secs: 1200,
            confirmation: ConfirmationConfig::default(),
        }
    }
}

impl SequencerConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// Projected yield per strategy, in basis points per year
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldConfig {
    pub savings_apy_bps: u32,
    pub growth_apy_bps: u32,
}

impl Default for YieldConfig {
    fn default() -> Self {
        Self {
            savings_apy_bps: 450,
            growth_apy_bps: 1200,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Chain the gateway operates on
    pub chain_id: u64,
    pub auth: AuthConfig,
    pub wallet_provider: WalletProviderConfig,
    /// KYC token contract (checkBalance / mintFree)
    pub kyc_token: Option<Address>,
    pub sequencer: SequencerConfig,
    pub yields: YieldConfig,
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chain_id: networks::chains::ETHEREUM,
            auth: AuthConfig::default(),
            wallet_provider: WalletProviderConfig::default(),
            kyc_token: None,
            sequencer: SequencerConfig::default(),
            yields: YieldConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process env in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup(env_vars::PRIVY_APP_ID) {
            // One app id serves both session audience and wallet API
            self.auth.app_id = app_id.clone();
            self.wallet_provider.app_id = app_id;
        }
        if let Some(secret) = lookup(env_vars::PRIVY_APP_SECRET) {
            self.wallet_provider.app_secret = Some(SecretString::from(secret));
        }
        if let Some(key) = lookup(env_vars::PRIVY_VERIFICATION_KEY) {
            // Keys pasted into .env files often carry literal "\n"
            self.auth.verification_key = Some(key.replace("\\n", "\n"));
        }
        if let Some(url) = lookup(env_vars::PRIVY_API_URL) {
            self.wallet_provider.base_url = url;
        }
        if let Some(addr) = lookup(env_vars::BIND_ADDR) {
            self.server.bind_addr = addr;
        }
        if let Some(chain) = lookup(env_vars::CHAIN_ID) {
            self.chain_id = chain
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid CHAIN_ID: {}", chain)))?;
        }
        if let Some(token) = lookup(env_vars::KYC_TOKEN_ADDRESS) {
            let token = token
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid KYC_TOKEN_ADDRESS: {}", token)))?;
            self.kyc_token = Some(token);
        }
        Ok(())
    }

    /// Reject settings that cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        if networks::network(self.chain_id).is_none() {
            return Err(Error::UnsupportedChain(self.chain_id));
        }
        let slippage = &self.sequencer.slippage;
        for (name, bps) in [
            ("swap_bps", slippage.swap_bps),
            ("invest_swap_bps", slippage.invest_swap_bps),
            ("liquidity_bps", slippage.liquidity_bps),
        ] {
            if bps > crate::calldata::BPS_DENOMINATOR {
                return Err(Error::Config(format!(
                    "slippage.{} = {} exceeds 10000 bps",
                    name, bps
                )));
            }
        }
        let confirmation = &self.sequencer.confirmation;
        if confirmation.max_attempts == 0 {
            return Err(Error::Config(
                "confirmation.max_attempts must be at least 1".to_string(),
            ));
        }
        if confirmation.initial_delay_ms > confirmation.max_delay_ms {
            return Err(Error::Config(
                "confirmation.initial_delay_ms exceeds max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }
}
