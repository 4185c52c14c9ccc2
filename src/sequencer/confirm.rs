//! Receipt polling with bounded exponential backoff

use crate::chain::ChainReader;
use crate::config::ConfirmationConfig;
use crate::{Error, Result};
use alloy::primitives::B256;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl From<ConfirmationConfig> for ConfirmationPolicy {
    fn from(config: ConfirmationConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_attempts,
        }
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        ConfirmationConfig::default().into()
    }
}

impl ConfirmationPolicy {
    /// Delay before poll `attempt` (0-based): doubles each time, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Poll until the receipt shows up
    ///
    /// A failed receipt is `Error::Reverted`; running out of attempts is
    /// `Error::ConfirmationTimeout`. RPC errors end the wait immediately.
    pub async fn wait(&self, chain: &dyn ChainReader, hash: B256) -> Result<()> {
        for attempt in 0..self.max_attempts {
            tokio::time::sleep(self.delay_for(attempt)).await;

            match chain.receipt_status(hash).await? {
                Some(true) => {
                    tracing::debug!(%hash, attempt, "Transaction confirmed");
                    return Ok(());
                }
                Some(false) => {
                    tracing::warn!(%hash, "Transaction reverted");
                    return Err(Error::Reverted(hash.to_string()));
                }
                None => tracing::trace!(%hash, attempt, "Receipt not available yet"),
            }
        }

        Err(Error::ConfirmationTimeout {
            hash: hash.to_string(),
            attempts: self.max_attempts,
        })
    }
}
