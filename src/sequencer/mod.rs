//! Transaction sequencer
//!
//! Runs one fixed pipeline per [`Intent`]: check balances, top up allowances,
//! submit the primary transaction, wait for its receipt, refresh balances.
//! Each flow walks a linear state machine and either ends in
//! [`FlowState::Done`] or stops at the first error in [`FlowState::Failed`].
//! Nothing is rolled back: a [`FlowError`] lists every transaction that made it
//! on-chain before the failure.

mod confirm;
pub mod messages;

pub use confirm::ConfirmationPolicy;

use crate::calldata::{self, MintParams, SwapParams, TxRequest};
use crate::chain::{self, ChainReader, TokenBalance};
use crate::config::{SequencerConfig, SlippageConfig};
use crate::networks::{self, NetworkInfo};
use crate::tokens::registry;
use crate::wallet::TransactionSender;
use crate::{Error, Result};
use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowState {
    Idle,
    CheckingBalance,
    Approving,
    WaitingApproval,
    Executing,
    WaitingConfirmation,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TxKind {
    Approve,
    Transfer,
    TransferFrom,
    Supply,
    Swap,
    Mint,
}

/// A transaction that reached the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedTx {
    pub kind: TxKind,
    pub hash: B256,
    pub to: Address,
}

/// What the user asked for. Amounts are in token base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Transfer {
        token: Address,
        to: Address,
        amount: U256,
    },
    /// Pull `amount` from `from`, who must have approved the sender
    TransferFrom {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    AaveDeposit {
        asset: Address,
        amount: U256,
    },
    Swap {
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    },
    /// Growth vault: swap half of `amount` of `base` into `quote`, then
    /// provide both as a full-range position
    Invest {
        base: Address,
        quote: Address,
        fee: u32,
        amount: U256,
    },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Transfer { .. } => "transfer",
            Intent::TransferFrom { .. } => "transfer_from",
            Intent::AaveDeposit { .. } => "aave_deposit",
            Intent::Swap { .. } => "swap",
            Intent::Invest { .. } => "invest",
        }
    }

    /// Tokens the flow touches
    pub fn tokens(&self) -> Vec<Address> {
        match self {
            Intent::Transfer { token, .. } | Intent::TransferFrom { token, .. } => vec![*token],
            Intent::AaveDeposit { asset, .. } => vec![*asset],
            Intent::Swap {
                token_in, token_out, ..
            } => vec![*token_in, *token_out],
            Intent::Invest { base, quote, .. } => vec![*base, *quote],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SequencerSettings {
    pub slippage: SlippageConfig,
    pub deadline_secs: u64,
    pub confirmation: ConfirmationPolicy,
}

impl From<&SequencerConfig> for SequencerSettings {
    fn from(config: &SequencerConfig) -> Self {
        Self {
            slippage: config.slippage,
            deadline_secs: config.deadline_secs,
            confirmation: config.confirmation.into(),
        }
    }
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self::from(&SequencerConfig::default())
    }
}

/// Outcome of a completed flow
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub intent: &'static str,
    pub history: Vec<FlowState>,
    pub submitted: Vec<SubmittedTx>,
    /// Sender balances re-read after the flow
    pub balances: Vec<TokenBalance>,
}

impl FlowReport {
    pub fn last_hash(&self) -> Option<B256> {
        self.submitted.last().map(|tx| tx.hash)
    }

    pub fn hash_of(&self, kind: TxKind) -> Option<B256> {
        self.submitted.iter().find(|tx| tx.kind == kind).map(|tx| tx.hash)
    }
}

/// A flow that stopped early
#[derive(Debug, thiserror::Error)]
#[error("{intent} failed while {state:?}: {source}")]
pub struct FlowError {
    pub intent: &'static str,
    /// State the flow was in when the error happened
    pub state: FlowState,
    pub history: Vec<FlowState>,
    /// Already on-chain; not reverted
    pub submitted: Vec<SubmittedTx>,
    #[source]
    pub source: Error,
    pub message: String,
}

/// Per-run bookkeeping
struct Flow {
    intent: &'static str,
    state: FlowState,
    history: Vec<FlowState>,
    submitted: Vec<SubmittedTx>,
}

impl Flow {
    fn new(intent: &'static str) -> Self {
        Self {
            intent,
            state: FlowState::Idle,
            history: vec![FlowState::Idle],
            submitted: Vec::new(),
        }
    }

    fn enter(&mut self, state: FlowState) {
        tracing::debug!(intent = self.intent, from = ?self.state, to = ?state, "Flow transition");
        self.state = state;
        self.history.push(state);
    }

    fn record(&mut self, kind: TxKind, hash: B256, to: Address) {
        tracing::info!(intent = self.intent, ?kind, %hash, %to, "Submitted");
        self.submitted.push(SubmittedTx { kind, hash, to });
    }

    fn finish(mut self, balances: Vec<TokenBalance>) -> FlowReport {
        self.enter(FlowState::Done);
        FlowReport {
            intent: self.intent,
            history: self.history,
            submitted: self.submitted,
            balances,
        }
    }

    fn fail(mut self, source: Error) -> FlowError {
        let state = self.state;
        self.enter(FlowState::Failed);
        let message = messages::describe(&source);
        tracing::warn!(
            intent = self.intent,
            ?state,
            submitted = self.submitted.len(),
            error = %source,
            "Flow failed"
        );
        FlowError {
            intent: self.intent,
            state,
            history: self.history,
            submitted: self.submitted,
            source,
            message,
        }
    }
}

pub struct Sequencer<'a> {
    chain: &'a dyn ChainReader,
    sender: &'a dyn TransactionSender,
    network: &'static NetworkInfo,
    settings: SequencerSettings,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        chain: &'a dyn ChainReader,
        sender: &'a dyn TransactionSender,
        settings: SequencerSettings,
    ) -> Result<Self> {
        let network =
            networks::network(chain.chain_id()).ok_or(Error::UnsupportedChain(chain.chain_id()))?;
        Ok(Self {
            chain,
            sender,
            network,
            settings,
        })
    }

    pub fn network(&self) -> &'static NetworkInfo {
        self.network
    }

    /// Run an intent to completion
    pub async fn run(&self, intent: Intent) -> std::result::Result<FlowReport, FlowError> {
        let mut flow = Flow::new(intent.name());
        tracing::info!(intent = flow.intent, chain = self.network.name, sender = %self.sender.address(), "Starting flow");

        if let Err(e) = self.execute(&intent, &mut flow).await {
            return Err(flow.fail(e));
        }

        let mut balances = Vec::new();
        for token in intent.tokens() {
            balances.push(chain::read_balance_or_zero(self.chain, token, self.sender.address()).await);
        }
        Ok(flow.finish(balances))
    }

    /// Submit a prebuilt approval and the action it enables, waiting for the
    /// approval's receipt in between
    pub async fn relay(
        &self,
        approval: &TxRequest,
        action: &TxRequest,
        action_kind: TxKind,
    ) -> std::result::Result<FlowReport, FlowError> {
        let mut flow = Flow::new("relay");

        let result = async {
            flow.enter(FlowState::Approving);
            let hash = self.sender.send(approval).await?;
            flow.record(TxKind::Approve, hash, approval.to);
            flow.enter(FlowState::WaitingApproval);
            self.settings.confirmation.wait(self.chain, hash).await?;

            flow.enter(FlowState::Executing);
            let hash = self.sender.send(action).await?;
            flow.record(action_kind, hash, action.to);
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => Ok(flow.finish(Vec::new())),
            Err(e) => Err(flow.fail(e)),
        }
    }

    async fn execute(&self, intent: &Intent, flow: &mut Flow) -> Result<()> {
        for token in intent.tokens() {
            if !registry().is_on_chain(self.network.chain_id, &token) {
                return Err(Error::ChainMismatch {
                    token,
                    chain_id: self.network.chain_id,
                });
            }
        }

        let owner = self.sender.address();
        match *intent {
            Intent::Transfer { token, to, amount } => {
                self.check_balance(flow, token, owner, amount).await?;
                let tx = calldata::transfer(token, to, amount);
                self.submit(flow, TxKind::Transfer, &tx).await
            }
            Intent::TransferFrom {
                token,
                from,
                to,
                amount,
            } => {
                self.check_balance(flow, token, from, amount).await?;
                // The sender cannot approve on `from`'s behalf
                let approved = self.chain.allowance(token, from, owner).await?;
                if approved < amount {
                    return Err(Error::InsufficientAllowance {
                        token,
                        spender: owner,
                        required: amount,
                        approved,
                    });
                }
                let tx = calldata::transfer_from(token, from, to, amount);
                self.submit(flow, TxKind::TransferFrom, &tx).await
            }
            Intent::AaveDeposit { asset, amount } => {
                let pool = self.network.contracts.aave_pool.ok_or_else(|| {
                    Error::Config(format!("Aave V3 is not configured on {}", self.network.name))
                })?;
                self.check_balance(flow, asset, owner, amount).await?;
                self.ensure_allowance(flow, asset, pool, amount).await?;
                let tx = calldata::aave_supply(pool, asset, amount, owner);
                self.submit(flow, TxKind::Supply, &tx).await
            }
            Intent::Swap {
                token_in,
                token_out,
                fee,
                amount_in,
            } => {
                self.check_balance(flow, token_in, owner, amount_in).await?;
                self.swap(flow, token_in, token_out, fee, amount_in, self.settings.slippage.swap_bps)
                    .await
            }
            Intent::Invest {
                base,
                quote,
                fee,
                amount,
            } => self.invest(flow, base, quote, fee, amount).await,
        }
    }

    async fn invest(
        &self,
        flow: &mut Flow,
        base: Address,
        quote: Address,
        fee: u32,
        amount: U256,
    ) -> Result<()> {
        if base == quote {
            return Err(Error::invalid("Invest needs two distinct tokens"));
        }
        let owner = self.sender.address();
        self.check_balance(flow, base, owner, amount).await?;

        let swap_amount = amount / U256::from(2);
        let base_amount = amount - swap_amount;
        if swap_amount.is_zero() {
            return Err(Error::invalid("Invest amount is too small to split"));
        }

        let quote_before = self.chain.balance_of(quote, owner).await?;
        self.swap(
            flow,
            base,
            quote,
            fee,
            swap_amount,
            self.settings.slippage.invest_swap_bps,
        )
        .await?;
        let quote_after = self.chain.balance_of(quote, owner).await?;
        let quote_amount = quote_after.saturating_sub(quote_before);
        if quote_amount.is_zero() {
            return Err(Error::Chain(format!(
                "Swap into {} confirmed but no balance change was observed",
                quote
            )));
        }

        let position_manager = self.network.contracts.position_manager;
        self.ensure_allowance(flow, base, position_manager, base_amount)
            .await?;
        self.ensure_allowance(flow, quote, position_manager, quote_amount)
            .await?;

        let (token0, token1) = networks::sort_tokens(base, quote);
        let (amount0, amount1) = if token0 == base {
            (base_amount, quote_amount)
        } else {
            (quote_amount, base_amount)
        };
        let (tick_lower, tick_upper) = calldata::full_range_ticks(fee)?;
        let liquidity_bps = self.settings.slippage.liquidity_bps;

        let params = MintParams {
            token0,
            token1,
            fee,
            tick_lower,
            tick_upper,
            amount0_desired: amount0,
            amount1_desired: amount1,
            amount0_min: calldata::min_amount_out(amount0, liquidity_bps)?,
            amount1_min: calldata::min_amount_out(amount1, liquidity_bps)?,
            recipient: owner,
            deadline: self.deadline(),
        };
        let tx = calldata::position_mint(position_manager, &params)?;
        self.submit(flow, TxKind::Mint, &tx).await
    }

    async fn swap(
        &self,
        flow: &mut Flow,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        slippage_bps: u32,
    ) -> Result<()> {
        let router = self.network.contracts.swap_router.ok_or_else(|| {
            Error::Config(format!(
                "No deadline-carrying swap router on {}",
                self.network.name
            ))
        })?;
        self.ensure_allowance(flow, token_in, router, amount_in)
            .await?;

        let estimated = self
            .chain
            .quote_exact_input_single(self.network.contracts.quoter, token_in, token_out, fee, amount_in)
            .await?;
        let amount_out_minimum = calldata::min_amount_out(estimated, slippage_bps)?;
        tracing::debug!(%estimated, %amount_out_minimum, slippage_bps, "Swap quote");

        let params = SwapParams {
            token_in,
            token_out,
            fee,
            recipient: self.sender.address(),
            amount_in,
            amount_out_minimum,
            deadline: self.deadline(),
        };
        let tx = calldata::exact_input_single(router, &params)?;
        self.submit(flow, TxKind::Swap, &tx).await
    }

    async fn check_balance(
        &self,
        flow: &mut Flow,
        token: Address,
        owner: Address,
        required: U256,
    ) -> Result<()> {
        if required.is_zero() {
            return Err(Error::invalid("Amount must be greater than zero"));
        }
        flow.enter(FlowState::CheckingBalance);
        let available = self.chain.balance_of(token, owner).await?;
        if available < required {
            return Err(Error::InsufficientBalance {
                token,
                required,
                available,
            });
        }
        Ok(())
    }

    /// Approve `spender` when the current allowance is short, then re-check
    async fn ensure_allowance(
        &self,
        flow: &mut Flow,
        token: Address,
        spender: Address,
        required: U256,
    ) -> Result<()> {
        let owner = self.sender.address();
        let current = self.chain.allowance(token, owner, spender).await?;
        if current >= required {
            return Ok(());
        }

        flow.enter(FlowState::Approving);
        let tx = calldata::approve(token, spender, required);
        let hash = self.sender.send(&tx).await?;
        flow.record(TxKind::Approve, hash, token);

        flow.enter(FlowState::WaitingApproval);
        self.settings.confirmation.wait(self.chain, hash).await?;

        let approved = self.chain.allowance(token, owner, spender).await?;
        if approved < required {
            return Err(Error::InsufficientAllowance {
                token,
                spender,
                required,
                approved,
            });
        }
        Ok(())
    }

    async fn submit(&self, flow: &mut Flow, kind: TxKind, tx: &TxRequest) -> Result<()> {
        flow.enter(FlowState::Executing);
        let hash = self.sender.send(tx).await?;
        flow.record(kind, hash, tx.to);

        flow.enter(FlowState::WaitingConfirmation);
        self.settings.confirmation.wait(self.chain, hash).await
    }

    fn deadline(&self) -> U256 {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        calldata::deadline_after(now, self.settings.deadline_secs)
    }
}
