use super::{required, required_str};
use crate::api::{ApiError, AppState};
use crate::calldata::TxRequest;
use crate::sequencer::{Sequencer, TxKind};
use crate::wallet::ProviderSender;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TransactionInput {
    to: Option<String>,
    data: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AaveDepositRequest {
    wallet_id: Option<String>,
    transactions: Option<Vec<TransactionInput>>,
    amount: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AaveDepositResponse {
    pub success: bool,
    pub tx_hash: String,
    pub approve_hash: String,
    pub message: String,
}

fn parse_transaction(index: usize, input: TransactionInput) -> Result<TxRequest, ApiError> {
    let to = required_str(input.to, &format!("transactions[{}].to", index))?;
    let data = required_str(input.data, &format!("transactions[{}].data", index))?;
    Ok(TxRequest::from_parts(&to, &data, input.value.as_deref())?)
}

/// POST /api/aave-deposit - relay a client-built approve + supply pair
pub async fn aave_deposit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AaveDepositRequest>, JsonRejection>,
) -> Result<Json<AaveDepositResponse>, ApiError> {
    let session = state.require_session(&headers).await?;
    let Json(request) = payload?;

    let wallet_id = required_str(request.wallet_id, "wallet_id")?;
    let amount = required_str(request.amount, "amount")?;
    let transactions = required(request.transactions, "transactions")?;
    if transactions.len() != 2 {
        return Err(ApiError::bad_request(format!(
            "transactions must contain exactly 2 entries (approve, supply), got {}",
            transactions.len()
        )));
    }
    let mut parsed = Vec::with_capacity(2);
    for (index, input) in transactions.into_iter().enumerate() {
        parsed.push(parse_transaction(index, input)?);
    }

    tracing::info!(user = %session.user_id, %wallet_id, %amount, "Aave deposit requested");

    let sender =
        ProviderSender::resolve(state.wallets.clone(), &wallet_id, state.config.chain_id).await?;
    let sequencer = Sequencer::new(state.chain.as_ref(), &sender, state.sequencer_settings())?;
    let report = sequencer
        .relay(&parsed[0], &parsed[1], TxKind::Supply)
        .await?;

    let approve_hash = report.hash_of(TxKind::Approve).unwrap_or_default();
    let tx_hash = report.hash_of(TxKind::Supply).unwrap_or_default();
    Ok(Json(AaveDepositResponse {
        success: true,
        tx_hash: tx_hash.to_string(),
        approve_hash: approve_hash.to_string(),
        message: format!("Deposited {} into Aave", amount),
    }))
}
