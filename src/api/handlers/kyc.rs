use super::{required_address, required_str};
use crate::api::{ApiError, AppState};
use crate::calldata;
use crate::wallet::{ProviderSender, TransactionSender};
use alloy::primitives::Address;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRequest {
    action: Option<String>,
    wallet_address: Option<String>,
    wallet_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycBalanceResponse {
    pub success: bool,
    pub balance: u128,
    pub has_token: bool,
}

fn configured_token(state: &AppState) -> Result<Address, ApiError> {
    state.config.kyc_token.ok_or_else(|| {
        tracing::error!("KYC token address is not configured");
        ApiError::internal("KYC token is not configured")
    })
}

/// POST /api/kyc-token - `checkBalance` (public) or `mintFree` (session)
pub async fn kyc_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<KycRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let action = required_str(request.action, "action")?;

    match action.as_str() {
        "checkBalance" => {
            let owner = required_address(request.wallet_address, "walletAddress")?;
            let token = configured_token(&state)?;
            let raw = state.chain.balance_of(token, owner).await?;
            Ok(Json(KycBalanceResponse {
                success: true,
                balance: raw.saturating_to(),
                has_token: !raw.is_zero(),
            })
            .into_response())
        }
        "mintFree" => {
            let session = state.require_session(&headers).await?;
            let wallet_id = required_str(request.wallet_id, "walletId")?;
            let token = configured_token(&state)?;

            let sender = ProviderSender::resolve(state.wallets.clone(), &wallet_id, state.config.chain_id)
                .await?;
            let hash = sender.send(&calldata::kyc_mint(token)).await?;
            tracing::info!(user = %session.user_id, %wallet_id, %hash, "KYC token mint submitted");

            Ok(Json(json!({
                "success": true,
                "txHash": hash.to_string(),
                "message": "KYC token mint submitted",
            }))
            .into_response())
        }
        other => Err(ApiError::bad_request(format!(
            "Unknown action '{}', expected checkBalance or mintFree",
            other
        ))),
    }
}
