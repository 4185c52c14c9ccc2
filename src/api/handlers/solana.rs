use super::required_str;
use crate::api::{ApiError, AppState};
use crate::wallet::SignedMessage;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignMessageRequest {
    message: Option<String>,
    wallet_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignMessageResponse {
    pub method: &'static str,
    pub data: SignedMessage,
}

/// POST /api/solana/sign_message - sign with a provider-held Solana wallet
pub async fn sign_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SignMessageRequest>, JsonRejection>,
) -> Result<Json<SignMessageResponse>, ApiError> {
    state.require_session(&headers).await?;
    let Json(request) = payload?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("message is required"))?;
    let wallet_id = required_str(request.wallet_id, "wallet_id")?;

    let data = state
        .wallets
        .sign_solana_message(&wallet_id, message.as_bytes())
        .await?;
    Ok(Json(SignMessageResponse {
        method: "signMessage",
        data,
    }))
}
