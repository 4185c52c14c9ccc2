use super::required_address;
use crate::api::{ApiError, AppState};
use crate::chain;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    wallet_address: Option<String>,
    token_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    /// Fixed-point, exactly `decimals` fractional digits
    pub balance: String,
    pub raw: String,
}

/// POST /api/get-balance - ERC-20 balanceOf
pub async fn get_balance(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Json(request) = payload?;
    let owner = required_address(request.wallet_address, "walletAddress")?;
    let token = required_address(request.token_address, "tokenAddress")?;

    let balance = chain::read_balance(state.chain.as_ref(), token, owner).await?;
    Ok(Json(BalanceResponse {
        success: true,
        balance: balance.formatted,
        raw: balance.raw.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceRequest {
    wallet_address: Option<String>,
    token_address: Option<String>,
    spender_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllowanceResponse {
    pub success: bool,
    pub allowance: String,
    pub raw: String,
}

/// POST /api/get-allowance - ERC-20 allowance
pub async fn get_allowance(
    State(state): State<AppState>,
    payload: Result<Json<AllowanceRequest>, JsonRejection>,
) -> Result<Json<AllowanceResponse>, ApiError> {
    let Json(request) = payload?;
    let owner = required_address(request.wallet_address, "walletAddress")?;
    let token = required_address(request.token_address, "tokenAddress")?;
    let spender = required_address(request.spender_address, "spenderAddress")?;

    let allowance = chain::read_allowance(state.chain.as_ref(), token, owner, spender).await?;
    Ok(Json(AllowanceResponse {
        success: true,
        allowance: allowance.formatted,
        raw: allowance.raw.to_string(),
    }))
}
