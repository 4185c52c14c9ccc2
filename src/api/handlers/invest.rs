use super::required_str;
use crate::api::{ApiError, AppState};
use crate::chain::units::{parse_units, serialize_decimal};
use crate::networks;
use crate::sequencer::{FlowReport, Intent, Sequencer};
use crate::tokens::registry;
use crate::wallet::ProviderSender;
use crate::yield_projection::{self, ProjectionPoint, Strategy};
use alloy::primitives::U256;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Decimals of the PYUSD amounts the projection is expressed in
const PROJECTION_DECIMALS: u8 = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestRequest {
    wallet_id: Option<String>,
    amount: Option<String>,
    strategy: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestResponse {
    pub success: bool,
    pub strategy: Strategy,
    #[serde(serialize_with = "serialize_decimal")]
    pub amount: U256,
    pub tx_hash: Option<String>,
    pub report: FlowReport,
}

/// POST /api/invest - move PYUSD into the savings or growth strategy
pub async fn invest(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<InvestRequest>, JsonRejection>,
) -> Result<Json<InvestResponse>, ApiError> {
    let session = state.require_session(&headers).await?;
    let Json(request) = payload?;

    let wallet_id = required_str(request.wallet_id, "walletId")?;
    let strategy: Strategy = required_str(request.strategy, "strategy")?.parse()?;
    let chain_id = state.config.chain_id;
    let pyusd = registry()
        .by_symbol(chain_id, "PYUSD")
        .ok_or_else(|| ApiError::bad_request(format!("PYUSD is not available on chain {}", chain_id)))?;
    let amount = parse_units(&required_str(request.amount, "amount")?, pyusd.decimals)?;

    let intent = match strategy {
        Strategy::Savings => Intent::AaveDeposit {
            asset: pyusd.address,
            amount,
        },
        Strategy::Growth => {
            let usdc = registry().by_symbol(chain_id, "USDC").ok_or_else(|| {
                ApiError::bad_request(format!("USDC is not available on chain {}", chain_id))
            })?;
            let pool = networks::find_pool(chain_id, pyusd.address, usdc.address).ok_or_else(|| {
                ApiError::bad_request(format!("No PYUSD/USDC pool on chain {}", chain_id))
            })?;
            Intent::Invest {
                base: pyusd.address,
                quote: usdc.address,
                fee: pool.fee,
                amount,
            }
        }
    };

    tracing::info!(user = %session.user_id, %wallet_id, ?strategy, %amount, "Invest requested");

    let sender = ProviderSender::resolve(state.wallets.clone(), &wallet_id, chain_id).await?;
    let sequencer = Sequencer::new(state.chain.as_ref(), &sender, state.sequencer_settings())?;
    let report = sequencer.run(intent).await?;

    Ok(Json(InvestResponse {
        success: true,
        strategy,
        amount,
        tx_hash: report.last_hash().map(|h| h.to_string()),
        report,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    amount: Option<String>,
    strategy: Option<String>,
    apy_bps: Option<u32>,
    months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub success: bool,
    pub strategy: Option<Strategy>,
    pub apy_bps: u32,
    pub points: Vec<ProjectionPoint>,
}

/// POST /api/yield/projection - monthly compounding preview, no chain access
pub async fn yield_projection(
    State(state): State<AppState>,
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Result<Json<ProjectionResponse>, ApiError> {
    let Json(request) = payload?;

    let principal = parse_units(&required_str(request.amount, "amount")?, PROJECTION_DECIMALS)?;
    let strategy = request
        .strategy
        .as_deref()
        .map(str::parse::<Strategy>)
        .transpose()?;
    let apy_bps = match (request.apy_bps, strategy) {
        (Some(bps), _) => bps,
        (None, Some(strategy)) => strategy.apy_bps(&state.config.yields),
        (None, None) => {
            return Err(ApiError::bad_request("strategy or apyBps is required"));
        }
    };
    let months = request.months.unwrap_or(12);

    let points = yield_projection::project(principal, PROJECTION_DECIMALS, apy_bps, months)?;
    Ok(Json(ProjectionResponse {
        success: true,
        strategy,
        apy_bps,
        points,
    }))
}
