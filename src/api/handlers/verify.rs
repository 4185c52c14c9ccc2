use crate::api::{ApiError, AppState};
use crate::auth::SessionClaims;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct VerifyRequest {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub claims: SessionClaims,
}

/// GET /api/verify - verify the session token from header or cookie
pub async fn verify_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    let claims = state.require_session(&headers).await?;
    Ok(Json(VerifyResponse { claims }))
}

/// POST /api/verify - same as GET, also accepting `{token}` in the body
pub async fn verify_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VerifyResponse>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return verify_get(State(state), headers).await;
    }
    let request: VerifyRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;

    match request.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => {
            let claims = state.verifier.verify(token.trim()).await?;
            Ok(Json(VerifyResponse { claims }))
        }
        None => verify_get(State(state), headers).await,
    }
}
