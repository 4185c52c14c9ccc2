use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{
    aave_deposit, get_allowance, get_balance, health, invest, kyc_token, sign_message,
    verify_get, verify_post, yield_projection,
};
use super::AppState;

/// All gateway routes. State is attached by the caller with `.with_state(...)`.
pub fn create_router(body_limit_bytes: usize) -> Router<AppState> {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &axum::http::Request<_>| {
            let req_id = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri(),
                req_id
            )
        })
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        );
    let req_id = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .route("/health", get(health))
        .route("/api/verify", get(verify_get).post(verify_post))
        .route("/api/aave-deposit", post(aave_deposit))
        .route("/api/get-balance", post(get_balance))
        .route("/api/get-allowance", post(get_allowance))
        .route("/api/kyc-token", post(kyc_token))
        .route("/api/solana/sign_message", post(sign_message))
        .route("/api/invest", post(invest))
        .route("/api/yield/projection", post(yield_projection))
        .layer(CorsLayer::permissive())
        .layer(trace)
        .layer(req_id)
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
}
