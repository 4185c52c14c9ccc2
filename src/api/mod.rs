//! HTTP surface of the gateway
//!
//! Thin handlers over the auth, wallet, chain and sequencer modules. Every
//! failure is rendered as `{ "success": false, "error": "..." }`.

mod error;
pub mod handlers;
mod router;
mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;

use crate::Result;
use tokio::net::TcpListener;

/// Build the application with state attached
pub fn app(state: AppState) -> axum::Router {
    let body_limit = state.config.server.body_limit_bytes;
    create_router(body_limit).with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState) -> Result<()> {
    let bind_addr = state.config.server.bind_addr.clone();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| crate::Error::Config(format!("Failed to bind {}: {}", bind_addr, e)))?;
    tracing::info!(%bind_addr, chain_id = state.config.chain_id, "Gateway listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install ctrl-c handler");
            }
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| crate::Error::Config(format!("Server error: {}", e)))
}
