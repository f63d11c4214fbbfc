//! REST API over a precomputed run.
//!
//! Read endpoints serve the report computed at startup:
//! - `/summary`: microgrid totals
//! - `/nodes`: per-node records, optionally filtered by id
//! - `/transfers`: peer flows, optionally filtered by source or destination
//!
//! `POST /run` balances a posted node group in a fresh engine and returns
//! its report without touching the shared state.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::sim::engine::RunReport;

pub use types::{ErrorResponse, NodesQuery, TransfersQuery};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the startup run completes and wrapped in `Arc`.
pub struct AppState {
    /// Report of the startup run.
    pub report: RunReport,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/nodes", get(handlers::get_nodes))
        .route("/transfers", get(handlers::get_transfers))
        .route("/run", post(handlers::post_run))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
