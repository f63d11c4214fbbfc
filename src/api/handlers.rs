//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::warn;

use super::AppState;
use super::types::{ErrorResponse, NodesQuery, TransfersQuery};
use crate::sim::engine::{Engine, RunReport};
use crate::sim::kpi::MicrogridSummary;
use crate::sim::types::{Node, NodeResult, Transfer};

/// `GET /summary` → 200 + `MicrogridSummary` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<MicrogridSummary> {
    Json(state.report.summary.clone())
}

/// Returns per-node records.
///
/// `GET /nodes` → 200 + `Vec<NodeResult>` JSON
/// `GET /nodes?id=x` → 200 with that node only, 404 if unknown
pub async fn get_nodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NodesQuery>,
) -> impl IntoResponse {
    let nodes: Vec<NodeResult> = state
        .report
        .nodes
        .iter()
        .filter(|n| query.id.as_ref().is_none_or(|id| &n.id == id))
        .cloned()
        .collect();

    if let Some(id) = query.id
        && nodes.is_empty()
    {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown node \"{id}\""),
                field: Some("id"),
            }),
        ));
    }

    Ok(Json(nodes))
}

/// Returns peer flows, optionally filtered.
///
/// `GET /transfers?from=a&to=b` → 200 + `Vec<Transfer>` JSON
pub async fn get_transfers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransfersQuery>,
) -> Json<Vec<Transfer>> {
    let transfers = state
        .report
        .transfers
        .iter()
        .filter(|t| query.from.as_ref().is_none_or(|f| &t.from == f))
        .filter(|t| query.to.as_ref().is_none_or(|d| &t.to == d))
        .cloned()
        .collect();
    Json(transfers)
}

/// Runs a fresh engine over the posted nodes.
///
/// `POST /run` with a JSON array of nodes → 200 + `RunReport` JSON,
/// or 400 + `ErrorResponse` if any node is invalid.
pub async fn post_run(
    Json(nodes): Json<Vec<Node>>,
) -> Result<Json<RunReport>, (StatusCode, Json<ErrorResponse>)> {
    Engine::new(nodes).run().map(Json).map_err(|e| {
        warn!(error = %e, "rejected run request");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
                field: e.field(),
            }),
        )
    })
}
