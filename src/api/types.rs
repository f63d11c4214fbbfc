//! API query and error types.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /nodes`.
#[derive(Debug, Deserialize)]
pub struct NodesQuery {
    /// Return only the node with this id.
    pub id: Option<String>,
}

/// Query parameters for `GET /transfers`.
#[derive(Debug, Deserialize)]
pub struct TransfersQuery {
    /// Keep flows leaving this node.
    pub from: Option<String>,
    /// Keep flows reaching this node.
    pub to: Option<String>,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Offending input field, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}
