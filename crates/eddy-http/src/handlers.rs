//! API request handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use eddy_types::Node;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;

/// Fetch a required query parameter.
fn required_param(params: &BTreeMap<String, String>, name: &str) -> Result<String, ApiError> {
    params
        .get(name)
        .cloned()
        .ok_or_else(|| ApiError::InvalidRequest {
            message: format!("missing query parameter `{name}`"),
        })
}

/// Fetch the `identifier` parameter, rejecting empty or whitespace-only values.
fn identifier_param(params: &BTreeMap<String, String>) -> Result<String, ApiError> {
    let identifier = required_param(params, "identifier")?;
    if identifier.trim().is_empty() {
        return Err(ApiError::InvalidRequest {
            message: "identifier must not be empty".to_string(),
        });
    }
    Ok(identifier)
}

// -----------------------------------------------------------------------
// GET /hash-ring/node?key=K
// -----------------------------------------------------------------------

/// Return the node that owns `key`.
pub(crate) async fn get_node_for_key(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Node>, ApiError> {
    let key = required_param(&params, "key")?;
    state
        .membership
        .node_for_key(&key)
        .map(Json)
        .ok_or(ApiError::NoOwner { key })
}

// -----------------------------------------------------------------------
// POST /hash-ring/node?identifier=ID
// -----------------------------------------------------------------------

/// Add a node to the ring. Adding an existing member is a no-op.
pub(crate) async fn add_node(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    let identifier = identifier_param(&params)?;
    let node = state.membership.add_node(identifier);
    debug!(%node, "add_node request");
    Ok(StatusCode::NO_CONTENT)
}

// -----------------------------------------------------------------------
// DELETE /hash-ring/node?identifier=ID
// -----------------------------------------------------------------------

/// Remove a node from the ring. Unknown nodes are not an error.
pub(crate) async fn remove_node(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    let identifier = identifier_param(&params)?;
    let removed = state.membership.remove_node(&identifier);
    debug!(%identifier, removed, "remove_node request");
    Ok(StatusCode::NO_CONTENT)
}

// -----------------------------------------------------------------------
// GET /hash-ring/nodes
// -----------------------------------------------------------------------

/// List current members, sorted by identifier.
pub(crate) async fn list_nodes(State(state): State<AppState>) -> Json<Vec<Node>> {
    Json(state.membership.nodes())
}

// -----------------------------------------------------------------------
// GET /hash-ring/stats
// -----------------------------------------------------------------------

/// Response body for `GET /hash-ring/stats`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RingStats {
    /// Virtual positions placed per node.
    pub replica_count: u16,
    /// Distinct members.
    pub node_count: usize,
    /// Occupied positions.
    pub vnode_count: usize,
}

/// Report ring sizing, read from one consistent snapshot.
pub(crate) async fn ring_stats(State(state): State<AppState>) -> Json<RingStats> {
    let ring = state.membership.ring().snapshot();
    Json(RingStats {
        replica_count: ring.replica_count(),
        node_count: ring.node_count(),
        vnode_count: ring.vnode_count(),
    })
}
