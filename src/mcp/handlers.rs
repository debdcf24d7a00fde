//! MCP (Model Context Protocol) route handlers
//!
//! This module implements the JSON-RPC dispatcher. `dispatch` is the single
//! place where errors from the registry, the executor and the Spotify adapter
//! are translated into JSON-RPC error objects; every path answers with the
//! request's `id`, or `null` when it could not be recovered.

use super::error::McpError;
use super::helpers::{rpc_error, rpc_error_from, rpc_success};
use super::models::*;
use super::tools;
use crate::state::{AppState, SharedState};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Creates routes for MCP-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(handle_mcp).options(handle_preflight))
        .route("/mcp", post(handle_mcp).options(handle_preflight)) // Standard endpoint
        .route("/mcp/", post(handle_mcp).options(handle_preflight)) // Trailing slash safety
}

/// Answers bare `OPTIONS` requests. Browser preflights carrying
/// `Access-Control-Request-Method` are answered by the CORS layer first.
async fn handle_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// Endpoint: POST /mcp
/// Handles the Model Context Protocol communication for POST requests.
async fn handle_mcp(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    let (status, response_body) = dispatch(&state, &body).await;
    (status, Json(response_body))
}

/// Parses, routes and answers one JSON-RPC request body.
pub async fn dispatch(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
    // ReceivedRequest -> Parsed
    let raw: Value = match serde_json::from_slice(body) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "JSON parse error");
            return (
                StatusCode::OK,
                rpc_error(Value::Null, PARSE_ERROR, "Parse error", Some(json!(e.to_string()))),
            );
        }
    };

    let recovered_id = recover_id(&raw);
    let request = match JsonRpcRequest::from_value(raw) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "rejected JSON-RPC envelope");
            return (err.http_status(), rpc_error_from(recovered_id, &err));
        }
    };

    let id = request.id();
    debug!(method = %request.method, id = %id, "MCP call");

    // Parsed -> Routed -> Responded
    match route(state, request).await {
        Ok(result) => (StatusCode::OK, rpc_success(id, result)),
        Err(err) => (err.http_status(), rpc_error_from(id, &err)),
    }
}

// =============================================================================
// MCP Method Handlers
// =============================================================================

async fn route(state: &AppState, request: JsonRpcRequest) -> Result<Value, McpError> {
    match request.method.as_str() {
        "initialize" => Ok(handle_initialize(state)),
        "ping" => Ok(json!({})),
        method if method.starts_with("notifications/") => Ok(json!({})),
        "tools/list" => handle_tools_list(state),
        "tools/call" => handle_tools_call(state, request.params).await,
        method => {
            warn!(method, "unknown method");
            Err(McpError::MethodNotFound(method.to_string()))
        }
    }
}

/// Handles `initialize` request (Handshake).
fn handle_initialize(state: &AppState) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": state.server_name,
            "version": SERVER_VERSION
        }
    })
}

/// Handles `tools/list` request.
fn handle_tools_list(state: &AppState) -> Result<Value, McpError> {
    state.spotify()?;
    Ok(json!({ "tools": state.registry.list() }))
}

/// Handles `tools/call` request.
async fn handle_tools_call(state: &AppState, params: Option<Value>) -> Result<Value, McpError> {
    let client = state.spotify()?;

    let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let result = tools::execute(&state.registry, client, &params.name, params.arguments).await?;
    Ok(json!(result))
}
