//! MCP error taxonomy
//!
//! Every failure below the dispatcher is one of these. The dispatcher is the
//! only place they are turned into JSON-RPC error objects.

use super::models::{INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND};
use crate::config::ConfigError;
use crate::spotify::SpotifyError;
use axum::http::StatusCode;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("invalid request: {0}")]
    Protocol(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid arguments for {tool}: {}", .errors.join("; "))]
    Validation { tool: String, errors: Vec<String> },

    #[error(transparent)]
    Spotify(#[from] SpotifyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::Protocol(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) | McpError::UnknownTool(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::Validation { .. } => INVALID_PARAMS,
            McpError::Spotify(_) | McpError::Config(_) => INTERNAL_ERROR,
        }
    }

    /// Stable, classifiable message. Details go in [`McpError::data`].
    pub fn message(&self) -> String {
        match self {
            McpError::Protocol(_) => "Invalid Request".into(),
            McpError::MethodNotFound(_) => "Method not found".into(),
            McpError::UnknownTool(_) => "Unknown tool".into(),
            McpError::InvalidParams(_) => "Invalid params".into(),
            McpError::Validation { .. } => "Invalid arguments".into(),
            McpError::Spotify(SpotifyError::Auth(_)) => "Authentication failed".into(),
            McpError::Spotify(SpotifyError::Upstream { .. } | SpotifyError::InvalidUrl(_)) => {
                "Spotify API error".into()
            }
            // Names the variables, so the operator can fix the deployment
            McpError::Config(err) => err.to_string(),
        }
    }

    pub fn data(&self) -> Value {
        match self {
            McpError::Protocol(detail) | McpError::InvalidParams(detail) => json!(detail),
            McpError::MethodNotFound(method) => json!(method),
            McpError::UnknownTool(name) => json!(name),
            McpError::Validation { tool, errors } => json!({ "tool": tool, "errors": errors }),
            McpError::Spotify(SpotifyError::Auth(message) | SpotifyError::InvalidUrl(message)) => {
                json!(message)
            }
            McpError::Spotify(SpotifyError::Upstream { status, message }) => {
                json!({ "status": status, "message": message })
            }
            McpError::Config(ConfigError::MissingCredentials(missing)) => {
                json!({ "missing": missing })
            }
        }
    }

    /// Transport status for the response carrying this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            McpError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}
