//! MCP Protocol Models and Constants
//!
//! This module contains all data structures and constants related to the
//! Model Context Protocol (MCP) wire format.

use super::error::McpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// MCP Constants
// =============================================================================

/// JSON-RPC protocol token
pub const JSONRPC_VERSION: &str = "2.0";
/// Protocol version for MCP
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// Server version reported on `initialize`
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// =============================================================================
// MCP Protocol Models
// =============================================================================

/// Standard JSON-RPC 2.0 Request envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version (must be "2.0")
    pub jsonrpc: String,

    /// Method name to invoke
    pub method: String,

    /// Parameters for the method
    #[serde(default)]
    pub params: Option<Value>,

    /// Request identifier
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Decodes and checks an envelope that has already been parsed as JSON.
    pub fn from_value(raw: Value) -> Result<Self, McpError> {
        if !raw.is_object() {
            return Err(McpError::Protocol("request must be a JSON object".into()));
        }

        let request: JsonRpcRequest =
            serde_json::from_value(raw).map_err(|e| McpError::Protocol(e.to_string()))?;

        if request.jsonrpc != JSONRPC_VERSION {
            return Err(McpError::Protocol(format!(
                "expected jsonrpc \"{}\", got \"{}\"",
                JSONRPC_VERSION, request.jsonrpc
            )));
        }
        if let Some(id) = &request.id {
            if !is_valid_id(id) {
                return Err(McpError::Protocol("id must be a string, number or null".into()));
            }
        }

        Ok(request)
    }

    /// Identifier to echo in the response.
    pub fn id(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }
}

fn is_valid_id(id: &Value) -> bool {
    matches!(id, Value::String(_) | Value::Number(_) | Value::Null)
}

/// Best-effort id extraction from a raw body, used when the envelope itself
/// is rejected. Anything that is not a valid id becomes `null`.
pub fn recover_id(raw: &Value) -> Value {
    raw.get("id")
        .filter(|id| is_valid_id(id))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Parameters of a `tools/call` request
#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    /// Registered tool name
    pub name: String,

    /// Tool arguments; absent or `null` means no arguments
    #[serde(default)]
    pub arguments: Option<Value>,
}

// =============================================================================
// Tool Models
// =============================================================================

/// Entry returned by `tools/list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// One content block of a tool result. Only text is produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// Uniform result envelope for `tools/call`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,

    /// Set when the upstream rejected the requested action
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text",
                text: text.into(),
            }],
            is_error: false,
        }
    }

    /// Pretty-printed JSON payload.
    pub fn json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }
}
