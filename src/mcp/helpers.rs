//! MCP Protocol Helpers
//!
//! This module contains helper functions for JSON-RPC communication.

use super::error::McpError;
use super::models::JSONRPC_VERSION;
use serde_json::{json, Value};

/// Builds a JSON-RPC 2.0 success response.
///
/// # Arguments
///
/// * `id` – The request identifier that must be echoed back.
/// * `result` – The payload representing the successful outcome.
///
/// # Returns
///
/// A `serde_json::Value` shaped as a JSON-RPC success envelope.
pub fn rpc_success(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

/// Builds a JSON-RPC 2.0 error response.
///
/// # Arguments
///
/// * `id` – The request identifier (or `null` if unavailable).
/// * `code` – The JSON-RPC error code (e.g., -32601 for method not found).
/// * `message` – Human-readable description of the error.
/// * `data` – Optional diagnostic payload; omitted from the envelope when `None`.
///
/// # Returns
///
/// A `serde_json::Value` shaped as a JSON-RPC error envelope.
pub fn rpc_error(id: Value, code: i32, message: impl Into<String>, data: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(data) = data {
        error["data"] = data;
    }

    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": error,
    })
}

/// Translates a typed error into its JSON-RPC error envelope.
pub fn rpc_error_from(id: Value, err: &McpError) -> Value {
    rpc_error(id, err.code(), err.message(), Some(err.data()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_without_data_omits_field() {
        let error = rpc_error(json!(1), -32601, "Method not found", None);
        assert!(error["error"].get("data").is_none());
    }

    #[test]
    fn test_error_from_typed_error() {
        let err = McpError::UnknownTool("dance".into());
        let envelope = rpc_error_from(json!("req-7"), &err);
        assert_eq!(envelope["id"], "req-7");
        assert_eq!(envelope["error"]["code"], -32601);
        assert_eq!(envelope["error"]["message"], "Unknown tool");
        assert_eq!(envelope["error"]["data"], "dance");
    }
}
