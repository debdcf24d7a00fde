//! Model Context Protocol (MCP) Module
//!
//! This module contains all MCP protocol implementation, including:
//! - Protocol models (JsonRpcRequest, tool descriptors, constants)
//! - RPC helpers (success/error envelopes)
//! - The tool registry and executor
//! - MCP handlers (initialize, tools/list, tools/call, etc.)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod registry;
pub mod tools;

// Re-export commonly used types and functions
pub use error::McpError;
pub use handlers::routes;
