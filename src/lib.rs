//! Spotify MCP Server Library
//!
//! This library exposes the Spotify Web API as a set of MCP (Model Context
//! Protocol) tools served over JSON-RPC 2.0.

// Domain modules
pub mod mcp;
pub mod spotify;

// Infrastructure
pub mod config;
pub mod router;
pub mod state;
