//! Spotify Adapter Module
//!
//! This module wraps the Spotify Web API:
//! - Token acquisition and caching (client-credentials or refresh-token grant)
//! - Typed passthrough operations, one upstream request each
//! - Response reshaping for tool output

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod summary;

// Re-export commonly used types for convenience
pub use auth::AuthMode;
pub use client::SpotifyClient;
pub use error::SpotifyError;
