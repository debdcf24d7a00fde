//! Application State Management
//!
//! Process-scoped state shared by every request: the tool registry and the
//! Spotify client (which owns the token cache). When credentials are missing
//! the client slot holds the configuration error instead, and tool requests
//! report it.

use crate::config::{Config, ConfigError};
use crate::mcp::registry::{RegistryError, ToolRegistry};
use crate::spotify::{SpotifyClient, SpotifyError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to build Spotify client: {0}")]
    Client(#[from] SpotifyError),
}

pub struct AppState {
    /// Server identifier reported on `initialize`
    pub server_name: String,

    /// Static tool catalogue
    pub registry: ToolRegistry,

    spotify: Result<SpotifyClient, ConfigError>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let registry = ToolRegistry::new()?;

        let spotify = match config.credentials() {
            Ok(credentials) => {
                let client = SpotifyClient::new(
                    credentials,
                    &config.api_base,
                    &config.accounts_base,
                    Duration::from_secs(config.timeout_secs),
                )?;
                info!(mode = ?client.auth_mode(), "Spotify client configured");
                Ok(client)
            }
            Err(err) => {
                warn!(error = %err, "Spotify credentials missing; tool requests will fail");
                Err(err)
            }
        };

        Ok(Self {
            server_name: config.server_name.clone(),
            registry,
            spotify,
        })
    }

    /// The Spotify client, or the reason it could not be configured.
    pub fn spotify(&self) -> Result<&SpotifyClient, ConfigError> {
        self.spotify.as_ref().map_err(Clone::clone)
    }
}
