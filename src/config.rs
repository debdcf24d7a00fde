//! Server Configuration
//!
//! Command-line flags with environment fallbacks. The Spotify credentials are
//! optional at this level: the server still starts without them and reports
//! the missing variables on every tool request instead.

use clap::Parser;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default Spotify Web API root
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
/// Default Spotify accounts service root
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
/// Default server identifier reported on `initialize`
pub const DEFAULT_SERVER_NAME: &str = "spotify-mcp-server";

const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone, Parser)]
#[command(name = "spotify-mcp", version, about = "MCP JSON-RPC server for the Spotify Web API")]
pub struct Config {
    /// Spotify application client id
    #[arg(long, env = CLIENT_ID_VAR, hide_env_values = true)]
    pub client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, env = CLIENT_SECRET_VAR, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// User refresh token; enables user-scoped operations such as playback control
    #[arg(long, env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Server name reported in the MCP handshake
    #[arg(long, env = "MCP_SERVER_NAME", default_value = DEFAULT_SERVER_NAME)]
    pub server_name: String,

    /// Spotify Web API root
    #[arg(long, env = "SPOTIFY_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Spotify accounts service root (token endpoint lives under `/api/token`)
    #[arg(long, env = "SPOTIFY_ACCOUNTS_BASE", default_value = DEFAULT_ACCOUNTS_BASE)]
    pub accounts_base: String,

    /// Request timeout for upstream calls, in seconds
    #[arg(long, env = "SPOTIFY_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("server_name", &self.server_name)
            .field("api_base", &self.api_base)
            .field("accounts_base", &self.accounts_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Resolves the Spotify credentials, naming every required variable that
    /// is absent or empty.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let client_id = non_empty(&self.client_id);
        let client_secret = non_empty(&self.client_secret);

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
                refresh_token: non_empty(&self.refresh_token).map(str::to_string),
            }),
            (client_id, client_secret) => {
                let mut missing = Vec::new();
                if client_id.is_none() {
                    missing.push(CLIENT_ID_VAR);
                }
                if client_secret.is_none() {
                    missing.push(CLIENT_SECRET_VAR);
                }
                Err(ConfigError::MissingCredentials(missing))
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Credentials
// =============================================================================

/// Spotify application credentials plus an optional user refresh token.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
