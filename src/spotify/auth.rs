//! Access Token Cache
//!
//! The token is process-scoped: fetched on first use, reused until shortly
//! before expiry, then replaced. The state mutex is held across the token
//! request, so concurrent callers wait for the in-flight refresh and reuse its
//! result instead of issuing their own.

use super::error::{error_message, SpotifyError};
use super::models::TokenResponse;
use crate::config::Credentials;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);
/// Upper bound on the lifetime accepted from the accounts service.
const MAX_TOKEN_LIFETIME_SECS: u64 = 86_400;

/// Which grant the cache uses to obtain tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// App-only access; search and catalog reads only.
    ClientCredentials,
    /// User-scoped access; required for playback and library operations.
    RefreshToken,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_SKEW < self.expires_at
    }
}

struct TokenState {
    access: Option<AccessToken>,
    refresh_token: Option<String>,
}

pub struct TokenCache {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    mode: AuthMode,
    state: Mutex<TokenState>,
}

impl TokenCache {
    pub fn new(http: reqwest::Client, accounts_base: &str, credentials: Credentials) -> Self {
        let mode = if credentials.refresh_token.is_some() {
            AuthMode::RefreshToken
        } else {
            AuthMode::ClientCredentials
        };

        Self {
            http,
            token_url: format!("{}/api/token", accounts_base.trim_end_matches('/')),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            mode,
            state: Mutex::new(TokenState {
                access: None,
                refresh_token: credentials.refresh_token,
            }),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Returns a valid access token, requesting a new one if needed.
    pub async fn token(&self) -> Result<String, SpotifyError> {
        let mut state = self.state.lock().await;

        if let Some(access) = state.access.as_ref().filter(|a| a.is_fresh()) {
            return Ok(access.value.clone());
        }

        let response = self.request_grant(state.refresh_token.as_deref()).await?;

        if let Some(rotated) = response.refresh_token {
            debug!("refresh token rotated by accounts service");
            state.refresh_token = Some(rotated);
        }

        let lifetime = response.expires_in.min(MAX_TOKEN_LIFETIME_SECS);
        let value = response.access_token;
        state.access = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        info!(mode = ?self.mode, expires_in = lifetime, "obtained Spotify access token");
        Ok(value)
    }

    /// Drops the cached token if it is still `rejected`, so the next call
    /// requests a new one. A token refreshed in the meantime is kept.
    pub async fn invalidate(&self, rejected: &str) {
        let mut state = self.state.lock().await;
        if state.access.as_ref().is_some_and(|a| a.value == rejected) {
            state.access = None;
        }
    }

    async fn request_grant(&self, refresh_token: Option<&str>) -> Result<TokenResponse, SpotifyError> {
        let form: Vec<(&str, &str)> = match refresh_token {
            Some(token) => vec![("grant_type", "refresh_token"), ("refresh_token", token)],
            None => vec![("grant_type", "client_credentials")],
        };

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| SpotifyError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = error_message(&body).unwrap_or_else(|| format!("HTTP {status}"));
            error!(%status, %reason, "Spotify token grant rejected");
            return Err(SpotifyError::Auth(reason));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SpotifyError::Auth(format!("invalid token response: {e}")))
    }
}
