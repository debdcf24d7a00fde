//! Spotify adapter errors

use serde_json::Value;

/// Failures raised by the Spotify adapter.
///
/// `Auth` covers the accounts service (token grants); `Upstream` covers the
/// Web API itself. Transport failures are reported as `Upstream` with
/// `status == 0`. `InvalidUrl` is a misconfigured API root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpotifyError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("Spotify API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("invalid Spotify API URL: {0}")]
    InvalidUrl(String),
}

impl SpotifyError {
    pub fn transport(err: reqwest::Error) -> Self {
        SpotifyError::Upstream {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }

    /// The human-readable reason without the status prefix.
    pub fn reason(&self) -> &str {
        match self {
            SpotifyError::Auth(message) => message,
            SpotifyError::Upstream { message, .. } => message,
            SpotifyError::InvalidUrl(url) => url,
        }
    }
}

/// Pulls a message out of a Spotify error body.
///
/// The Web API answers `{"error": {"status": 404, "message": "..."}}` while the
/// accounts service answers `{"error": "invalid_client", "error_description": "..."}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;

    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    value
        .get("error_description")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}
