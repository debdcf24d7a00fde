//! Spotify Domain Models
//!
//! Typed arguments for the adapter operations and the few response shapes the
//! adapter decodes itself. Everything else passes through as `serde_json::Value`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Search
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Track,
    Album,
    Artist,
    Playlist,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Track => "track",
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::Playlist => "playlist",
        }
    }

    /// Key under which the search endpoint nests results of this type.
    pub fn plural(&self) -> &'static str {
        match self {
            SearchType::Track => "tracks",
            SearchType::Album => "albums",
            SearchType::Artist => "artists",
            SearchType::Playlist => "playlists",
        }
    }
}

// =============================================================================
// Top tracks
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

// =============================================================================
// Playback
// =============================================================================

/// What `play` should start. Track URIs are queued directly; any other URI
/// (album, playlist, artist) is played as a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    Track(String),
    Context(String),
}

impl PlaybackTarget {
    pub fn from_uri(uri: &str) -> Self {
        if uri.starts_with("spotify:track:") || uri.contains("open.spotify.com/track/") {
            PlaybackTarget::Track(uri.to_string())
        } else {
            PlaybackTarget::Context(uri.to_string())
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            PlaybackTarget::Track(uri) | PlaybackTarget::Context(uri) => uri,
        }
    }
}

// =============================================================================
// Accounts service
// =============================================================================

/// Successful response from the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Lifetime in seconds
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,

    /// Spotify may rotate the refresh token on a refresh grant
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}
