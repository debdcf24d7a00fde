//! Spotify Web API client
//!
//! Thin typed passthrough: each method issues exactly one Web API request and
//! hands back the decoded JSON. Reshaping for display happens in `summary`.

use super::auth::{AuthMode, TokenCache};
use super::error::{error_message, SpotifyError};
use super::models::{PlaybackTarget, SearchType, TimeRange};
use crate::config::Credentials;
use reqwest::{Method, StatusCode, Url};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, SpotifyError>;

pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: Url,
    tokens: TokenCache,
    user_id: OnceCell<String>,
}

impl SpotifyClient {
    pub fn new(
        credentials: Credentials,
        api_base: &str,
        accounts_base: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SpotifyError::transport)?;

        let api_base = Url::parse(api_base)
            .map_err(|e| SpotifyError::InvalidUrl(format!("{api_base}: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(SpotifyError::InvalidUrl(api_base.to_string()));
        }

        Ok(Self {
            tokens: TokenCache::new(http.clone(), accounts_base, credentials),
            http,
            api_base,
            user_id: OnceCell::new(),
        })
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.tokens.mode()
    }

    /// Ensures a usable access token is cached. Cheap when one already is.
    pub async fn authenticate(&self) -> Result<()> {
        self.tokens.token().await.map(|_| ())
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub async fn search(&self, query: &str, kind: SearchType, limit: u32) -> Result<Value> {
        let params = [
            ("q", query.to_string()),
            ("type", kind.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        self.get(&["search"], &params).await
    }

    // =========================================================================
    // Player
    // =========================================================================

    /// Current playback state, or `None` when nothing is playing.
    pub async fn current_playback(&self) -> Result<Option<Value>> {
        self.send(Method::GET, &["me", "player"], &[], None).await
    }

    pub async fn play(&self, device_id: Option<&str>, target: Option<&PlaybackTarget>) -> Result<()> {
        let body = target.map(|t| match t {
            PlaybackTarget::Track(uri) => json!({ "uris": [uri] }),
            PlaybackTarget::Context(uri) => json!({ "context_uri": uri }),
        });
        self.send(Method::PUT, &["me", "player", "play"], &device_param(device_id), body.as_ref())
            .await
            .map(|_| ())
    }

    pub async fn pause(&self, device_id: Option<&str>) -> Result<()> {
        self.send(Method::PUT, &["me", "player", "pause"], &device_param(device_id), None)
            .await
            .map(|_| ())
    }

    pub async fn skip_next(&self, device_id: Option<&str>) -> Result<()> {
        self.send(Method::POST, &["me", "player", "next"], &device_param(device_id), None)
            .await
            .map(|_| ())
    }

    pub async fn skip_previous(&self, device_id: Option<&str>) -> Result<()> {
        self.send(Method::POST, &["me", "player", "previous"], &device_param(device_id), None)
            .await
            .map(|_| ())
    }

    pub async fn set_volume(&self, volume_percent: u8, device_id: Option<&str>) -> Result<()> {
        let mut params = device_param(device_id);
        params.push(("volume_percent", volume_percent.to_string()));
        self.send(Method::PUT, &["me", "player", "volume"], &params, None)
            .await
            .map(|_| ())
    }

    pub async fn devices(&self) -> Result<Value> {
        self.get(&["me", "player", "devices"], &[]).await
    }

    // =========================================================================
    // Playlists
    // =========================================================================

    pub async fn user_playlists(&self, limit: u32) -> Result<Value> {
        self.get(&["me", "playlists"], &[("limit", limit.to_string())]).await
    }

    pub async fn create_playlist(&self, name: &str, description: &str, public: bool) -> Result<Value> {
        let user_id = self.current_user_id().await?;
        let body = json!({
            "name": name,
            "description": description,
            "public": public,
        });
        self.send(Method::POST, &["users", user_id, "playlists"], &[], Some(&body))
            .await?
            .ok_or_else(|| empty_body("create playlist"))
    }

    pub async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<Value> {
        let body = json!({ "uris": uris });
        self.send(Method::POST, &["playlists", playlist_id, "tracks"], &[], Some(&body))
            .await
            .map(|snapshot| snapshot.unwrap_or(Value::Null))
    }

    // =========================================================================
    // User data
    // =========================================================================

    pub async fn top_tracks(&self, time_range: TimeRange, limit: u32) -> Result<Value> {
        let params = [
            ("time_range", time_range.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        self.get(&["me", "top", "tracks"], &params).await
    }

    pub async fn recently_played(&self, limit: u32) -> Result<Value> {
        self.get(&["me", "player", "recently-played"], &[("limit", limit.to_string())])
            .await
    }

    pub async fn current_user(&self) -> Result<Value> {
        self.get(&["me"], &[]).await
    }

    /// Resolved once per process; concurrent callers share the lookup.
    async fn current_user_id(&self) -> Result<&str> {
        self.user_id
            .get_or_try_init(|| async {
                let profile = self.current_user().await?;
                profile
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| empty_body("current user id"))
            })
            .await
            .map(String::as_str)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Value> {
        self.send(Method::GET, segments, params, None)
            .await?
            .ok_or_else(|| empty_body(&segments.join("/")))
    }

    /// Appends `segments` to the API root. Each segment is percent-encoded,
    /// so caller-supplied ids always stay inside their own segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SpotifyError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues one authenticated request. `Ok(None)` means the API answered
    /// without a body (204 or empty 2xx).
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let url = self.endpoint(segments)?;
        let token = self.tokens.token().await?;
        debug!(%method, %url, "Spotify request");

        let mut request = self.http.request(method, url.clone()).bearer_auth(&token);
        if !params.is_empty() {
            request = request.query(params);
        }
        request = match body {
            Some(body) => request.json(body),
            // The player endpoints reject bodiless PUT/POST without a length
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let response = request.send().await.map_err(SpotifyError::transport)?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let text = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate(&token).await;
            }

            let mut message = error_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            if let Some(seconds) = retry_after.filter(|_| status == StatusCode::TOO_MANY_REQUESTS) {
                message = format!("{message} (retry after {seconds}s)");
            }

            warn!(%status, %url, %message, "Spotify request rejected");
            return Err(SpotifyError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(SpotifyError::transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SpotifyError::Upstream {
                status: status.as_u16(),
                message: format!("invalid JSON from Spotify: {e}"),
            })
    }
}

fn device_param(device_id: Option<&str>) -> Vec<(&'static str, String)> {
    device_id
        .map(|id| vec![("device_id", id.to_string())])
        .unwrap_or_default()
}

fn empty_body(what: &str) -> SpotifyError {
    SpotifyError::Upstream {
        status: 204,
        message: format!("Spotify returned no data for {what}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SpotifyClient {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-token",
                "expires_in": 3600
            })))
            .mount(server)
            .await;

        let credentials = Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: Some("refresh".into()),
        };
        SpotifyClient::new(
            credentials,
            &format!("{}/v1", server.uri()),
            &server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_passes_query_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "jazz"))
            .and(query_param("type", "album"))
            .and(query_param("limit", "3"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "albums": { "items": [] } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.search("jazz", SearchType::Album, 3).await.unwrap();
        assert!(result["albums"]["items"].is_array());
    }

    #[tokio::test]
    async fn test_nothing_playing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.current_playback().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_play_track_sends_uris() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/me/player/play"))
            .and(query_param("device_id", "kitchen"))
            .and(body_json(json!({ "uris": ["spotify:track:1"] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let target = PlaybackTarget::from_uri("spotify:track:1");
        client.play(Some("kitchen"), Some(&target)).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_active_device_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/me/player/pause"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "status": 404, "message": "Player command failed: No active device found" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.pause(None).await.unwrap_err();
        assert_eq!(
            err,
            SpotifyError::Upstream {
                status: 404,
                message: "Player command failed: No active device found".into()
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limit_mentions_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_json(json!({ "error": { "status": 429, "message": "API rate limit exceeded" } })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.current_user().await.unwrap_err();
        assert_eq!(err.reason(), "API rate limit exceeded (retry after 7s)");
    }

    #[tokio::test]
    async fn test_create_playlist_resolves_user_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/users/alice/playlists"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "id": "pl1", "name": "Focus" })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let first = client.create_playlist("Focus", "", false).await.unwrap();
        assert_eq!(first["id"], "pl1");
        client.create_playlist("Focus", "", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_playlist_id_stays_in_its_segment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/me/player/next"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;
        let client = client_for(&server).await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s1" })))
            .mount(&server)
            .await;

        client
            .add_tracks_to_playlist("../me/player/next?x=", &["spotify:track:1".to_string()])
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let add = requests
            .iter()
            .find(|r| r.url.path().starts_with("/v1/playlists/"))
            .expect("request sent under /playlists");
        let segments: Vec<&str> = add.url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3], "tracks");
        assert!(segments[2].contains("%2F"));
        assert_eq!(add.url.query(), None);
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let credentials = Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: None,
        };
        let client = SpotifyClient::new(
            credentials,
            "https://api.spotify.com/v1/",
            "https://accounts.spotify.com",
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client.endpoint(&["me", "player"]).unwrap();
        assert_eq!(url.as_str(), "https://api.spotify.com/v1/me/player");
    }

    #[test]
    fn test_invalid_api_base_is_rejected() {
        let credentials = Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: None,
        };
        let result = SpotifyClient::new(
            credentials,
            "not a url",
            "https://accounts.spotify.com",
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(SpotifyError::InvalidUrl(_))));
    }
}
