//! Tool Executor
//!
//! `tools/call` handling: look the tool up, validate its arguments against the
//! registered schema, decode them into a typed [`ToolCall`], authenticate, and
//! run exactly one adapter operation. Results are folded into the uniform
//! [`ToolResult`] text envelope.

use super::error::McpError;
use super::models::ToolResult;
use super::registry::{ToolName, ToolRegistry};
use crate::spotify::models::{PlaybackTarget, SearchType, TimeRange};
use crate::spotify::{summary, SpotifyClient, SpotifyError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

// =============================================================================
// Tool Arguments
// =============================================================================

fn default_search_limit() -> u32 {
    10
}

fn default_page_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,

    #[serde(rename = "type", alias = "search_type", default)]
    pub kind: SearchType,

    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackAction {
    Play,
    Pause,
    Resume,
    Next,
    Previous,
}

impl PlaybackAction {
    fn failure(&self) -> &'static str {
        match self {
            PlaybackAction::Play => "Failed to start playback",
            PlaybackAction::Pause => "Failed to pause playback",
            PlaybackAction::Resume => "Failed to resume playback",
            PlaybackAction::Next => "Failed to skip to next track",
            PlaybackAction::Previous => "Failed to skip to previous track",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ControlArgs {
    pub action: PlaybackAction,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeArgs {
    pub volume: u8,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitArgs {
    #[serde(default = "default_page_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistArgs {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddToPlaylistArgs {
    pub playlist_id: String,
    pub track_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopTracksArgs {
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default = "default_page_limit")]
    pub limit: u32,
}

/// A decoded, schema-checked tool invocation.
#[derive(Debug)]
pub enum ToolCall {
    SearchMusic(SearchArgs),
    ControlPlayback(ControlArgs),
    GetCurrentPlayback,
    SetVolume(VolumeArgs),
    GetDevices,
    GetUserPlaylists(LimitArgs),
    CreatePlaylist(CreatePlaylistArgs),
    AddToPlaylist(AddToPlaylistArgs),
    GetTopTracks(TopTracksArgs),
    GetRecentlyPlayed(LimitArgs),
    GetUserProfile,
}

impl ToolCall {
    pub fn decode(tool: ToolName, arguments: Value) -> Result<Self, McpError> {
        Ok(match tool {
            ToolName::SearchMusic => ToolCall::SearchMusic(args(tool, arguments)?),
            ToolName::ControlPlayback => ToolCall::ControlPlayback(args(tool, arguments)?),
            ToolName::GetCurrentPlayback => ToolCall::GetCurrentPlayback,
            ToolName::SetVolume => ToolCall::SetVolume(args(tool, arguments)?),
            ToolName::GetDevices => ToolCall::GetDevices,
            ToolName::GetUserPlaylists => ToolCall::GetUserPlaylists(args(tool, arguments)?),
            ToolName::CreatePlaylist => ToolCall::CreatePlaylist(args(tool, arguments)?),
            ToolName::AddToPlaylist => ToolCall::AddToPlaylist(args(tool, arguments)?),
            ToolName::GetTopTracks => ToolCall::GetTopTracks(args(tool, arguments)?),
            ToolName::GetRecentlyPlayed => ToolCall::GetRecentlyPlayed(args(tool, arguments)?),
            ToolName::GetUserProfile => ToolCall::GetUserProfile,
        })
    }
}

fn args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::Validation {
        tool: tool.as_str().to_string(),
        errors: vec![e.to_string()],
    })
}

// =============================================================================
// Execution
// =============================================================================

/// Handles `tools/call` (Business Logic).
pub async fn execute(
    registry: &ToolRegistry,
    client: &SpotifyClient,
    name: &str,
    arguments: Option<Value>,
) -> Result<ToolResult, McpError> {
    let tool = registry.lookup(name)?;
    let arguments = match arguments {
        None | Some(Value::Null) => json!({}),
        Some(arguments) => arguments,
    };

    registry.validate(tool, &arguments)?;
    let call = ToolCall::decode(tool, arguments)?;

    client.authenticate().await?;

    let result = run(client, call).await;
    match &result {
        Ok(output) if output.is_error => warn!(tool = name, "tool reported failure"),
        Ok(_) => info!(tool = name, "tool call succeeded"),
        Err(err) => warn!(tool = name, error = %err, "tool call failed"),
    }
    result
}

async fn run(client: &SpotifyClient, call: ToolCall) -> Result<ToolResult, McpError> {
    let result = match call {
        ToolCall::SearchMusic(args) => {
            let results = client.search(&args.query, args.kind, args.limit).await?;
            ToolResult::json(&summary::search_results(
                &results,
                args.kind,
                args.limit as usize,
            ))
        }
        ToolCall::ControlPlayback(args) => control_playback(client, args).await?,
        ToolCall::GetCurrentPlayback => match client.current_playback().await? {
            Some(state) => match summary::playback(&state) {
                Some(playback) => ToolResult::json(&playback),
                None => ToolResult::text("No track currently playing"),
            },
            None => ToolResult::text("No track currently playing"),
        },
        ToolCall::SetVolume(args) => {
            let outcome = client
                .set_volume(args.volume, args.device_id.as_deref())
                .await;
            report(outcome, format!("Volume set to {}%", args.volume), "Failed to set volume")?
        }
        ToolCall::GetDevices => {
            let devices = client.devices().await?;
            ToolResult::json(&summary::devices(&devices))
        }
        ToolCall::GetUserPlaylists(args) => {
            let page = client.user_playlists(args.limit).await?;
            ToolResult::json(&summary::playlists(&page))
        }
        ToolCall::CreatePlaylist(args) => {
            let playlist = client
                .create_playlist(&args.name, &args.description, args.public)
                .await?;
            ToolResult::text(format!(
                "Created playlist: {} (ID: {})",
                playlist["name"].as_str().unwrap_or(&args.name),
                playlist["id"].as_str().unwrap_or("unknown")
            ))
        }
        ToolCall::AddToPlaylist(args) => {
            client
                .add_tracks_to_playlist(&args.playlist_id, &args.track_uris)
                .await?;
            ToolResult::text(format!(
                "Added {} track(s) to playlist {}",
                args.track_uris.len(),
                args.playlist_id
            ))
        }
        ToolCall::GetTopTracks(args) => {
            let page = client.top_tracks(args.time_range, args.limit).await?;
            ToolResult::json(&summary::top_tracks(&page))
        }
        ToolCall::GetRecentlyPlayed(args) => {
            let page = client.recently_played(args.limit).await?;
            ToolResult::json(&summary::recently_played(&page))
        }
        ToolCall::GetUserProfile => {
            let user = client.current_user().await?;
            ToolResult::json(&summary::profile(&user))
        }
    };
    Ok(result)
}

async fn control_playback(client: &SpotifyClient, args: ControlArgs) -> Result<ToolResult, McpError> {
    let device = args.device_id.as_deref();

    let (outcome, success) = match args.action {
        PlaybackAction::Play => match args.uri.as_deref().map(PlaybackTarget::from_uri) {
            Some(target) => {
                let outcome = client.play(device, Some(&target)).await;
                (outcome, format!("Playing {}", target.uri()))
            }
            None => (client.play(device, None).await, "Playback started".to_string()),
        },
        PlaybackAction::Resume => (client.play(device, None).await, "Playback resumed".to_string()),
        PlaybackAction::Pause => (client.pause(device).await, "Playback paused".to_string()),
        PlaybackAction::Next => (client.skip_next(device).await, "Skipped to next track".to_string()),
        PlaybackAction::Previous => (
            client.skip_previous(device).await,
            "Skipped to previous track".to_string(),
        ),
    };

    report(outcome, success, args.action.failure())
}

/// Folds the outcome of a player action into a result envelope. Upstream
/// rejections (no active device, premium required) become an `isError`
/// result naming the action; authentication failures still propagate.
fn report(
    outcome: Result<(), SpotifyError>,
    success: String,
    failure: &str,
) -> Result<ToolResult, McpError> {
    match outcome {
        Ok(()) => Ok(ToolResult::text(success)),
        Err(SpotifyError::Upstream { message, .. }) => {
            Ok(ToolResult::failure(format!("{failure}: {message}")))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_search_defaults() {
        let call = ToolCall::decode(ToolName::SearchMusic, json!({ "query": "jazz" })).unwrap();
        match call {
            ToolCall::SearchMusic(args) => {
                assert_eq!(args.kind, SearchType::Track);
                assert_eq!(args.limit, 10);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_decode_search_type_alias() {
        let call = ToolCall::decode(
            ToolName::SearchMusic,
            json!({ "query": "kind of blue", "search_type": "album" }),
        )
        .unwrap();
        assert!(matches!(call, ToolCall::SearchMusic(SearchArgs { kind: SearchType::Album, .. })));
    }

    #[test]
    fn test_decode_control_action() {
        let call = ToolCall::decode(ToolName::ControlPlayback, json!({ "action": "next" })).unwrap();
        assert!(matches!(
            call,
            ToolCall::ControlPlayback(ControlArgs { action: PlaybackAction::Next, .. })
        ));
    }

    #[test]
    fn test_decode_argumentless_tools_ignore_extras() {
        let call = ToolCall::decode(ToolName::GetDevices, json!({ "verbose": true })).unwrap();
        assert!(matches!(call, ToolCall::GetDevices));
    }

    #[test]
    fn test_report_upstream_failure_is_result() {
        let outcome = Err(SpotifyError::Upstream {
            status: 404,
            message: "No active device found".into(),
        });
        let result = report(outcome, "Playback paused".into(), "Failed to pause playback").unwrap();
        assert!(result.is_error);
        assert_eq!(result.content[0].text, "Failed to pause playback: No active device found");
    }

    #[test]
    fn test_report_auth_failure_propagates() {
        let outcome = Err(SpotifyError::Auth("invalid_grant".into()));
        let err = report(outcome, "ok".into(), "Failed to pause playback").unwrap_err();
        assert!(matches!(err, McpError::Spotify(SpotifyError::Auth(_))));
    }
}
