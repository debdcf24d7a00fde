//! Tool Registry
//!
//! The set of tools is closed: [`ToolName`] enumerates it, descriptors are
//! derived from it with an exhaustive match, and the executor dispatches on the
//! same enum. Input schemas are compiled once when the registry is built and
//! are the only source of truth for argument validation.

use super::error::McpError;
use super::models::ToolDescriptor;
use jsonschema::JSONSchema;
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SearchMusic,
    ControlPlayback,
    GetCurrentPlayback,
    SetVolume,
    GetDevices,
    GetUserPlaylists,
    CreatePlaylist,
    AddToPlaylist,
    GetTopTracks,
    GetRecentlyPlayed,
    GetUserProfile,
}

impl ToolName {
    /// Registry order, as returned by `tools/list`.
    pub const ALL: [ToolName; 11] = [
        ToolName::SearchMusic,
        ToolName::ControlPlayback,
        ToolName::GetCurrentPlayback,
        ToolName::SetVolume,
        ToolName::GetDevices,
        ToolName::GetUserPlaylists,
        ToolName::CreatePlaylist,
        ToolName::AddToPlaylist,
        ToolName::GetTopTracks,
        ToolName::GetRecentlyPlayed,
        ToolName::GetUserProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchMusic => "search_music",
            ToolName::ControlPlayback => "control_playback",
            ToolName::GetCurrentPlayback => "get_current_playback",
            ToolName::SetVolume => "set_volume",
            ToolName::GetDevices => "get_devices",
            ToolName::GetUserPlaylists => "get_user_playlists",
            ToolName::CreatePlaylist => "create_playlist",
            ToolName::AddToPlaylist => "add_to_playlist",
            ToolName::GetTopTracks => "get_top_tracks",
            ToolName::GetRecentlyPlayed => "get_recently_played",
            ToolName::GetUserProfile => "get_user_profile",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let (title, description, input_schema) = match self {
            ToolName::SearchMusic => (
                "Search music",
                "Search Spotify for tracks, albums, artists or playlists.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "minLength": 1, "description": "Search query" },
                        "type": {
                            "type": "string",
                            "enum": ["track", "album", "artist", "playlist"],
                            "default": "track",
                            "description": "Type of content to search for"
                        },
                        "limit": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 50,
                            "default": 10,
                            "description": "Number of results to return"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolName::ControlPlayback => (
                "Control playback",
                "Play, pause, resume or skip on the user's active Spotify device.",
                json!({
                    "type": "object",
                    "properties": {
                        "action": {
                            "type": "string",
                            "enum": ["play", "pause", "resume", "next", "previous"],
                            "description": "Playback action to perform"
                        },
                        "uri": {
                            "type": "string",
                            "description": "Track, album, artist or playlist URI to play (play only)"
                        },
                        "device_id": { "type": "string", "description": "Target device (optional)" }
                    },
                    "required": ["action"]
                }),
            ),
            ToolName::GetCurrentPlayback => (
                "Current playback",
                "Get the currently playing track and player state.",
                empty_schema(),
            ),
            ToolName::SetVolume => (
                "Set volume",
                "Set the playback volume of the active device.",
                json!({
                    "type": "object",
                    "properties": {
                        "volume": {
                            "type": "integer",
                            "minimum": 0,
                            "maximum": 100,
                            "description": "Volume percentage (0-100)"
                        },
                        "device_id": { "type": "string", "description": "Target device (optional)" }
                    },
                    "required": ["volume"]
                }),
            ),
            ToolName::GetDevices => (
                "List devices",
                "List the user's available Spotify devices.",
                empty_schema(),
            ),
            ToolName::GetUserPlaylists => (
                "List playlists",
                "List the current user's playlists.",
                json!({
                    "type": "object",
                    "properties": {
                        "limit": { "type": "integer", "minimum": 1, "maximum": 50, "default": 20 }
                    }
                }),
            ),
            ToolName::CreatePlaylist => (
                "Create playlist",
                "Create a new playlist owned by the current user.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "minLength": 1, "description": "Playlist name" },
                        "description": { "type": "string", "default": "" },
                        "public": { "type": "boolean", "default": false }
                    },
                    "required": ["name"]
                }),
            ),
            ToolName::AddToPlaylist => (
                "Add to playlist",
                "Add tracks to a playlist.",
                json!({
                    "type": "object",
                    "properties": {
                        "playlist_id": {
                            "type": "string",
                            "pattern": "^[A-Za-z0-9]+$",
                            "description": "Spotify playlist ID (base-62)"
                        },
                        "track_uris": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 1,
                            "maxItems": 100,
                            "description": "Spotify track URIs to add"
                        }
                    },
                    "required": ["playlist_id", "track_uris"]
                }),
            ),
            ToolName::GetTopTracks => (
                "Top tracks",
                "Get the user's most played tracks.",
                json!({
                    "type": "object",
                    "properties": {
                        "time_range": {
                            "type": "string",
                            "enum": ["short_term", "medium_term", "long_term"],
                            "default": "medium_term"
                        },
                        "limit": { "type": "integer", "minimum": 1, "maximum": 50, "default": 20 }
                    }
                }),
            ),
            ToolName::GetRecentlyPlayed => (
                "Recently played",
                "Get the user's recently played tracks.",
                json!({
                    "type": "object",
                    "properties": {
                        "limit": { "type": "integer", "minimum": 1, "maximum": 50, "default": 20 }
                    }
                }),
            ),
            ToolName::GetUserProfile => (
                "User profile",
                "Get the current user's profile.",
                empty_schema(),
            ),
        };

        ToolDescriptor {
            name: self.as_str(),
            title,
            description,
            input_schema,
        }
    }
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

// =============================================================================
// Registry
// =============================================================================

pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    validators: HashMap<ToolName, JSONSchema>,
}

impl ToolRegistry {
    /// Builds every descriptor and compiles its input schema.
    pub fn new() -> Result<Self, RegistryError> {
        let mut descriptors = Vec::with_capacity(ToolName::ALL.len());
        let mut validators = HashMap::with_capacity(ToolName::ALL.len());

        for tool in ToolName::ALL {
            let descriptor = tool.descriptor();
            let validator = JSONSchema::compile(&descriptor.input_schema).map_err(|e| {
                RegistryError {
                    tool: tool.as_str(),
                    reason: e.to_string(),
                }
            })?;
            validators.insert(tool, validator);
            descriptors.push(descriptor);
        }

        Ok(Self {
            descriptors,
            validators,
        })
    }

    /// All descriptors in registry order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn lookup(&self, name: &str) -> Result<ToolName, McpError> {
        ToolName::from_name(name).ok_or_else(|| McpError::UnknownTool(name.to_string()))
    }

    /// Checks `arguments` against the tool's declared input schema.
    pub fn validate(&self, tool: ToolName, arguments: &Value) -> Result<(), McpError> {
        let Some(validator) = self.validators.get(&tool) else {
            return Err(McpError::UnknownTool(tool.as_str().to_string()));
        };

        validator.validate(arguments).map_err(|errors| McpError::Validation {
            tool: tool.as_str().to_string(),
            errors: errors.map(|e| describe(&e)).collect(),
        })
    }
}

fn describe(error: &jsonschema::ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    if path.is_empty() {
        error.to_string()
    } else {
        format!("{path}: {error}")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("input schema for {tool} does not compile: {reason}")]
pub struct RegistryError {
    pub tool: &'static str,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        ToolRegistry::new().expect("schemas compile")
    }

    fn validation_errors(tool: ToolName, args: Value) -> Vec<String> {
        match registry().validate(tool, &args) {
            Err(McpError::Validation { errors, .. }) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_names_are_unique_and_resolvable() {
        let registry = registry();
        let names: Vec<&str> = registry.list().iter().map(|d| d.name).collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());

        for name in names {
            assert_eq!(registry.lookup(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_list_order_is_stable() {
        let first = serde_json::to_string(registry().list()).unwrap();
        let second = serde_json::to_string(registry().list()).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry().list()[0].name, "search_music");
    }

    #[test]
    fn test_unknown_tool() {
        assert!(matches!(
            registry().lookup("spotify_dance"),
            Err(McpError::UnknownTool(name)) if name == "spotify_dance"
        ));
    }

    #[test]
    fn test_valid_search_arguments() {
        let args = json!({ "query": "jazz", "type": "track", "limit": 5 });
        assert!(registry().validate(ToolName::SearchMusic, &args).is_ok());
    }

    #[test]
    fn test_missing_required_key() {
        let errors = validation_errors(ToolName::SearchMusic, json!({ "type": "track" }));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("query"));
    }

    #[test]
    fn test_enum_membership() {
        let errors = validation_errors(ToolName::ControlPlayback, json!({ "action": "rewind" }));
        assert!(errors[0].contains("rewind"));
    }

    #[test]
    fn test_numeric_bounds() {
        validation_errors(ToolName::SetVolume, json!({ "volume": 101 }));
        validation_errors(ToolName::SearchMusic, json!({ "query": "x", "limit": 0 }));
        assert!(registry()
            .validate(ToolName::SetVolume, &json!({ "volume": 0 }))
            .is_ok());
    }

    #[test]
    fn test_wrong_types() {
        validation_errors(ToolName::SetVolume, json!({ "volume": "loud" }));
        validation_errors(ToolName::AddToPlaylist, json!({ "playlist_id": "p", "track_uris": [1, 2] }));
        validation_errors(ToolName::GetDevices, json!("not an object"));
    }

    #[test]
    fn test_playlist_id_must_be_base62() {
        let errors = validation_errors(
            ToolName::AddToPlaylist,
            json!({ "playlist_id": "../me/player/next?x=", "track_uris": ["spotify:track:1"] }),
        );
        assert!(errors[0].starts_with("/playlist_id"));
        assert!(registry()
            .validate(
                ToolName::AddToPlaylist,
                &json!({ "playlist_id": "37i9dQZF1DXcBWIGoYBM5M", "track_uris": ["spotify:track:1"] })
            )
            .is_ok());
    }

    #[test]
    fn test_empty_track_list_rejected() {
        validation_errors(ToolName::AddToPlaylist, json!({ "playlist_id": "p", "track_uris": [] }));
    }
}
