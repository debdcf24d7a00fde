//! Response reshaping
//!
//! Spotify payloads are large and deeply nested. These helpers keep the
//! fields an agent can act on (names, artists, URIs, ids) and drop the rest.
//! Missing fields are tolerated everywhere: they come out as `null`.

use super::models::SearchType;
use serde_json::{json, Map, Value};

fn items(value: &Value) -> &[Value] {
    value
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Joins artist names, e.g. `"Miles Davis, John Coltrane"`.
pub fn artist_names(entity: &Value) -> String {
    entity
        .get("artists")
        .and_then(Value::as_array)
        .map(|artists| {
            artists
                .iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

pub fn track(track: &Value) -> Value {
    json!({
        "name": track["name"],
        "artists": artist_names(track),
        "album": track["album"]["name"],
        "duration_ms": track["duration_ms"],
        "popularity": track["popularity"],
        "uri": track["uri"],
        "id": track["id"],
    })
}

fn album(album: &Value) -> Value {
    json!({
        "name": album["name"],
        "artists": artist_names(album),
        "release_date": album["release_date"],
        "total_tracks": album["total_tracks"],
        "uri": album["uri"],
        "id": album["id"],
    })
}

fn artist(artist: &Value) -> Value {
    json!({
        "name": artist["name"],
        "followers": artist["followers"]["total"],
        "genres": artist["genres"],
        "uri": artist["uri"],
        "id": artist["id"],
    })
}

fn playlist(playlist: &Value) -> Value {
    json!({
        "name": playlist["name"],
        "owner": playlist["owner"]["display_name"],
        "tracks": playlist["tracks"]["total"],
        "public": playlist["public"],
        "uri": playlist["uri"],
        "id": playlist["id"],
    })
}

/// Flattens a search response into `{"<plural type>": [..]}`, keeping at most
/// `limit` entries. Spotify returns `null` placeholders for unavailable
/// playlists; those are skipped.
pub fn search_results(results: &Value, kind: SearchType, limit: usize) -> Value {
    let summarize: fn(&Value) -> Value = match kind {
        SearchType::Track => track,
        SearchType::Album => album,
        SearchType::Artist => artist,
        SearchType::Playlist => playlist,
    };

    let entries: Vec<Value> = items(&results[kind.plural()])
        .iter()
        .filter(|item| !item.is_null())
        .take(limit)
        .map(summarize)
        .collect();

    let mut out = Map::new();
    out.insert(kind.plural().to_string(), Value::Array(entries));
    Value::Object(out)
}

/// Current playback, or `None` when nothing is loaded in the player.
pub fn playback(state: &Value) -> Option<Value> {
    let item = state.get("item").filter(|i| !i.is_null())?;
    Some(json!({
        "is_playing": state["is_playing"],
        "track": track(item),
        "progress_ms": state["progress_ms"],
        "shuffle": state["shuffle_state"],
        "repeat": state["repeat_state"],
        "device": {
            "name": state["device"]["name"],
            "type": state["device"]["type"],
            "volume_percent": state["device"]["volume_percent"],
        },
    }))
}

pub fn devices(response: &Value) -> Value {
    let devices: Vec<Value> = response
        .get("devices")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|d| {
                    json!({
                        "id": d["id"],
                        "name": d["name"],
                        "type": d["type"],
                        "is_active": d["is_active"],
                        "volume_percent": d["volume_percent"],
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({ "devices": devices })
}

pub fn playlists(page: &Value) -> Value {
    let list: Vec<Value> = items(page)
        .iter()
        .filter(|p| !p.is_null())
        .map(playlist)
        .collect();
    json!({ "playlists": list, "total": page["total"] })
}

pub fn top_tracks(page: &Value) -> Value {
    let tracks: Vec<Value> = items(page).iter().map(track).collect();
    json!({ "tracks": tracks })
}

pub fn recently_played(page: &Value) -> Value {
    let tracks: Vec<Value> = items(page)
        .iter()
        .map(|entry| {
            let mut summary = track(&entry["track"]);
            summary["played_at"] = entry["played_at"].clone();
            summary
        })
        .collect();
    json!({ "tracks": tracks })
}

pub fn profile(user: &Value) -> Value {
    json!({
        "id": user["id"],
        "display_name": user["display_name"],
        "followers": user["followers"]["total"],
        "country": user["country"],
        "product": user["product"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track(name: &str) -> Value {
        json!({
            "name": name,
            "artists": [{ "name": "Miles Davis" }, { "name": "John Coltrane" }],
            "album": { "name": "Kind of Blue" },
            "duration_ms": 545000,
            "popularity": 80,
            "uri": format!("spotify:track:{name}"),
            "id": name,
            "available_markets": ["US", "SE"]
        })
    }

    #[test]
    fn test_search_results_are_truncated_and_trimmed() {
        let items: Vec<Value> = (0..8).map(|i| sample_track(&format!("t{i}"))).collect();
        let response = json!({ "tracks": { "items": items, "total": 1000 } });

        let summary = search_results(&response, SearchType::Track, 5);
        let tracks = summary["tracks"].as_array().unwrap();

        assert_eq!(tracks.len(), 5);
        assert_eq!(tracks[0]["artists"], "Miles Davis, John Coltrane");
        assert_eq!(tracks[0]["album"], "Kind of Blue");
        assert!(tracks[0].get("available_markets").is_none());
    }

    #[test]
    fn test_search_skips_null_playlists() {
        let response = json!({ "playlists": { "items": [
            null,
            { "name": "Jazz Vibes", "owner": { "display_name": "spotify" }, "tracks": { "total": 50 } }
        ] } });
        let summary = search_results(&response, SearchType::Playlist, 10);
        let playlists = summary["playlists"].as_array().unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0]["owner"], "spotify");
    }

    #[test]
    fn test_search_missing_section() {
        let summary = search_results(&json!({}), SearchType::Artist, 10);
        assert_eq!(summary, json!({ "artists": [] }));
    }

    #[test]
    fn test_playback_without_item() {
        assert!(playback(&json!({ "is_playing": false, "item": null })).is_none());

        let state = json!({ "is_playing": true, "item": sample_track("so-what"), "device": { "name": "Desk" } });
        let summary = playback(&state).unwrap();
        assert_eq!(summary["track"]["name"], "so-what");
        assert_eq!(summary["device"]["name"], "Desk");
    }

    #[test]
    fn test_recently_played_keeps_timestamp() {
        let page = json!({ "items": [{ "track": sample_track("blue"), "played_at": "2025-09-20T02:00:00.000Z" }] });
        let summary = recently_played(&page);
        assert_eq!(summary["tracks"][0]["played_at"], "2025-09-20T02:00:00.000Z");
        assert_eq!(summary["tracks"][0]["name"], "blue");
    }

    #[test]
    fn test_devices_keep_identity_and_volume() {
        let response = json!({ "devices": [
            { "id": "d1", "name": "Desk", "type": "Computer", "is_active": false, "volume_percent": 20, "is_restricted": false }
        ] });
        let summary = devices(&response);
        assert_eq!(summary["devices"][0]["id"], "d1");
        assert_eq!(summary["devices"][0]["volume_percent"], 20);
        assert!(summary["devices"][0].get("is_restricted").is_none());

        assert_eq!(devices(&json!({})), json!({ "devices": [] }));
    }

    #[test]
    fn test_playlists_page() {
        let page = json!({
            "items": [
                null,
                { "name": "Focus", "owner": { "display_name": "bob" }, "tracks": { "total": 12 }, "public": false, "id": "p2" }
            ],
            "total": 2
        });
        let summary = playlists(&page);
        assert_eq!(summary["total"], 2);
        assert_eq!(summary["playlists"].as_array().unwrap().len(), 1);
        assert_eq!(summary["playlists"][0]["owner"], "bob");
        assert_eq!(summary["playlists"][0]["tracks"], 12);
    }

    #[test]
    fn test_top_tracks_page() {
        let page = json!({ "items": [sample_track("a"), sample_track("b")] });
        let summary = top_tracks(&page);
        assert_eq!(summary["tracks"].as_array().unwrap().len(), 2);
        assert_eq!(summary["tracks"][1]["id"], "b");
        assert_eq!(summary["tracks"][0]["artists"], "Miles Davis, John Coltrane");
    }

    #[test]
    fn test_profile_drops_private_fields() {
        let user = json!({
            "id": "alice",
            "display_name": "Alice",
            "followers": { "href": null, "total": 3 },
            "country": "SE",
            "product": "premium",
            "email": "alice@example.com"
        });
        let summary = profile(&user);
        assert_eq!(summary["followers"], 3);
        assert_eq!(summary["country"], "SE");
        assert!(summary.get("email").is_none());
    }
}
