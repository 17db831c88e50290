//! Presence model as sent by the Lanyard API and socket.
//!
//! A [`Presence`] is an immutable snapshot: it is replaced wholesale on every
//! update and never patched field by field. Optional and defaulted fields
//! keep partially populated payloads parseable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::id::Snowflake;

/// Activity type Discord uses for a custom status line.
const CUSTOM_STATUS_ACTIVITY: u8 = 4;

/// A user's live presence snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    /// Spotify listening data, when the user is listening.
    #[serde(default)]
    pub spotify: Option<Spotify>,
    /// User-defined key/value store attached to the presence.
    #[serde(default)]
    pub kv: HashMap<String, String>,
    /// Whether the user is currently listening to Spotify.
    #[serde(default)]
    pub listening_to_spotify: bool,
    /// The Discord account this presence belongs to.
    pub discord_user: DiscordUser,
    /// Online status.
    #[serde(default)]
    pub discord_status: DiscordStatus,
    /// Current activities, in the order Discord reports them.
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Connected from a web client.
    #[serde(default)]
    pub active_on_discord_web: bool,
    /// Connected from a mobile client.
    #[serde(default)]
    pub active_on_discord_mobile: bool,
    /// Connected from a desktop client.
    #[serde(default)]
    pub active_on_discord_desktop: bool,
}

impl Presence {
    /// The identifier of the user this presence describes.
    pub fn user_id(&self) -> &Snowflake {
        &self.discord_user.id
    }

    /// Whether the user is anything other than offline.
    pub fn is_online(&self) -> bool {
        self.discord_status != DiscordStatus::Offline
    }

    /// First activity that is not a custom status line.
    pub fn primary_activity(&self) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|a| a.kind != CUSTOM_STATUS_ACTIVITY)
    }

    /// The custom status activity, if one is set.
    pub fn custom_status(&self) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|a| a.kind == CUSTOM_STATUS_ACTIVITY)
    }
}

/// Discord online status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscordStatus {
    /// Online.
    Online,
    /// Idle / away.
    Idle,
    /// Do not disturb.
    Dnd,
    /// Offline or invisible.
    #[default]
    Offline,
}

impl DiscordStatus {
    /// Converts to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for DiscordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spotify listening data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spotify {
    /// Spotify track identifier.
    #[serde(default)]
    pub track_id: Option<String>,
    /// Playback start/end in unix milliseconds.
    #[serde(default)]
    pub timestamps: Timestamps,
    /// Song title.
    pub song: String,
    /// Artist names, `;`-separated.
    #[serde(default)]
    pub artist: Option<String>,
    /// Album art URL.
    #[serde(default)]
    pub album_art_url: Option<String>,
    /// Album title.
    #[serde(default)]
    pub album: Option<String>,
}

impl Spotify {
    /// Public `open.spotify.com` link for the current track.
    pub fn track_url(&self) -> Option<String> {
        self.track_id
            .as_deref()
            .map(|id| format!("https://open.spotify.com/track/{id}"))
    }
}

/// Start/end timestamps in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamps {
    /// Start time.
    #[serde(default)]
    pub start: Option<i64>,
    /// End time.
    #[serde(default)]
    pub end: Option<i64>,
}

/// The Discord account behind a presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordUser {
    /// User identifier.
    pub id: Snowflake,
    /// Unique username.
    pub username: String,
    /// Public profile flags bitfield.
    #[serde(default)]
    pub public_flags: u64,
    /// Display name shown in clients.
    #[serde(default)]
    pub global_name: Option<String>,
    /// Legacy display name; superseded by `global_name`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Legacy four-digit discriminator (`"0"` for migrated accounts).
    #[serde(default)]
    pub discriminator: String,
    /// Whether the account is a bot.
    #[serde(default)]
    pub bot: bool,
    /// Avatar decoration, if any.
    #[serde(default)]
    pub avatar_decoration_data: Option<AvatarDecoration>,
    /// Avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl DiscordUser {
    /// Name to show a human: global name, then legacy display name, then username.
    pub fn name(&self) -> &str {
        self.global_name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or(&self.username)
    }
}

/// Avatar decoration asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarDecoration {
    /// Asset hash.
    pub asset: String,
    /// Store SKU; sent as a string or a number depending on API version.
    pub sku_id: serde_json::Value,
}

/// A single Discord activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity type (0 playing, 1 streaming, 2 listening, 3 watching, 4 custom, 5 competing).
    #[serde(rename = "type")]
    pub kind: u8,
    /// Activity state line.
    #[serde(default)]
    pub state: Option<String>,
    /// Activity name.
    pub name: String,
    /// Activity identifier.
    #[serde(default)]
    pub id: String,
    /// Emoji for custom statuses.
    #[serde(default)]
    pub emoji: Option<Emoji>,
    /// Creation time in unix milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Start/end timestamps.
    #[serde(default)]
    pub timestamps: Option<Timestamps>,
    /// Sync identifier (e.g. Spotify track).
    #[serde(default)]
    pub sync_id: Option<String>,
    /// Session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Party information.
    #[serde(default)]
    pub party: Option<Party>,
    /// Activity flags bitfield.
    #[serde(default)]
    pub flags: Option<u64>,
    /// Details line.
    #[serde(default)]
    pub details: Option<String>,
    /// Rich presence assets.
    #[serde(default)]
    pub assets: Option<Assets>,
    /// Owning application.
    #[serde(default)]
    pub application_id: Option<Snowflake>,
}

/// Emoji attached to a custom status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emoji {
    /// Emoji name or unicode character.
    pub name: String,
    /// Custom emoji identifier.
    #[serde(default)]
    pub id: Option<Snowflake>,
    /// Whether the custom emoji is animated.
    #[serde(default)]
    pub animated: bool,
}

/// Party information for multiplayer activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Current and maximum size.
    #[serde(default)]
    pub size: Option<[u32; 2]>,
    /// Party identifier.
    #[serde(default)]
    pub id: Option<String>,
}

/// Rich presence image assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    /// Small image hover text.
    #[serde(default)]
    pub small_text: Option<String>,
    /// Small image key.
    #[serde(default)]
    pub small_image: Option<String>,
    /// Large image hover text.
    #[serde(default)]
    pub large_text: Option<String>,
    /// Large image key.
    #[serde(default)]
    pub large_image: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal online presence for tests.
    pub fn presence(id: &str, status: DiscordStatus) -> Presence {
        Presence {
            spotify: None,
            kv: HashMap::new(),
            listening_to_spotify: false,
            discord_user: DiscordUser {
                id: Snowflake::parse(id).unwrap(),
                username: format!("user{id}"),
                public_flags: 0,
                global_name: None,
                display_name: None,
                discriminator: "0".to_string(),
                bot: false,
                avatar_decoration_data: None,
                avatar: None,
            },
            discord_status: status,
            activities: Vec::new(),
            active_on_discord_web: false,
            active_on_discord_mobile: false,
            active_on_discord_desktop: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_api_payload() {
        let json = serde_json::json!({
            "spotify": null,
            "kv": {"location": "Earth"},
            "listening_to_spotify": false,
            "discord_user": {
                "id": "94490510688792576",
                "username": "phineas",
                "global_name": "Phineas",
                "discriminator": "0",
                "avatar": "a_123",
                "bot": false,
                "public_flags": 131584
            },
            "discord_status": "dnd",
            "activities": [
                {"type": 4, "name": "Custom Status", "id": "custom", "state": "coding",
                 "created_at": 1700000000000i64, "emoji": {"name": "🦀"}},
                {"type": 0, "name": "Visual Studio Code", "id": "abc",
                 "created_at": 1700000000001i64, "timestamps": {"start": 1699999999000i64},
                 "assets": {"large_image": "mp:icon"}}
            ],
            "active_on_discord_web": false,
            "active_on_discord_mobile": true,
            "active_on_discord_desktop": true
        });

        let presence: Presence = serde_json::from_value(json).expect("should parse");
        assert_eq!(presence.user_id().as_str(), "94490510688792576");
        assert_eq!(presence.discord_status, DiscordStatus::Dnd);
        assert!(presence.is_online());
        assert_eq!(presence.discord_user.name(), "Phineas");
        assert_eq!(presence.kv.get("location").map(String::as_str), Some("Earth"));
        assert_eq!(presence.primary_activity().map(|a| a.name.as_str()), Some("Visual Studio Code"));
        assert_eq!(presence.custom_status().and_then(|a| a.state.as_deref()), Some("coding"));
        let ts = presence.activities[1].timestamps.expect("timestamps");
        assert_eq!(ts.start, Some(1699999999000));
        assert_eq!(ts.end, None);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = serde_json::json!({
            "discord_user": {"id": "1", "username": "min"}
        });
        let presence: Presence = serde_json::from_value(json).expect("should parse");
        assert_eq!(presence.discord_status, DiscordStatus::Offline);
        assert!(presence.activities.is_empty());
        assert!(!presence.is_online());
        assert_eq!(presence.discord_user.name(), "min");
    }

    #[test]
    fn test_spotify_track_url() {
        let spotify = Spotify {
            track_id: Some("4cOdK2wGLETKBW3PvgPWqT".to_string()),
            timestamps: Timestamps::default(),
            song: "Song".to_string(),
            artist: None,
            album_art_url: None,
            album: None,
        };
        assert_eq!(
            spotify.track_url().as_deref(),
            Some("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT")
        );
    }
}
