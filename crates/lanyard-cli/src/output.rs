//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use lanyard_core::types::Presence;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One presence as a table row
#[derive(Debug, Serialize, Tabled)]
pub struct PresenceRow {
    /// User ID
    #[tabled(rename = "User ID")]
    pub user_id: String,
    /// Display name
    #[tabled(rename = "Name")]
    pub name: String,
    /// Online status
    #[tabled(rename = "Status")]
    pub status: String,
    /// Main activity
    #[tabled(rename = "Activity")]
    pub activity: String,
    /// Spotify track
    #[tabled(rename = "Spotify")]
    pub spotify: String,
    /// Connected clients
    #[tabled(rename = "Clients")]
    pub clients: String,
}

impl From<&Presence> for PresenceRow {
    fn from(p: &Presence) -> Self {
        let activity = p
            .primary_activity()
            .map(|a| match &a.details {
                Some(details) => format!("{} ({details})", a.name),
                None => a.name.clone(),
            })
            .or_else(|| p.custom_status().and_then(|a| a.state.clone()))
            .unwrap_or_else(|| "-".to_string());

        let spotify = p
            .spotify
            .as_ref()
            .filter(|_| p.listening_to_spotify)
            .map(|s| match &s.artist {
                Some(artist) => format!("{} - {artist}", s.song),
                None => s.song.clone(),
            })
            .unwrap_or_else(|| "-".to_string());

        let clients: Vec<&str> = [
            (p.active_on_discord_desktop, "desktop"),
            (p.active_on_discord_web, "web"),
            (p.active_on_discord_mobile, "mobile"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();

        Self {
            user_id: p.user_id().to_string(),
            name: p.discord_user.name().to_string(),
            status: p.discord_status.to_string(),
            activity,
            spotify,
            clients: if clients.is_empty() {
                "-".to_string()
            } else {
                clients.join(", ")
            },
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print presences: a table of rows, or the full JSON payloads
pub fn print_presences<'a>(presences: impl IntoIterator<Item = &'a Presence>, format: OutputFormat) {
    let presences: Vec<&Presence> = presences.into_iter().collect();
    match format {
        OutputFormat::Table => {
            let rows: Vec<PresenceRow> = presences.iter().map(|p| PresenceRow::from(*p)).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&presences).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single item as JSON regardless of format
pub fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
    println!("{}", json);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_summarizes_presence() {
        let presence: Presence = serde_json::from_value(serde_json::json!({
            "discord_user": {"id": "1", "username": "phin", "global_name": "Phineas"},
            "discord_status": "online",
            "listening_to_spotify": true,
            "spotify": {"song": "Song", "artist": "Artist", "timestamps": {}},
            "activities": [
                {"type": 4, "name": "Custom Status", "state": "busy"},
                {"type": 0, "name": "Rust", "details": "editing"}
            ],
            "active_on_discord_desktop": true,
            "active_on_discord_mobile": true
        }))
        .unwrap();

        let row = PresenceRow::from(&presence);
        assert_eq!(row.name, "Phineas");
        assert_eq!(row.status, "online");
        assert_eq!(row.activity, "Rust (editing)");
        assert_eq!(row.spotify, "Song - Artist");
        assert_eq!(row.clients, "desktop, mobile");
    }

    #[test]
    fn test_row_falls_back_to_custom_status() {
        let presence: Presence = serde_json::from_value(serde_json::json!({
            "discord_user": {"id": "2", "username": "solo"},
            "activities": [{"type": 4, "name": "Custom Status", "state": "away"}]
        }))
        .unwrap();

        let row = PresenceRow::from(&presence);
        assert_eq!(row.activity, "away");
        assert_eq!(row.spotify, "-");
        assert_eq!(row.clients, "-");
        assert_eq!(row.status, "offline");
    }
}
