//! Shared test helpers for integration tests.

use serde_json::{Value, json};
use wiremock::MockServer;

use lanyard_core::config::api::ApiConfig;
use lanyard_core::types::{Options, Snowflake};

/// Options pointing at a mock Lanyard API over plain HTTP.
pub fn options_for(server: &MockServer) -> Options {
    Options::with_api(ApiConfig {
        hostname: server.address().to_string(),
        secure: false,
        request_timeout_seconds: 5,
    })
}

/// Parses a key, panicking on bad input.
pub fn key(id: &str) -> Snowflake {
    Snowflake::parse(id).expect("valid snowflake")
}

/// A successful presence envelope.
pub fn presence_body(id: &str, status: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "spotify": null,
            "kv": {},
            "listening_to_spotify": false,
            "discord_user": {"id": id, "username": format!("user{id}"), "discriminator": "0"},
            "discord_status": status,
            "activities": [],
            "active_on_discord_web": false,
            "active_on_discord_mobile": false,
            "active_on_discord_desktop": true
        }
    })
}

/// The envelope the API sends for unknown users.
pub fn not_found_body() -> Value {
    json!({
        "success": false,
        "error": {"message": "User not found", "code": "user_not_found"}
    })
}
