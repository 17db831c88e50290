//! Core type definitions used across the Lanyard workspace.

pub mod id;
pub mod options;
pub mod presence;
pub mod response;

pub use id::Snowflake;
pub use options::Options;
pub use presence::{
    Activity, Assets, AvatarDecoration, DiscordStatus, DiscordUser, Emoji, Party, Presence,
    Spotify, Timestamps,
};
pub use response::{ApiErrorBody, ApiResponse, ErroredApiResponse};
