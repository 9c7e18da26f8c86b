//! Client command payloads
//!
//! Payload structures for client-to-server messages.

use chat_core::{Activity, Snowflake, Status};
use serde::{Deserialize, Serialize};

/// Payload for op 2 (Identify)
///
/// Starts a new session for one shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot token, without the `Bot ` prefix
    pub token: String,

    pub properties: IdentifyProperties,

    /// Payload compression is not supported by this client
    pub compress: bool,

    /// Guilds above this member count are sent without offline members
    pub large_threshold: u64,

    /// `[shard_id, shard_count]`
    pub shard: [u32; 2],

    /// Initial presence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceUpdatePayload>,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>, shard: [u32; 2], large_threshold: u64) -> Self {
        Self {
            token: token.into(),
            properties: IdentifyProperties::default(),
            compress: false,
            large_threshold,
            shard,
            presence: None,
        }
    }

    /// Set the initial presence
    #[must_use]
    pub fn with_presence(mut self, presence: PresenceUpdatePayload) -> Self {
        self.presence = Some(presence);
        self
    }
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    #[serde(rename = "$os")]
    pub os: String,

    /// Library name
    #[serde(rename = "$browser")]
    pub browser: String,

    /// Library name again; the gateway expects both
    #[serde(rename = "$device")]
    pub device: String,
}

impl IdentifyProperties {
    /// Library name reported to the gateway
    pub const LIBRARY: &'static str = env!("CARGO_PKG_NAME");

    /// Properties describing this process
    #[must_use]
    pub fn new() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: Self::LIBRARY.to_string(),
            device: Self::LIBRARY.to_string(),
        }
    }
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to resume a disconnected session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: u64,
}

/// Payload for op 3 (Presence Update)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    /// Unix time in milliseconds since the client went idle
    pub since: Option<u64>,
    pub game: Option<Activity>,
    pub status: Status,
    pub afk: bool,
}

impl PresenceUpdatePayload {
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            since: None,
            game: None,
            status,
            afk: false,
        }
    }

    #[must_use]
    pub fn with_game(mut self, game: Activity) -> Self {
        self.game = Some(game);
        self
    }

    /// Mark the client idle since the given time
    #[must_use]
    pub fn idle_since(mut self, since_ms: u64) -> Self {
        self.since = Some(since_ms);
        self.afk = true;
        self
    }
}

/// Payload for op 8 (Request Guild Members)
///
/// Answered with one or more `GUILD_MEMBERS_CHUNK` dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestGuildMembersPayload {
    pub guild_id: Vec<Snowflake>,
    /// Username prefix; empty requests everyone
    pub query: String,
    /// Maximum members returned; 0 means no limit
    pub limit: u32,
}

impl RequestGuildMembersPayload {
    /// Request every member of the given guilds
    #[must_use]
    pub fn all(guild_ids: Vec<Snowflake>) -> Self {
        Self {
            guild_id: guild_ids,
            query: String::new(),
            limit: 0,
        }
    }
}

/// Payload for op 4 (Voice State Update)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceStateCommand {
    pub guild_id: Snowflake,
    /// `None` leaves voice
    pub channel_id: Option<Snowflake>,
    pub self_mute: bool,
    pub self_deaf: bool,
}
