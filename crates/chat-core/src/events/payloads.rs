//! Event payload definitions
//!
//! Wire shapes of dispatch payloads. Full snapshots reuse the entity types
//! where the shapes agree; partial updates use [`Patch`] for nullable fields
//! and `Option` for fields that are never cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    Activity, ChannelKind, Embed, Emoji, PermissionOverwrite, Role, Status, User, UserRef,
    VerificationLevel, VoiceState,
};
use crate::value_objects::{Patch, Snowflake};

// === Connection Events ===

/// Hello payload, first frame on every connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// READY event payload
///
/// Sent after successful Identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ready {
    /// Gateway protocol version
    pub v: u8,

    /// Current user
    pub user: User,

    /// Guilds the user is in (initially unavailable)
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// `[shard_id, shard_count]` when identified with sharding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<[u32; 2]>,
}

/// Guild known only by ID (READY, outages, GUILD_DELETE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

// === Guild Events ===

/// Full guild snapshot (GUILD_CREATE)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildPayload {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub splash: Option<String>,
    pub owner_id: Snowflake,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub afk_channel_id: Option<Snowflake>,
    #[serde(default)]
    pub afk_timeout: u32,
    #[serde(default)]
    pub verification_level: VerificationLevel,
    #[serde(default)]
    pub mfa_level: u8,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default)]
    pub large: Option<bool>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
    #[serde(default)]
    pub members: Vec<MemberPayload>,
    #[serde(default)]
    pub voice_states: Vec<VoiceState>,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
}

/// Partial guild settings (GUILD_UPDATE)
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GuildUpdatePayload {
    pub id: Snowflake,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Patch<String>,
    #[serde(default)]
    pub splash: Patch<String>,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub afk_channel_id: Patch<Snowflake>,
    #[serde(default)]
    pub afk_timeout: Option<u32>,
    #[serde(default)]
    pub verification_level: Option<VerificationLevel>,
    #[serde(default)]
    pub mfa_level: Option<u8>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

/// GUILD_EMOJIS_UPDATE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEmojisUpdate {
    pub guild_id: Snowflake,
    pub emojis: Vec<Emoji>,
}

// === Channel Events ===

/// Channel object (CHANNEL_CREATE/UPDATE/DELETE)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub last_message_id: Option<Snowflake>,
    #[serde(default)]
    pub rate_limit_per_user: Option<u32>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub user_limit: Option<u32>,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

// === Member Events ===

/// Member object, embedded in guild snapshots and chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPayload {
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
}

/// GUILD_MEMBER_ADD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdd {
    pub guild_id: Snowflake,
    #[serde(flatten)]
    pub member: MemberPayload,
}

/// GUILD_MEMBER_UPDATE
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberUpdate {
    pub guild_id: Snowflake,
    pub user: User,
    #[serde(default)]
    pub nick: Patch<String>,
    #[serde(default)]
    pub roles: Option<Vec<Snowflake>>,
}

/// GUILD_MEMBER_REMOVE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRemove {
    pub guild_id: Snowflake,
    pub user: User,
}

/// GUILD_MEMBERS_CHUNK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersChunk {
    pub guild_id: Snowflake,
    pub members: Vec<MemberPayload>,
    #[serde(default)]
    pub presences: Vec<PresencePayload>,
}

// === Role Events ===

/// GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEvent {
    pub guild_id: Snowflake,
    pub role: Role,
}

/// GUILD_ROLE_DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDelete {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

// === Presence Events ===

/// PRESENCE_UPDATE, also embedded in guild snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresencePayload {
    pub user: UserRef,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, alias = "activity")]
    pub game: Option<Activity>,
}

// === Message Events ===

/// MESSAGE_CREATE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

/// MESSAGE_UPDATE, which may carry only the changed fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageUpdatePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub edited_timestamp: Patch<DateTime<Utc>>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub embeds: Option<Vec<Embed>>,
}

/// MESSAGE_DELETE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDelete {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}
