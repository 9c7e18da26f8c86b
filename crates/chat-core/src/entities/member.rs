//! Guild member entity and presence types
//!
//! A member is guild-scoped metadata for a user. The user itself lives in
//! the store's user map and is referenced here only by ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::events::MemberPayload;
use crate::value_objects::Snowflake;

/// Online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
    Invisible,
}

impl Status {
    /// Get the wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Offline => "offline",
            Self::Invisible => "invisible",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a member is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ActivityKind {
    #[default]
    Playing = 0,
    Streaming = 1,
    Listening = 2,
    Watching = 3,
    Custom = 4,
}

impl TryFrom<u8> for ActivityKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Playing),
            1 => Ok(Self::Streaming),
            2 => Ok(Self::Listening),
            3 => Ok(Self::Watching),
            4 => Ok(Self::Custom),
            other => Err(format!("unknown activity type: {other}")),
        }
    }
}

impl From<ActivityKind> for u8 {
    fn from(kind: ActivityKind) -> Self {
        kind as u8
    }
}

/// Member activity ("game" on older gateway versions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Activity {
    /// A "Playing ..." activity
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActivityKind::Playing,
            url: None,
        }
    }

    /// A "Streaming ..." activity with a stream URL
    pub fn streaming(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ActivityKind::Streaming,
            url: Some(url.into()),
        }
    }
}

/// Guild member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: Snowflake,
    pub guild_id: Snowflake,
    pub nick: Option<String>,
    /// Role IDs, excluding the default role
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
    pub deaf: bool,
    pub mute: bool,
    pub status: Status,
    pub activity: Option<Activity>,
}

impl Member {
    /// Create an offline member with no roles
    pub fn new(user_id: Snowflake, guild_id: Snowflake) -> Self {
        Self {
            user_id,
            guild_id,
            nick: None,
            roles: Vec::new(),
            joined_at: None,
            deaf: false,
            mute: false,
            status: Status::Offline,
            activity: None,
        }
    }

    /// Build from a wire object; the caller stores the embedded user separately
    pub fn from_payload(payload: MemberPayload, guild_id: Snowflake) -> (Self, User) {
        let member = Self {
            user_id: payload.user.id,
            guild_id,
            nick: payload.nick,
            roles: payload.roles,
            joined_at: payload.joined_at,
            deaf: payload.deaf,
            mute: payload.mute,
            status: Status::Offline,
            activity: None,
        };
        (member, payload.user)
    }

    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }

    /// Nickname if set, otherwise the username
    pub fn display_name<'a>(&'a self, user: &'a User) -> &'a str {
        self.nick.as_deref().unwrap_or(&user.username)
    }

    /// Mention string, using the nickname form when a nickname is set
    pub fn mention(&self) -> String {
        if self.nick.is_some() {
            format!("<@!{}>", self.user_id)
        } else {
            format!("<@{}>", self.user_id)
        }
    }
}
