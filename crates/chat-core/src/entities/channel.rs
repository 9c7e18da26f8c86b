//! Guild channel entities
//!
//! Guild channels form a closed set of variants dispatched on [`ChannelKind`].
//! Direct-message channels have no guild and are not modelled here.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::entities::{Guild, PermissionOverwrite};
use crate::events::ChannelPayload;
use crate::value_objects::{Permissions, Snowflake};

/// Wire channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ChannelKind {
    Text = 0,
    Dm = 1,
    Voice = 2,
    GroupDm = 3,
    Category = 4,
    News = 5,
    Store = 6,
}

impl ChannelKind {
    /// Get the numeric value
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Name used in logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Dm => "dm",
            Self::Voice => "voice",
            Self::GroupDm => "group_dm",
            Self::Category => "category",
            Self::News => "news",
            Self::Store => "store",
        }
    }
}

impl TryFrom<u8> for ChannelKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Text),
            1 => Ok(Self::Dm),
            2 => Ok(Self::Voice),
            3 => Ok(Self::GroupDm),
            4 => Ok(Self::Category),
            5 => Ok(Self::News),
            6 => Ok(Self::Store),
            other => Err(format!("unknown channel type: {other}")),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(kind: ChannelKind) -> Self {
        kind.as_u8()
    }
}

/// Guild text channel (news channels are folded in)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub parent_id: Option<Snowflake>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub news: bool,
    pub last_message_id: Option<Snowflake>,
    pub slowmode_delay: u32,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

/// Guild voice channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub parent_id: Option<Snowflake>,
    pub bitrate: u32,
    pub user_limit: u32,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

/// Guild category grouping other channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub nsfw: bool,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

/// A channel that belongs to a guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildChannel {
    Text(TextChannel),
    Voice(VoiceChannel),
    Category(CategoryChannel),
}

impl GuildChannel {
    /// Build from a wire object
    ///
    /// Returns `None` for channel kinds that do not live in a guild (DMs)
    /// or that this model does not represent.
    pub fn from_payload(payload: ChannelPayload, guild_id: Snowflake) -> Option<Self> {
        let name = payload.name.unwrap_or_default();
        let position = payload.position.unwrap_or_default();
        let permission_overwrites = payload.permission_overwrites;
        let channel = match payload.kind {
            ChannelKind::Text | ChannelKind::News => Self::Text(TextChannel {
                id: payload.id,
                guild_id,
                name,
                position,
                parent_id: payload.parent_id,
                topic: payload.topic,
                nsfw: payload.nsfw,
                news: payload.kind == ChannelKind::News,
                last_message_id: payload.last_message_id,
                slowmode_delay: payload.rate_limit_per_user.unwrap_or_default(),
                permission_overwrites,
            }),
            ChannelKind::Voice => Self::Voice(VoiceChannel {
                id: payload.id,
                guild_id,
                name,
                position,
                parent_id: payload.parent_id,
                bitrate: payload.bitrate.unwrap_or(64_000),
                user_limit: payload.user_limit.unwrap_or_default(),
                permission_overwrites,
            }),
            ChannelKind::Category => Self::Category(CategoryChannel {
                id: payload.id,
                guild_id,
                name,
                position,
                nsfw: payload.nsfw,
                permission_overwrites,
            }),
            ChannelKind::Dm | ChannelKind::GroupDm | ChannelKind::Store => return None,
        };
        Some(channel)
    }

    #[inline]
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Text(c) => c.id,
            Self::Voice(c) => c.id,
            Self::Category(c) => c.id,
        }
    }

    #[inline]
    pub fn guild_id(&self) -> Snowflake {
        match self {
            Self::Text(c) => c.guild_id,
            Self::Voice(c) => c.guild_id,
            Self::Category(c) => c.guild_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text(c) => &c.name,
            Self::Voice(c) => &c.name,
            Self::Category(c) => &c.name,
        }
    }

    #[inline]
    pub fn position(&self) -> i32 {
        match self {
            Self::Text(c) => c.position,
            Self::Voice(c) => c.position,
            Self::Category(c) => c.position,
        }
    }

    /// Parent category; categories themselves never have one
    #[inline]
    pub fn parent_id(&self) -> Option<Snowflake> {
        match self {
            Self::Text(c) => c.parent_id,
            Self::Voice(c) => c.parent_id,
            Self::Category(_) => None,
        }
    }

    pub fn permission_overwrites(&self) -> &[PermissionOverwrite] {
        match self {
            Self::Text(c) => &c.permission_overwrites,
            Self::Voice(c) => &c.permission_overwrites,
            Self::Category(c) => &c.permission_overwrites,
        }
    }

    /// Overwrite targeting a role or member, if any
    pub fn overwrite_for(&self, id: Snowflake) -> Option<&PermissionOverwrite> {
        self.permission_overwrites().iter().find(|o| o.id == id)
    }

    /// Effective permissions of a user inside this channel
    ///
    /// Starts from the guild-level permissions (owner and administrator get
    /// everything), then applies the `@everyone` overwrite, the union of the
    /// member's role overwrites, and finally the member's own overwrite.
    /// Without `SEND_MESSAGES` the message extras are dropped; without
    /// `VIEW_CHANNEL` nothing channel-scoped remains.
    pub fn permissions_for(&self, guild: &Guild, user_id: Snowflake) -> Permissions {
        let mut perms = guild.member_permissions(user_id);
        if perms.contains(Permissions::ADMINISTRATOR) {
            return Permissions::all();
        }

        let overwrites = self.permission_overwrites();
        if let Some(everyone) = overwrites.iter().find(|o| o.is_role() && o.id == guild.id) {
            perms = perms.with_overwrite(everyone.allow, everyone.deny);
        }

        let roles = guild.member(user_id).map(|m| m.roles.as_slice()).unwrap_or_default();
        let (allow, deny) = overwrites
            .iter()
            .filter(|o| o.is_role() && o.id != guild.id && roles.contains(&o.id))
            .fold((Permissions::empty(), Permissions::empty()), |(allow, deny), o| {
                (allow | o.allow, deny | o.deny)
            });
        perms = perms.with_overwrite(allow, deny);

        if let Some(own) = overwrites.iter().find(|o| o.is_member() && o.id == user_id) {
            perms = perms.with_overwrite(own.allow, own.deny);
        }

        if !perms.contains(Permissions::SEND_MESSAGES) {
            perms -= Permissions::SEND_TTS_MESSAGES
                | Permissions::MENTION_EVERYONE
                | Permissions::EMBED_LINKS
                | Permissions::ATTACH_FILES;
        }
        if !perms.contains(Permissions::VIEW_CHANNEL) {
            perms -= Permissions::ALL_CHANNEL;
        }
        perms
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Text(c) if c.news => ChannelKind::News,
            Self::Text(_) => ChannelKind::Text,
            Self::Voice(_) => ChannelKind::Voice,
            Self::Category(_) => ChannelKind::Category,
        }
    }

    /// Mention string as rendered by clients
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id())
    }

    /// Display order: `(position, id)` ascending
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        (self.position(), self.id()).cmp(&(other.position(), other.id()))
    }

    pub fn as_text(&self) -> Option<&TextChannel> {
        match self {
            Self::Text(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_voice(&self) -> Option<&VoiceChannel> {
        match self {
            Self::Voice(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&CategoryChannel> {
        match self {
            Self::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextChannel> {
        match self {
            Self::Text(c) => Some(c),
            _ => None,
        }
    }
}
