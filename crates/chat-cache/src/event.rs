//! Change notifications
//!
//! Every successful merge yields one [`CacheEvent`]. Update variants carry a
//! snapshot taken before the merge and one taken after it; the snapshots are
//! owned copies and do not change when the cache moves on.

use std::sync::Arc;

use chat_core::{Emoji, Guild, GuildChannel, Member, Message, Role, Snowflake, User, VoiceState};

/// Observable result of merging one dispatch event
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    Ready {
        user: User,
        guilds: Vec<Snowflake>,
    },
    Resumed,

    /// A guild the client was not in
    GuildJoin(Arc<Guild>),
    /// A guild that was known only as unavailable
    GuildAvailable(Arc<Guild>),
    GuildUpdate {
        before: Arc<Guild>,
        after: Arc<Guild>,
    },
    /// Outage; the guild stays cached with its unavailable flag set
    GuildUnavailable(Snowflake),
    /// The client left or was removed
    GuildRemove(Arc<Guild>),
    EmojisUpdate {
        guild_id: Snowflake,
        before: Vec<Emoji>,
        after: Vec<Emoji>,
    },

    ChannelCreate(GuildChannel),
    ChannelUpdate {
        before: GuildChannel,
        after: GuildChannel,
    },
    ChannelDelete(GuildChannel),

    MemberJoin(Member),
    MemberUpdate {
        before: Member,
        after: Member,
    },
    MemberRemove(Member),
    MembersChunk {
        guild_id: Snowflake,
        count: usize,
    },
    PresenceUpdate {
        before: Member,
        after: Member,
    },

    RoleCreate(Role),
    RoleUpdate {
        before: Role,
        after: Role,
    },
    RoleDelete(Role),

    VoiceStateUpdate {
        member: Option<Member>,
        before: VoiceState,
        after: VoiceState,
    },

    MessageCreate(Message),
    MessageEdit {
        before: Message,
        after: Message,
    },
    MessageDelete(Message),

    UserUpdate {
        before: User,
        after: User,
    },
}

impl CacheEvent {
    /// Handler-style name, used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::Resumed => "resumed",
            Self::GuildJoin(_) => "guild_join",
            Self::GuildAvailable(_) => "guild_available",
            Self::GuildUpdate { .. } => "guild_update",
            Self::GuildUnavailable(_) => "guild_unavailable",
            Self::GuildRemove(_) => "guild_remove",
            Self::EmojisUpdate { .. } => "guild_emojis_update",
            Self::ChannelCreate(_) => "channel_create",
            Self::ChannelUpdate { .. } => "channel_update",
            Self::ChannelDelete(_) => "channel_delete",
            Self::MemberJoin(_) => "member_join",
            Self::MemberUpdate { .. } => "member_update",
            Self::MemberRemove(_) => "member_remove",
            Self::MembersChunk { .. } => "members_chunk",
            Self::PresenceUpdate { .. } => "presence_update",
            Self::RoleCreate(_) => "role_create",
            Self::RoleUpdate { .. } => "role_update",
            Self::RoleDelete(_) => "role_delete",
            Self::VoiceStateUpdate { .. } => "voice_state_update",
            Self::MessageCreate(_) => "message",
            Self::MessageEdit { .. } => "message_edit",
            Self::MessageDelete(_) => "message_delete",
            Self::UserUpdate { .. } => "user_update",
        }
    }

    /// Guild the change belongs to, if any
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::Ready { .. } | Self::Resumed | Self::UserUpdate { .. } => None,
            Self::GuildJoin(g) | Self::GuildAvailable(g) | Self::GuildRemove(g) => Some(g.id),
            Self::GuildUpdate { after, .. } => Some(after.id),
            Self::GuildUnavailable(id) => Some(*id),
            Self::EmojisUpdate { guild_id, .. } | Self::MembersChunk { guild_id, .. } => {
                Some(*guild_id)
            }
            Self::ChannelCreate(c) | Self::ChannelDelete(c) => Some(c.guild_id()),
            Self::ChannelUpdate { after, .. } => Some(after.guild_id()),
            Self::MemberJoin(m) | Self::MemberRemove(m) => Some(m.guild_id),
            Self::MemberUpdate { after, .. } | Self::PresenceUpdate { after, .. } => {
                Some(after.guild_id)
            }
            Self::RoleCreate(r) | Self::RoleDelete(r) => Some(r.guild_id),
            Self::RoleUpdate { after, .. } => Some(after.guild_id),
            Self::VoiceStateUpdate { after, .. } => after.guild_id,
            Self::MessageCreate(m) | Self::MessageDelete(m) => m.guild_id,
            Self::MessageEdit { after, .. } => after.guild_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_guild() {
        let role = Role::new(Snowflake::new(2), Snowflake::new(1), "Mod", 1);
        let event = CacheEvent::RoleCreate(role);
        assert_eq!(event.kind(), "role_create");
        assert_eq!(event.guild_id(), Some(Snowflake::new(1)));

        assert_eq!(CacheEvent::Resumed.guild_id(), None);
        assert_eq!(
            CacheEvent::GuildUnavailable(Snowflake::new(7)).guild_id(),
            Some(Snowflake::new(7))
        );
    }
}
