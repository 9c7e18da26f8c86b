//! In-memory entity maps
//!
//! One map per entity kind, keyed by snowflake. Guild-scoped kinds (roles,
//! channels, members, voice states) live inside their [`Guild`]; a channel
//! index resolves a channel ID to its guild without scanning.
//!
//! Lookups return `Option`; nothing here fails or validates. Putting a
//! guild-scoped entity whose guild is not stored is a no-op.

use std::collections::{HashMap, VecDeque};

use chat_core::{Emoji, Guild, GuildChannel, Member, Message, Role, Snowflake, User, VoiceState};

/// The cached object graph
#[derive(Debug, Default)]
pub struct EntityStore {
    guilds: HashMap<Snowflake, Guild>,
    users: HashMap<Snowflake, User>,
    emojis: HashMap<Snowflake, Emoji>,
    channel_guild: HashMap<Snowflake, Snowflake>,
    messages: VecDeque<Message>,
    max_messages: usize,
    current_user: Option<User>,
}

impl EntityStore {
    /// Create an empty store keeping at most `max_messages` messages
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            messages: VecDeque::with_capacity(max_messages.min(1024)),
            ..Self::default()
        }
    }

    // =========================================================================
    // Guilds
    // =========================================================================

    pub fn guild(&self, id: Snowflake) -> Option<&Guild> {
        self.guilds.get(&id)
    }

    pub fn guild_mut(&mut self, id: Snowflake) -> Option<&mut Guild> {
        self.guilds.get_mut(&id)
    }

    /// Store a guild, re-indexing its channels
    pub fn put_guild(&mut self, guild: Guild) -> Option<Guild> {
        let previous = self.guilds.remove(&guild.id);
        if let Some(old) = &previous {
            for channel_id in old.channels.keys() {
                self.channel_guild.remove(channel_id);
            }
        }
        for channel_id in guild.channels.keys() {
            self.channel_guild.insert(*channel_id, guild.id);
        }
        self.guilds.insert(guild.id, guild);
        previous
    }

    /// Remove a guild together with its channel index entries, emojis and messages
    pub fn remove_guild(&mut self, id: Snowflake) -> Option<Guild> {
        let guild = self.guilds.remove(&id)?;
        for channel_id in guild.channels.keys() {
            self.channel_guild.remove(channel_id);
        }
        self.emojis.retain(|_, emoji| emoji.guild_id != id);
        self.messages.retain(|m| m.guild_id != Some(id));
        Some(guild)
    }

    pub fn guilds(&self) -> impl Iterator<Item = &Guild> {
        self.guilds.values()
    }

    pub fn guild_ids(&self) -> Vec<Snowflake> {
        self.guilds.keys().copied().collect()
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    // =========================================================================
    // Channels
    // =========================================================================

    pub fn channel(&self, id: Snowflake) -> Option<&GuildChannel> {
        let guild_id = self.channel_guild.get(&id)?;
        self.guilds.get(guild_id)?.channels.get(&id)
    }

    /// Guild owning a cached channel
    pub fn channel_guild_id(&self, channel_id: Snowflake) -> Option<Snowflake> {
        self.channel_guild.get(&channel_id).copied()
    }

    pub fn put_channel(&mut self, channel: GuildChannel) -> Option<GuildChannel> {
        let guild_id = channel.guild_id();
        let guild = self.guilds.get_mut(&guild_id)?;
        self.channel_guild.insert(channel.id(), guild_id);
        guild.channels.insert(channel.id(), channel)
    }

    pub fn remove_channel(&mut self, id: Snowflake) -> Option<GuildChannel> {
        let guild_id = self.channel_guild.remove(&id)?;
        self.guilds.get_mut(&guild_id)?.channels.remove(&id)
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<&Member> {
        self.guilds.get(&guild_id)?.members.get(&user_id)
    }

    pub fn member_mut(&mut self, guild_id: Snowflake, user_id: Snowflake) -> Option<&mut Member> {
        self.guilds.get_mut(&guild_id)?.members.get_mut(&user_id)
    }

    pub fn put_member(&mut self, member: Member) -> Option<Member> {
        self.guilds
            .get_mut(&member.guild_id)?
            .members
            .insert(member.user_id, member)
    }

    pub fn remove_member(&mut self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.guilds.get_mut(&guild_id)?.members.remove(&user_id)
    }

    /// Find a member by `name#discriminator`, nickname, or username
    ///
    /// A full tag is tried first; otherwise the first member whose nickname
    /// or username matches is returned.
    pub fn member_named(&self, guild_id: Snowflake, name: &str) -> Option<&Member> {
        let guild = self.guilds.get(&guild_id)?;
        let user_of = |m: &Member| self.users.get(&m.user_id);

        if name.len() > 5 && name.as_bytes()[name.len() - 5] == b'#' {
            let tagged = guild
                .members
                .values()
                .find(|m| user_of(m).is_some_and(|u| u.matches_tag(name)));
            if tagged.is_some() {
                return tagged;
            }
        }

        guild.members.values().find(|m| {
            m.nick.as_deref() == Some(name) || user_of(m).is_some_and(|u| u.username == name)
        })
    }

    // =========================================================================
    // Roles
    // =========================================================================

    pub fn role(&self, guild_id: Snowflake, role_id: Snowflake) -> Option<&Role> {
        self.guilds.get(&guild_id)?.roles.get(&role_id)
    }

    pub fn put_role(&mut self, role: Role) -> Option<Role> {
        self.guilds.get_mut(&role.guild_id)?.roles.insert(role.id, role)
    }

    pub fn remove_role(&mut self, guild_id: Snowflake, role_id: Snowflake) -> Option<Role> {
        self.guilds.get_mut(&guild_id)?.roles.remove(&role_id)
    }

    // =========================================================================
    // Voice states
    // =========================================================================

    pub fn voice_state(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<&VoiceState> {
        self.guilds.get(&guild_id)?.voice_state(user_id)
    }

    pub fn put_voice_state(&mut self, guild_id: Snowflake, state: VoiceState) -> Option<VoiceState> {
        self.guilds.get_mut(&guild_id)?.insert_voice_state(state)
    }

    pub fn remove_voice_state(&mut self, guild_id: Snowflake, user_id: Snowflake) -> Option<VoiceState> {
        self.guilds.get_mut(&guild_id)?.remove_voice_state(user_id)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn user(&self, id: Snowflake) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn put_user(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id, user)
    }

    pub fn remove_user(&mut self, id: Snowflake) -> Option<User> {
        self.users.remove(&id)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn set_current_user(&mut self, user: User) -> Option<User> {
        self.current_user.replace(user)
    }

    // =========================================================================
    // Emojis
    // =========================================================================

    pub fn emoji(&self, id: Snowflake) -> Option<&Emoji> {
        self.emojis.get(&id)
    }

    pub fn put_emoji(&mut self, emoji: Emoji) -> Option<Emoji> {
        self.emojis.insert(emoji.id, emoji)
    }

    pub fn remove_emoji(&mut self, id: Snowflake) -> Option<Emoji> {
        self.emojis.remove(&id)
    }

    /// Emojis owned by a guild, in ID order
    pub fn guild_emojis(&self, guild_id: Snowflake) -> Vec<&Emoji> {
        let mut emojis: Vec<&Emoji> = self
            .emojis
            .values()
            .filter(|e| e.guild_id == guild_id)
            .collect();
        emojis.sort_by_key(|e| e.id);
        emojis
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub fn message(&self, id: Snowflake) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn message_mut(&mut self, id: Snowflake) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Append a message, evicting the oldest past capacity
    ///
    /// Returns `false` when the message cache is disabled.
    pub fn push_message(&mut self, message: Message) -> bool {
        if self.max_messages == 0 {
            return false;
        }
        while self.messages.len() >= self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
        true
    }

    pub fn remove_message(&mut self, id: Snowflake) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        self.messages.remove(index)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Drop everything except the configured capacity
    pub fn clear(&mut self) {
        let max_messages = self.max_messages;
        *self = Self::new(max_messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::events::ChannelPayload;

    const GUILD: Snowflake = Snowflake::new(1);

    fn text_channel(id: u64) -> GuildChannel {
        let payload: ChannelPayload =
            serde_json::from_str(&format!(r#"{{"id":"{id}","type":0,"name":"c{id}"}}"#)).unwrap();
        GuildChannel::from_payload(payload, GUILD).unwrap()
    }

    fn store_with_guild() -> EntityStore {
        let mut store = EntityStore::new(2);
        store.put_guild(Guild::new(GUILD, "Rust", Snowflake::new(9)));
        store
    }

    #[test]
    fn test_absence_is_none() {
        let store = EntityStore::new(0);
        assert!(store.guild(GUILD).is_none());
        assert!(store.channel(Snowflake::new(5)).is_none());
        assert!(store.member(GUILD, Snowflake::new(5)).is_none());
        assert!(store.role(GUILD, Snowflake::new(5)).is_none());
    }

    #[test]
    fn test_guild_scoped_put_without_guild_is_noop() {
        let mut store = EntityStore::new(0);
        assert!(store.put_member(Member::new(Snowflake::new(5), GUILD)).is_none());
        assert!(store.put_channel(text_channel(10)).is_none());
        assert!(store.channel(Snowflake::new(10)).is_none());
        assert!(store.channel_guild_id(Snowflake::new(10)).is_none());
    }

    #[test]
    fn test_channel_index() {
        let mut store = store_with_guild();
        store.put_channel(text_channel(10));
        assert_eq!(store.channel_guild_id(Snowflake::new(10)), Some(GUILD));
        assert_eq!(store.channel(Snowflake::new(10)).map(GuildChannel::name), Some("c10"));

        assert!(store.remove_channel(Snowflake::new(10)).is_some());
        assert!(store.channel_guild_id(Snowflake::new(10)).is_none());
        assert!(store.remove_channel(Snowflake::new(10)).is_none());
    }

    #[test]
    fn test_put_guild_reindexes_channels() {
        let mut store = store_with_guild();
        store.put_channel(text_channel(10));

        let mut replacement = Guild::new(GUILD, "Rust", Snowflake::new(9));
        let channel = text_channel(11);
        replacement.channels.insert(channel.id(), channel);
        assert!(store.put_guild(replacement).is_some());

        assert!(store.channel(Snowflake::new(10)).is_none());
        assert!(store.channel(Snowflake::new(11)).is_some());
    }

    #[test]
    fn test_remove_guild_cascades() {
        let mut store = store_with_guild();
        store.put_channel(text_channel(10));
        store.put_emoji(Emoji {
            id: Snowflake::new(50),
            guild_id: GUILD,
            name: "ferris".into(),
            roles: vec![],
            require_colons: true,
            managed: false,
            animated: false,
        });

        assert!(store.remove_guild(GUILD).is_some());
        assert!(store.channel_guild_id(Snowflake::new(10)).is_none());
        assert!(store.emoji(Snowflake::new(50)).is_none());
    }

    #[test]
    fn test_member_named() {
        let mut store = store_with_guild();
        for (id, name, nick) in [(5, "ferris", None), (6, "corro", Some("unsafe"))] {
            let user = User::new(Snowflake::new(id), name, "0001");
            let mut member = Member::new(user.id, GUILD);
            member.nick = nick.map(String::from);
            store.put_user(user);
            store.put_member(member);
        }

        let by_tag = store.member_named(GUILD, "ferris#0001").map(|m| m.user_id);
        assert_eq!(by_tag, Some(Snowflake::new(5)));
        let by_nick = store.member_named(GUILD, "unsafe").map(|m| m.user_id);
        assert_eq!(by_nick, Some(Snowflake::new(6)));
        let by_name = store.member_named(GUILD, "corro").map(|m| m.user_id);
        assert_eq!(by_name, Some(Snowflake::new(6)));
        assert!(store.member_named(GUILD, "ferris#9999").is_none());
    }

    #[test]
    fn test_message_capacity() {
        let mut store = EntityStore::new(2);
        for id in 1..=3 {
            store.push_message(Message {
                id: Snowflake::new(id),
                channel_id: Snowflake::new(10),
                guild_id: None,
                author_id: Snowflake::new(5),
                content: String::new(),
                timestamp: chrono::Utc::now(),
                edited_timestamp: None,
                tts: false,
                mention_everyone: false,
                pinned: false,
                embeds: vec![],
            });
        }
        let ids: Vec<u64> = store.messages().map(|m| m.id.into_inner()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(store.remove_message(Snowflake::new(2)).is_some());
        assert!(store.message(Snowflake::new(2)).is_none());

        let mut disabled = EntityStore::new(0);
        assert!(store.message(Snowflake::new(3)).is_some());
        assert!(!disabled.push_message(store.remove_message(Snowflake::new(3)).unwrap()));
    }
}
