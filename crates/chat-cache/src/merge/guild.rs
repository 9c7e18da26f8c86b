//! Guild lifecycle: READY, GUILD_CREATE/UPDATE/DELETE, emojis, user updates

use std::sync::Arc;

use chat_core::events::{GuildEmojisUpdate, GuildPayload, GuildUpdatePayload, Ready, UnavailableGuild};
use chat_core::{GatewayEventType, Guild, GuildChannel, Member, User};
use tracing::{debug, info};

use super::{unknown_parent, MergeEngine};
use crate::event::CacheEvent;
use crate::store::EntityStore;

impl MergeEngine {
    /// Record the session user and a placeholder for every announced guild
    pub(super) fn ready(&self, store: &mut EntityStore, ready: Ready) -> CacheEvent {
        store.set_current_user(ready.user.clone());
        store.put_user(ready.user.clone());

        let mut guilds = Vec::with_capacity(ready.guilds.len());
        for entry in ready.guilds {
            if store.guild(entry.id).is_none() {
                store.put_guild(Guild::unavailable(entry.id));
            }
            guilds.push(entry.id);
        }
        info!(user = %ready.user, guilds = guilds.len(), "session ready");

        CacheEvent::Ready {
            user: ready.user,
            guilds,
        }
    }

    /// Build a guild from a full snapshot, replacing whatever was cached
    pub(super) fn guild_create(&self, store: &mut EntityStore, payload: GuildPayload) -> CacheEvent {
        let guild_id = payload.id;

        if payload.unavailable {
            match store.guild_mut(guild_id) {
                Some(guild) => guild.unavailable = true,
                None => {
                    store.put_guild(Guild::unavailable(guild_id));
                }
            }
            return CacheEvent::GuildUnavailable(guild_id);
        }

        let was_unavailable = store.guild(guild_id).is_some_and(|g| g.unavailable);
        let guild = self.build_guild(store, payload);
        let snapshot = Arc::new(guild.clone());
        store.put_guild(guild);

        debug!(
            guild_id = %guild_id,
            members = snapshot.members.len(),
            channels = snapshot.channels.len(),
            large = ?snapshot.large,
            "guild cached"
        );

        if was_unavailable {
            CacheEvent::GuildAvailable(snapshot)
        } else {
            CacheEvent::GuildJoin(snapshot)
        }
    }

    fn build_guild(&self, store: &mut EntityStore, payload: GuildPayload) -> Guild {
        let guild_id = payload.id;
        let mut guild = Guild::new(guild_id, payload.name, payload.owner_id);
        guild.icon = payload.icon;
        guild.splash = payload.splash;
        guild.region = payload.region;
        guild.afk_channel_id = payload.afk_channel_id;
        guild.afk_timeout = payload.afk_timeout;
        guild.verification_level = payload.verification_level;
        guild.mfa_level = payload.mfa_level;
        guild.features = payload.features;
        guild.member_count = payload.member_count;

        for mut role in payload.roles {
            role.guild_id = guild_id;
            guild.roles.insert(role.id, role);
        }

        for channel in payload.channels {
            if let Some(channel) = GuildChannel::from_payload(channel, guild_id) {
                guild.channels.insert(channel.id(), channel);
            }
        }

        for member in payload.members {
            let (member, user) = Member::from_payload(member, guild_id);
            store.put_user(user);
            guild.members.insert(member.user_id, member);
        }

        for presence in payload.presences {
            if let Some(member) = guild.members.get_mut(&presence.user.id) {
                member.status = presence.status;
                member.activity = presence.game;
            }
        }

        for mut state in payload.voice_states {
            state.guild_id = Some(guild_id);
            if state.channel_id.is_some_and(|c| guild.channels.contains_key(&c)) {
                guild.insert_voice_state(state);
            }
        }

        let stale: Vec<_> = store.guild_emojis(guild_id).iter().map(|e| e.id).collect();
        for id in stale {
            store.remove_emoji(id);
        }
        for mut emoji in payload.emojis {
            emoji.guild_id = guild_id;
            store.put_emoji(emoji);
        }

        guild.large = payload.large.or_else(|| {
            payload
                .member_count
                .map(|count| count >= self.config.large_threshold)
        });

        guild
    }

    /// Merge changed settings; fields missing from the payload are kept
    pub(super) fn guild_update(
        &self,
        store: &mut EntityStore,
        payload: GuildUpdatePayload,
    ) -> Option<CacheEvent> {
        let Some(guild) = store.guild_mut(payload.id) else {
            unknown_parent(GatewayEventType::GuildUpdate, "guild", payload.id);
            return None;
        };
        let before = Arc::new(guild.clone());

        if let Some(name) = payload.name {
            guild.name = name;
        }
        payload.icon.apply_to(&mut guild.icon);
        payload.splash.apply_to(&mut guild.splash);
        if let Some(owner_id) = payload.owner_id {
            guild.owner_id = owner_id;
        }
        if let Some(region) = payload.region {
            guild.region = region;
        }
        payload.afk_channel_id.apply_to(&mut guild.afk_channel_id);
        if let Some(timeout) = payload.afk_timeout {
            guild.afk_timeout = timeout;
        }
        if let Some(level) = payload.verification_level {
            guild.verification_level = level;
        }
        if let Some(level) = payload.mfa_level {
            guild.mfa_level = level;
        }
        if let Some(features) = payload.features {
            guild.features = features;
        }

        Some(CacheEvent::GuildUpdate {
            before,
            after: Arc::new(guild.clone()),
        })
    }

    /// Outage marks the guild unavailable; otherwise the guild is dropped
    pub(super) fn guild_delete(
        &self,
        store: &mut EntityStore,
        payload: UnavailableGuild,
    ) -> Option<CacheEvent> {
        if payload.unavailable {
            let Some(guild) = store.guild_mut(payload.id) else {
                unknown_parent(GatewayEventType::GuildDelete, "guild", payload.id);
                return None;
            };
            guild.unavailable = true;
            return Some(CacheEvent::GuildUnavailable(payload.id));
        }

        match store.remove_guild(payload.id) {
            Some(guild) => Some(CacheEvent::GuildRemove(Arc::new(guild))),
            None => {
                unknown_parent(GatewayEventType::GuildDelete, "guild", payload.id);
                None
            }
        }
    }

    /// Replace a guild's emoji set
    pub(super) fn emojis_update(
        &self,
        store: &mut EntityStore,
        payload: GuildEmojisUpdate,
    ) -> Option<CacheEvent> {
        let guild_id = payload.guild_id;
        if store.guild(guild_id).is_none() {
            unknown_parent(GatewayEventType::GuildEmojisUpdate, "guild", guild_id);
            return None;
        }

        let before: Vec<_> = store.guild_emojis(guild_id).into_iter().cloned().collect();
        for emoji in &before {
            store.remove_emoji(emoji.id);
        }
        for mut emoji in payload.emojis {
            emoji.guild_id = guild_id;
            store.put_emoji(emoji);
        }
        let after = store.guild_emojis(guild_id).into_iter().cloned().collect();

        Some(CacheEvent::EmojisUpdate {
            guild_id,
            before,
            after,
        })
    }

    pub(super) fn user_update(&self, store: &mut EntityStore, user: User) -> CacheEvent {
        let before = store
            .set_current_user(user.clone())
            .unwrap_or_else(|| user.clone());
        store.put_user(user.clone());
        CacheEvent::UserUpdate {
            before,
            after: user,
        }
    }
}
