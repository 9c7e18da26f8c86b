//! Cache merge engine
//!
//! Applies one decoded dispatch event to the [`EntityStore`] and reports
//! what changed. Merging never fails: an event that references a guild,
//! channel, member, or message the store does not hold is dropped and
//! logged at debug level, and the store is left untouched.
//!
//! Events are merged strictly in arrival order; the caller serialises
//! access to the store.

mod channel;
mod guild;
mod member;
mod message;
mod role;
mod voice;

use chat_core::{DispatchEvent, GatewayEventType, Snowflake};
use tracing::debug;

use crate::config::CacheConfig;
use crate::event::CacheEvent;
use crate::store::EntityStore;

/// Merges dispatch events into an entity store
#[derive(Debug, Clone, Copy)]
pub struct MergeEngine {
    config: CacheConfig,
}

impl MergeEngine {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Merge one event, returning the change notification if anything changed
    pub fn apply(&self, store: &mut EntityStore, event: DispatchEvent) -> Option<CacheEvent> {
        match event {
            DispatchEvent::Ready(ready) => Some(self.ready(store, *ready)),
            DispatchEvent::Resumed => Some(CacheEvent::Resumed),
            DispatchEvent::GuildCreate(payload) => Some(self.guild_create(store, *payload)),
            DispatchEvent::GuildUpdate(payload) => self.guild_update(store, *payload),
            DispatchEvent::GuildDelete(payload) => self.guild_delete(store, payload),
            DispatchEvent::GuildEmojisUpdate(payload) => self.emojis_update(store, payload),
            DispatchEvent::ChannelCreate(payload) => self.channel_create(store, payload),
            DispatchEvent::ChannelUpdate(payload) => self.channel_update(store, payload),
            DispatchEvent::ChannelDelete(payload) => self.channel_delete(store, &payload),
            DispatchEvent::MemberAdd(payload) => self.member_add(store, *payload),
            DispatchEvent::MemberUpdate(payload) => self.member_update(store, *payload),
            DispatchEvent::MemberRemove(payload) => self.member_remove(store, &payload),
            DispatchEvent::MembersChunk(payload) => self.members_chunk(store, payload),
            DispatchEvent::PresenceUpdate(payload) => self.presence_update(store, payload),
            DispatchEvent::RoleCreate(payload) => self.role_create(store, payload),
            DispatchEvent::RoleUpdate(payload) => self.role_update(store, payload),
            DispatchEvent::RoleDelete(payload) => self.role_delete(store, payload),
            DispatchEvent::VoiceStateUpdate(state) => self.voice_state_update(store, state),
            DispatchEvent::MessageCreate(payload) => Some(self.message_create(store, &payload)),
            DispatchEvent::MessageUpdate(payload) => self.message_update(store, *payload),
            DispatchEvent::MessageDelete(payload) => self.message_delete(store, payload),
            DispatchEvent::UserUpdate(user) => Some(self.user_update(store, user)),
        }
    }

    /// Resolve an undetermined large flag from the data now at hand
    fn settle_large(&self, store: &mut EntityStore, guild_id: Snowflake) {
        if let Some(guild) = store.guild_mut(guild_id) {
            if guild.large.is_none() {
                guild.large = Some(guild.is_large(self.config.large_threshold));
            }
        }
    }
}

/// Log an event whose parent entity is not cached
fn unknown_parent(event: GatewayEventType, entity: &'static str, id: Snowflake) {
    debug!(event = %event, entity, id = %id, "dropping event for uncached entity");
}
