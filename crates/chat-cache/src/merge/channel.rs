//! CHANNEL_CREATE / CHANNEL_UPDATE / CHANNEL_DELETE

use chat_core::events::ChannelPayload;
use chat_core::{GatewayEventType, GuildChannel};
use tracing::debug;

use super::{unknown_parent, MergeEngine};
use crate::event::CacheEvent;
use crate::store::EntityStore;

impl MergeEngine {
    pub(super) fn channel_create(
        &self,
        store: &mut EntityStore,
        payload: ChannelPayload,
    ) -> Option<CacheEvent> {
        let channel = self.guild_channel(store, GatewayEventType::ChannelCreate, payload)?;
        let after = channel.clone();
        match store.put_channel(channel) {
            // Replayed create for a channel already cached
            Some(before) => Some(CacheEvent::ChannelUpdate { before, after }),
            None => Some(CacheEvent::ChannelCreate(after)),
        }
    }

    pub(super) fn channel_update(
        &self,
        store: &mut EntityStore,
        payload: ChannelPayload,
    ) -> Option<CacheEvent> {
        let channel_id = payload.id;
        if store.channel(channel_id).is_none() {
            unknown_parent(GatewayEventType::ChannelUpdate, "channel", channel_id);
            return None;
        }
        let channel = self.guild_channel(store, GatewayEventType::ChannelUpdate, payload)?;
        let after = channel.clone();
        let before = store.put_channel(channel)?;
        Some(CacheEvent::ChannelUpdate { before, after })
    }

    /// Remove a channel and any voice states pointing at it
    pub(super) fn channel_delete(
        &self,
        store: &mut EntityStore,
        payload: &ChannelPayload,
    ) -> Option<CacheEvent> {
        let Some(channel) = store.remove_channel(payload.id) else {
            unknown_parent(GatewayEventType::ChannelDelete, "channel", payload.id);
            return None;
        };
        if let Some(guild) = store.guild_mut(channel.guild_id()) {
            let evicted = guild.clear_voice_channel(channel.id());
            if evicted > 0 {
                debug!(channel_id = %channel.id(), evicted, "voice states evicted with channel");
            }
        }
        Some(CacheEvent::ChannelDelete(channel))
    }

    /// Resolve the owning guild and convert; private and unsupported channels are skipped
    fn guild_channel(
        &self,
        store: &EntityStore,
        event: GatewayEventType,
        payload: ChannelPayload,
    ) -> Option<GuildChannel> {
        let Some(guild_id) = payload
            .guild_id
            .or_else(|| store.channel_guild_id(payload.id))
        else {
            debug!(event = %event, channel_id = %payload.id, kind = payload.kind.name(), "ignoring non-guild channel");
            return None;
        };
        if store.guild(guild_id).is_none() {
            unknown_parent(event, "guild", guild_id);
            return None;
        }
        let channel_id = payload.id;
        let channel = GuildChannel::from_payload(payload, guild_id);
        if channel.is_none() {
            debug!(event = %event, channel_id = %channel_id, "ignoring unsupported channel kind");
        }
        channel
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::event::CacheEvent;
    use crate::merge::fixtures::{Harness, GUILD};
    use chat_core::{ChannelKind, Permissions, Snowflake};

    #[test]
    fn test_channel_create() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "CHANNEL_CREATE",
            json!({"id": "210", "type": 4, "guild_id": "100", "name": "Text", "position": 0}),
        );
        assert!(matches!(event, Some(CacheEvent::ChannelCreate(ref c)) if c.kind() == ChannelKind::Category));
        assert_eq!(h.store.channel_guild_id(Snowflake::new(210)), Some(Snowflake::new(GUILD)));
    }

    #[test]
    fn test_channel_create_for_unknown_guild_is_dropped() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "CHANNEL_CREATE",
            json!({"id": "210", "type": 0, "guild_id": "999", "name": "x"}),
        );
        assert!(event.is_none());
        assert!(h.store.channel(Snowflake::new(210)).is_none());
    }

    #[test]
    fn test_dm_channel_is_ignored() {
        let mut h = Harness::with_guild();
        assert!(h.apply("CHANNEL_CREATE", json!({"id": "210", "type": 1})).is_none());
    }

    #[test]
    fn test_channel_update() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "CHANNEL_UPDATE",
            json!({"id": "200", "type": 0, "guild_id": "100", "name": "lobby", "position": 3, "topic": "hi"}),
        );
        let Some(CacheEvent::ChannelUpdate { before, after }) = event else {
            panic!("expected channel update");
        };
        assert_eq!(before.name(), "general");
        assert_eq!(after.name(), "lobby");
        assert_eq!(after.position(), 3);
        assert_eq!(
            h.store.channel(Snowflake::new(200)).and_then(|c| c.as_text()).and_then(|t| t.topic.as_deref()),
            Some("hi")
        );
    }

    #[test]
    fn test_channel_overwrites_follow_updates() {
        let mut h = Harness::with_guild();
        let channel = Snowflake::new(200);
        h.apply(
            "CHANNEL_UPDATE",
            json!({"id": "200", "type": 0, "guild_id": "100", "name": "general",
                   "permission_overwrites": [{"id": "2", "type": "member", "allow": 3072, "deny": 0}]}),
        );
        let guild = h.store.guild(Snowflake::new(GUILD)).unwrap();
        let cached = h.store.channel(channel).unwrap();
        assert_eq!(cached.permission_overwrites().len(), 1);
        assert!(cached.permissions_for(guild, Snowflake::new(2)).contains(Permissions::SEND_MESSAGES));

        h.apply("CHANNEL_UPDATE", json!({"id": "200", "type": 0, "guild_id": "100", "name": "general"}));
        let guild = h.store.guild(Snowflake::new(GUILD)).unwrap();
        let cached = h.store.channel(channel).unwrap();
        assert!(cached.permission_overwrites().is_empty());
        assert!(cached.permissions_for(guild, Snowflake::new(2)).is_empty());
    }

    #[test]
    fn test_channel_update_unknown_is_dropped() {
        let mut h = Harness::with_guild();
        let event = h.apply("CHANNEL_UPDATE", json!({"id": "555", "type": 0, "guild_id": "100", "name": "x"}));
        assert!(event.is_none());
        assert!(h.store.channel(Snowflake::new(555)).is_none());
    }

    #[test]
    fn test_channel_delete_evicts_voice_states() {
        let mut h = Harness::with_guild();
        h.apply("VOICE_STATE_UPDATE", json!({"user_id": "2", "guild_id": "100", "channel_id": "201"}));
        assert!(h.store.voice_state(Snowflake::new(GUILD), Snowflake::new(2)).is_some());

        let event = h.apply("CHANNEL_DELETE", json!({"id": "201", "type": 2, "guild_id": "100"}));
        assert!(matches!(event, Some(CacheEvent::ChannelDelete(_))));
        assert!(h.store.channel(Snowflake::new(201)).is_none());
        assert!(h.store.voice_state(Snowflake::new(GUILD), Snowflake::new(2)).is_none());
    }
}
