//! Member events: add, update, remove, chunks, presences

use chat_core::events::{MemberAdd, MemberRemove, MemberUpdate, MembersChunk, PresencePayload};
use chat_core::{GatewayEventType, Member};

use super::{unknown_parent, MergeEngine};
use crate::event::CacheEvent;
use crate::store::EntityStore;

impl MergeEngine {
    pub(super) fn member_add(&self, store: &mut EntityStore, payload: MemberAdd) -> Option<CacheEvent> {
        let guild_id = payload.guild_id;
        if store.guild(guild_id).is_none() {
            unknown_parent(GatewayEventType::GuildMemberAdd, "guild", guild_id);
            return None;
        }

        let (member, user) = Member::from_payload(payload.member, guild_id);
        store.put_user(user);
        let replaced = store.put_member(member.clone()).is_some();
        if !replaced {
            if let Some(guild) = store.guild_mut(guild_id) {
                guild.member_count = guild.member_count.map(|count| count + 1);
            }
        }
        Some(CacheEvent::MemberJoin(member))
    }

    /// Merge nickname and roles; the embedded user refreshes the user map
    pub(super) fn member_update(
        &self,
        store: &mut EntityStore,
        payload: MemberUpdate,
    ) -> Option<CacheEvent> {
        let guild_id = payload.guild_id;
        let user_id = payload.user.id;
        let Some(member) = store.member_mut(guild_id, user_id) else {
            unknown_parent(GatewayEventType::GuildMemberUpdate, "member", user_id);
            return None;
        };

        let before = member.clone();
        payload.nick.apply_to(&mut member.nick);
        if let Some(roles) = payload.roles {
            member.roles = roles;
        }
        let after = member.clone();
        store.put_user(payload.user);

        Some(CacheEvent::MemberUpdate { before, after })
    }

    /// Remove a member; unknown members leave the count untouched
    pub(super) fn member_remove(
        &self,
        store: &mut EntityStore,
        payload: &MemberRemove,
    ) -> Option<CacheEvent> {
        let guild_id = payload.guild_id;
        let Some(member) = store.remove_member(guild_id, payload.user.id) else {
            unknown_parent(GatewayEventType::GuildMemberRemove, "member", payload.user.id);
            return None;
        };
        if let Some(guild) = store.guild_mut(guild_id) {
            guild.member_count = guild.member_count.map(|count| count.saturating_sub(1));
            guild.remove_voice_state(member.user_id);
        }
        Some(CacheEvent::MemberRemove(member))
    }

    pub(super) fn members_chunk(
        &self,
        store: &mut EntityStore,
        payload: MembersChunk,
    ) -> Option<CacheEvent> {
        let guild_id = payload.guild_id;
        if store.guild(guild_id).is_none() {
            unknown_parent(GatewayEventType::GuildMembersChunk, "guild", guild_id);
            return None;
        }

        let count = payload.members.len();
        for member in payload.members {
            let (mut member, user) = Member::from_payload(member, guild_id);
            if let Some(existing) = store.member(guild_id, member.user_id) {
                member.status = existing.status;
                member.activity = existing.activity.clone();
            }
            store.put_user(user);
            store.put_member(member);
        }
        for presence in payload.presences {
            if let Some(member) = store.member_mut(guild_id, presence.user.id) {
                member.status = presence.status;
                member.activity = presence.game;
            }
        }
        self.settle_large(store, guild_id);

        Some(CacheEvent::MembersChunk { guild_id, count })
    }

    /// Update status and activity of a cached member; members are never created here
    pub(super) fn presence_update(
        &self,
        store: &mut EntityStore,
        payload: PresencePayload,
    ) -> Option<CacheEvent> {
        let user_id = payload.user.id;
        let Some(guild_id) = payload.guild_id else {
            unknown_parent(GatewayEventType::PresenceUpdate, "guild", user_id);
            return None;
        };
        if store.guild(guild_id).is_none() {
            unknown_parent(GatewayEventType::PresenceUpdate, "guild", guild_id);
            return None;
        }
        self.settle_large(store, guild_id);

        let Some(member) = store.member_mut(guild_id, user_id) else {
            unknown_parent(GatewayEventType::PresenceUpdate, "member", user_id);
            return None;
        };
        let before = member.clone();
        member.status = payload.status;
        member.activity = payload.game;

        Some(CacheEvent::PresenceUpdate {
            before,
            after: member.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::CacheConfig;
    use crate::event::CacheEvent;
    use crate::merge::fixtures::{guild_payload, user, Harness, GUILD};
    use chat_core::{Snowflake, Status};

    const GID: Snowflake = Snowflake::new(GUILD);

    fn member_count(h: &Harness) -> Option<u64> {
        h.store.guild(GID).and_then(|g| g.member_count)
    }

    #[test]
    fn test_member_add_increments_count() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "GUILD_MEMBER_ADD",
            json!({"guild_id": "100", "user": user(3, "corro"), "roles": []}),
        );
        assert!(matches!(event, Some(CacheEvent::MemberJoin(ref m)) if m.user_id == Snowflake::new(3)));
        assert_eq!(member_count(&h), Some(3));
        assert_eq!(h.store.user(Snowflake::new(3)).unwrap().username, "corro");

        // Duplicate add does not double count
        h.apply("GUILD_MEMBER_ADD", json!({"guild_id": "100", "user": user(3, "corro")}));
        assert_eq!(member_count(&h), Some(3));
    }

    #[test]
    fn test_member_remove_decrements_count() {
        let mut h = Harness::with_guild();
        let event = h.apply("GUILD_MEMBER_REMOVE", json!({"guild_id": "100", "user": user(2, "ferris")}));
        assert!(matches!(event, Some(CacheEvent::MemberRemove(_))));
        assert_eq!(member_count(&h), Some(1));
        assert!(h.store.member(GID, Snowflake::new(2)).is_none());
    }

    #[test]
    fn test_member_remove_unknown_is_noop() {
        let mut h = Harness::with_guild();
        let event = h.apply("GUILD_MEMBER_REMOVE", json!({"guild_id": "100", "user": user(42, "ghost")}));
        assert!(event.is_none());
        assert_eq!(member_count(&h), Some(2));
        assert_eq!(h.store.guild(GID).unwrap().members.len(), 2);
    }

    #[test]
    fn test_member_update() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "GUILD_MEMBER_UPDATE",
            json!({"guild_id": "100", "user": user(2, "ferris2"), "nick": "crab", "roles": ["101", "102"]}),
        );
        let Some(CacheEvent::MemberUpdate { before, after }) = event else {
            panic!("expected member update");
        };
        assert!(before.nick.is_none());
        assert_eq!(after.nick.as_deref(), Some("crab"));
        assert_eq!(after.roles.len(), 2);
        assert_eq!(h.store.user(Snowflake::new(2)).unwrap().username, "ferris2");

        // Roles absent: kept. Nick null: cleared.
        h.apply("GUILD_MEMBER_UPDATE", json!({"guild_id": "100", "user": user(2, "ferris2"), "nick": null}));
        let member = h.store.member(GID, Snowflake::new(2)).unwrap();
        assert!(member.nick.is_none());
        assert_eq!(member.roles.len(), 2);
    }

    #[test]
    fn test_presence_updates_existing_member_only() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "PRESENCE_UPDATE",
            json!({"user": {"id": "1"}, "guild_id": "100", "status": "dnd", "game": {"name": "rustc", "type": 0}}),
        );
        let Some(CacheEvent::PresenceUpdate { before, after }) = event else {
            panic!("expected presence update");
        };
        assert_eq!(before.status, Status::Offline);
        assert_eq!(after.status, Status::Dnd);
        assert_eq!(after.activity.map(|a| a.name).as_deref(), Some("rustc"));

        let unknown = h.apply("PRESENCE_UPDATE", json!({"user": {"id": "77"}, "guild_id": "100", "status": "online"}));
        assert!(unknown.is_none());
        assert!(h.store.member(GID, Snowflake::new(77)).is_none());
    }

    #[test]
    fn test_presence_settles_large_flag() {
        let mut h = Harness::with_config(CacheConfig::default().with_large_threshold(2));
        let mut payload = guild_payload();
        payload.as_object_mut().unwrap().remove("member_count");
        h.apply("GUILD_CREATE", payload);
        assert_eq!(h.store.guild(GID).unwrap().large, None);

        h.apply("PRESENCE_UPDATE", json!({"user": {"id": "1"}, "guild_id": "100", "status": "online"}));
        assert_eq!(h.store.guild(GID).unwrap().large, Some(true));
    }

    #[test]
    fn test_members_chunk() {
        let mut h = Harness::with_guild();
        let event = h.apply(
            "GUILD_MEMBERS_CHUNK",
            json!({
                "guild_id": "100",
                "members": [{"user": user(3, "a")}, {"user": user(4, "b")}],
                "presences": [{"user": {"id": "4"}, "status": "idle"}]
            }),
        );
        assert_eq!(event, Some(CacheEvent::MembersChunk { guild_id: GID, count: 2 }));
        assert_eq!(h.store.guild(GID).unwrap().members.len(), 4);
        assert_eq!(h.store.member(GID, Snowflake::new(4)).unwrap().status, Status::Idle);
        // Presence from the guild snapshot survives a chunk that repeats the member
        h.apply("GUILD_MEMBERS_CHUNK", json!({"guild_id": "100", "members": [{"user": user(2, "ferris")}]}));
        assert_eq!(h.store.member(GID, Snowflake::new(2)).unwrap().status, Status::Online);
    }
}
