//! Role events and position bookkeeping
//!
//! Positions stay dense: a new role enters at position 1 (just above
//! `@everyone`) and pushes every other non-default role up by one; a deleted
//! role pulls every role above it down by one. A create for a role that is
//! already cached only refreshes its attributes.

use chat_core::events::{RoleDelete, RoleEvent};
use chat_core::GatewayEventType;

use super::{unknown_parent, MergeEngine};
use crate::event::CacheEvent;
use crate::store::EntityStore;

impl MergeEngine {
    pub(super) fn role_create(&self, store: &mut EntityStore, payload: RoleEvent) -> Option<CacheEvent> {
        let guild_id = payload.guild_id;
        let Some(guild) = store.guild_mut(guild_id) else {
            unknown_parent(GatewayEventType::GuildRoleCreate, "guild", guild_id);
            return None;
        };

        let mut role = payload.role;
        role.guild_id = guild_id;

        if let Some(existing) = guild.roles.get_mut(&role.id) {
            let before = existing.clone();
            existing.update_from(role);
            return Some(CacheEvent::RoleUpdate {
                before,
                after: existing.clone(),
            });
        }

        if role.is_default() {
            role.position = 0;
        } else {
            for other in guild.roles.values_mut().filter(|r| !r.is_default()) {
                other.position += 1;
            }
            role.position = 1;
        }
        guild.roles.insert(role.id, role.clone());

        Some(CacheEvent::RoleCreate(role))
    }

    pub(super) fn role_update(&self, store: &mut EntityStore, payload: RoleEvent) -> Option<CacheEvent> {
        let role_id = payload.role.id;
        let Some(existing) = store.guild_mut(payload.guild_id).and_then(|g| g.roles.get_mut(&role_id)) else {
            unknown_parent(GatewayEventType::GuildRoleUpdate, "role", role_id);
            return None;
        };

        let before = existing.clone();
        // Server-side reorders arrive as a burst of role updates
        let position = payload.role.position;
        existing.update_from(payload.role);
        existing.position = position;
        Some(CacheEvent::RoleUpdate {
            before,
            after: existing.clone(),
        })
    }

    /// Remove a role, close the gap above it, and strip it from members
    pub(super) fn role_delete(&self, store: &mut EntityStore, payload: RoleDelete) -> Option<CacheEvent> {
        let Some(guild) = store.guild_mut(payload.guild_id) else {
            unknown_parent(GatewayEventType::GuildRoleDelete, "guild", payload.guild_id);
            return None;
        };
        let Some(removed) = guild.roles.remove(&payload.role_id) else {
            unknown_parent(GatewayEventType::GuildRoleDelete, "role", payload.role_id);
            return None;
        };

        for role in guild.roles.values_mut().filter(|r| r.position > removed.position) {
            role.position -= 1;
        }
        for member in guild.members.values_mut() {
            member.roles.retain(|id| *id != removed.id);
        }

        Some(CacheEvent::RoleDelete(removed))
    }
}
