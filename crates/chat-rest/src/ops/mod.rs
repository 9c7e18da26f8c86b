//! Outbound guild operations
//!
//! Each operation is a thin caller of the dispatch gate. Successful responses
//! are folded into the cache through the same merge engine the gateway feeds,
//! so the gateway event that follows the change finds it already applied.

mod params;

use std::sync::Arc;

use chat_cache::SharedCache;
use chat_core::events::{
    ChannelPayload, GuildEmojisUpdate, GuildUpdatePayload, MessagePayload, RoleDelete, RoleEvent,
    UnavailableGuild,
};
use chat_core::{DispatchEvent, Emoji, Guild, GuildChannel, Message, Role, Snowflake};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub use params::{BanEntry, CreateChannel, EditGuild, RoleParams};

use crate::error::{RestError, RestResult};
use crate::gate::DispatchGate;
use crate::image;
use crate::request::{File, Request};
use crate::route::Route;

/// Most days of messages a ban can delete
pub const MAX_BAN_DELETE_DAYS: u8 = 7;

/// Longest message body accepted
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Custom emoji names run 2 to 32 characters
pub const EMOJI_NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=32;

#[derive(Deserialize)]
struct PruneCount {
    pruned: u64,
}

/// Outbound operations bound to a gate and the cache they reconcile into
#[derive(Clone)]
pub struct GuildOps {
    gate: Arc<dyn DispatchGate>,
    cache: SharedCache,
}

impl GuildOps {
    pub fn new(gate: Arc<dyn DispatchGate>, cache: SharedCache) -> Self {
        Self { gate, cache }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    async fn call(&self, request: Request) -> RestResult<Value> {
        tracing::debug!(route = %request.route, "Dispatching request");
        Ok(self.gate.dispatch(request).await?)
    }

    async fn call_as<T: DeserializeOwned>(&self, request: Request) -> RestResult<T> {
        Ok(serde_json::from_value(self.call(request).await?)?)
    }

    fn reconcile(&self, event: DispatchEvent) {
        let kind = event.kind();
        match self.cache.apply(event) {
            Some(change) => tracing::debug!(event = %kind, change = change.kind(), "Reconciled response"),
            None => tracing::debug!(event = %kind, "Response left cache unchanged"),
        }
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Create a role; the cached copy sits directly above `@everyone`
    pub async fn create_role(
        &self,
        guild_id: Snowflake,
        params: &RoleParams,
        reason: Option<&str>,
    ) -> RestResult<Role> {
        let request = Request::new(Route::create_role(guild_id))
            .json(serde_json::to_value(params)?)
            .reason(reason);
        let mut role: Role = self.call_as(request).await?;
        role.guild_id = guild_id;

        self.reconcile(DispatchEvent::RoleCreate(RoleEvent {
            guild_id,
            role: role.clone(),
        }));
        Ok(self.cache.role(guild_id, role.id).unwrap_or(role))
    }

    pub async fn edit_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        params: &RoleParams,
        reason: Option<&str>,
    ) -> RestResult<Role> {
        let request = Request::new(Route::edit_role(guild_id, role_id))
            .json(serde_json::to_value(params)?)
            .reason(reason);
        let mut role: Role = self.call_as(request).await?;
        role.guild_id = guild_id;

        self.reconcile(DispatchEvent::RoleUpdate(RoleEvent {
            guild_id,
            role: role.clone(),
        }));
        Ok(self.cache.role(guild_id, role.id).unwrap_or(role))
    }

    pub async fn delete_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        reason: Option<&str>,
    ) -> RestResult<()> {
        if role_id == guild_id {
            return Err(RestError::invalid("The @everyone role cannot be deleted"));
        }
        self.call(Request::new(Route::delete_role(guild_id, role_id)).reason(reason))
            .await?;
        self.reconcile(DispatchEvent::RoleDelete(RoleDelete { guild_id, role_id }));
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Remove a member; they can rejoin with an invite
    pub async fn kick(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        reason: Option<&str>,
    ) -> RestResult<()> {
        self.call(Request::new(Route::kick(guild_id, user_id)).reason(reason))
            .await?;
        Ok(())
    }

    /// Ban a user, deleting `delete_message_days` (0-7) of their messages
    pub async fn ban(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        delete_message_days: u8,
        reason: Option<&str>,
    ) -> RestResult<()> {
        if delete_message_days > MAX_BAN_DELETE_DAYS {
            return Err(RestError::invalid(format!(
                "delete_message_days must be 0-{MAX_BAN_DELETE_DAYS}, got {delete_message_days}"
            )));
        }
        let route = Route::ban(guild_id, user_id, delete_message_days);
        self.call(Request::new(route).reason(reason)).await?;
        Ok(())
    }

    pub async fn unban(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        reason: Option<&str>,
    ) -> RestResult<()> {
        self.call(Request::new(Route::unban(guild_id, user_id)).reason(reason))
            .await?;
        Ok(())
    }

    pub async fn bans(&self, guild_id: Snowflake) -> RestResult<Vec<BanEntry>> {
        self.call_as(Request::new(Route::get_bans(guild_id))).await
    }

    /// Ban entry for one user; a user who is not banned is `NotFound`
    pub async fn ban_entry(&self, guild_id: Snowflake, user_id: Snowflake) -> RestResult<BanEntry> {
        self.call_as(Request::new(Route::get_ban(guild_id, user_id))).await
    }

    /// Remove members inactive for `days`; returns how many were removed
    pub async fn prune_members(
        &self,
        guild_id: Snowflake,
        days: u32,
        reason: Option<&str>,
    ) -> RestResult<u64> {
        check_prune_days(days)?;
        let count: PruneCount = self
            .call_as(Request::new(Route::prune(guild_id, days)).reason(reason))
            .await?;
        Ok(count.pruned)
    }

    /// How many members a prune over `days` would remove
    pub async fn estimate_pruned_members(&self, guild_id: Snowflake, days: u32) -> RestResult<u64> {
        check_prune_days(days)?;
        let count: PruneCount = self
            .call_as(Request::new(Route::estimate_prune(guild_id, days)))
            .await?;
        Ok(count.pruned)
    }

    // =========================================================================
    // Channels
    // =========================================================================

    pub async fn create_channel(
        &self,
        guild_id: Snowflake,
        params: &CreateChannel,
        reason: Option<&str>,
    ) -> RestResult<GuildChannel> {
        params.validate()?;
        let request = Request::new(Route::create_channel(guild_id))
            .json(serde_json::to_value(params)?)
            .reason(reason);
        let mut payload: ChannelPayload = self.call_as(request).await?;
        payload.guild_id.get_or_insert(guild_id);

        let channel = GuildChannel::from_payload(payload.clone(), guild_id).ok_or_else(|| {
            RestError::Unexpected(format!("channel {} is not a guild channel", payload.id))
        })?;
        self.reconcile(DispatchEvent::ChannelCreate(payload));
        Ok(self.cache.channel(channel.id()).unwrap_or(channel))
    }

    pub async fn delete_channel(
        &self,
        channel_id: Snowflake,
        reason: Option<&str>,
    ) -> RestResult<()> {
        let request = Request::new(Route::delete_channel(channel_id)).reason(reason);
        let payload: ChannelPayload = self.call_as(request).await?;
        self.reconcile(DispatchEvent::ChannelDelete(payload));
        Ok(())
    }

    /// Post a message, optionally with one attachment
    pub async fn send_message(
        &self,
        channel_id: Snowflake,
        content: &str,
        file: Option<File>,
    ) -> RestResult<Message> {
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(RestError::invalid(format!(
                "Message content is longer than {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        if content.is_empty() && file.is_none() {
            return Err(RestError::invalid("Cannot send an empty message"));
        }

        let mut request =
            Request::new(Route::create_message(channel_id)).json(json!({ "content": content }));
        if let Some(file) = file {
            request = request.file(file);
        }
        let payload: MessagePayload = self.call_as(request).await?;
        let message = Message::from_payload(&payload);
        self.reconcile(DispatchEvent::MessageCreate(Box::new(payload)));
        Ok(message)
    }

    // =========================================================================
    // Guild
    // =========================================================================

    /// Change guild settings; returns the refreshed cached guild
    pub async fn edit_guild(
        &self,
        guild_id: Snowflake,
        edit: &EditGuild,
        reason: Option<&str>,
    ) -> RestResult<Option<Guild>> {
        let request = Request::new(Route::edit_guild(guild_id))
            .json(edit.to_payload()?)
            .reason(reason);
        let update: GuildUpdatePayload = self.call_as(request).await?;
        if update.id != guild_id {
            return Err(RestError::Unexpected(format!(
                "edited guild {guild_id} but response describes {}",
                update.id
            )));
        }
        self.reconcile(DispatchEvent::GuildUpdate(Box::new(update)));
        Ok(self.cache.guild(guild_id))
    }

    /// Delete a guild the current user owns; it is dropped from the cache
    pub async fn delete_guild(&self, guild_id: Snowflake) -> RestResult<()> {
        self.call(Request::new(Route::delete_guild(guild_id))).await?;
        self.reconcile(DispatchEvent::GuildDelete(UnavailableGuild {
            id: guild_id,
            unavailable: false,
        }));
        Ok(())
    }

    /// Upload a custom emoji from PNG, JPEG or GIF bytes
    ///
    /// An empty `roles` list makes the emoji usable by everyone.
    pub async fn create_custom_emoji(
        &self,
        guild_id: Snowflake,
        name: &str,
        image_bytes: &[u8],
        roles: &[Snowflake],
        reason: Option<&str>,
    ) -> RestResult<Emoji> {
        if !EMOJI_NAME_LENGTH.contains(&name.chars().count()) {
            return Err(RestError::invalid(format!(
                "Emoji name must be {}-{} characters",
                EMOJI_NAME_LENGTH.start(),
                EMOJI_NAME_LENGTH.end()
            )));
        }
        let mut payload = json!({ "name": name, "image": image::data_uri(image_bytes)? });
        if !roles.is_empty() {
            payload["roles"] = serde_json::to_value(roles)?;
        }
        let request = Request::new(Route::create_emoji(guild_id))
            .json(payload)
            .reason(reason);
        let mut emoji: Emoji = self.call_as(request).await?;
        emoji.guild_id = guild_id;

        let mut emojis = self.cache.guild_emojis(guild_id);
        emojis.retain(|e| e.id != emoji.id);
        emojis.push(emoji.clone());
        self.reconcile(DispatchEvent::GuildEmojisUpdate(GuildEmojisUpdate { guild_id, emojis }));
        Ok(emoji)
    }

    /// Leave a guild; it is dropped from the cache at once
    pub async fn leave_guild(&self, guild_id: Snowflake) -> RestResult<()> {
        self.call(Request::new(Route::leave_guild(guild_id))).await?;
        self.reconcile(DispatchEvent::GuildDelete(UnavailableGuild {
            id: guild_id,
            unavailable: false,
        }));
        Ok(())
    }
}

impl std::fmt::Debug for GuildOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuildOps").finish_non_exhaustive()
    }
}

fn check_prune_days(days: u32) -> RestResult<()> {
    if days == 0 {
        return Err(RestError::invalid("Prune days must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
