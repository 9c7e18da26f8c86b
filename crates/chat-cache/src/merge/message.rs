//! Message events against the bounded message cache

use chat_core::events::{MessageDelete, MessagePayload, MessageUpdatePayload};
use chat_core::{GatewayEventType, Message};

use super::{unknown_parent, MergeEngine};
use crate::event::CacheEvent;
use crate::store::EntityStore;

impl MergeEngine {
    /// Record a message and bump its channel's last message ID
    pub(super) fn message_create(&self, store: &mut EntityStore, payload: &MessagePayload) -> CacheEvent {
        let message = Message::from_payload(payload);
        store.put_user(payload.author.clone());

        if let Some(guild_id) = store.channel_guild_id(message.channel_id) {
            if let Some(text) = store
                .guild_mut(guild_id)
                .and_then(|g| g.channels.get_mut(&message.channel_id))
                .and_then(|c| c.as_text_mut())
            {
                text.last_message_id = Some(message.id);
            }
        }

        store.push_message(message.clone());
        CacheEvent::MessageCreate(message)
    }

    /// Merge an edit into a cached message; edits of uncached messages are dropped
    pub(super) fn message_update(
        &self,
        store: &mut EntityStore,
        payload: MessageUpdatePayload,
    ) -> Option<CacheEvent> {
        let Some(message) = store.message_mut(payload.id) else {
            unknown_parent(GatewayEventType::MessageUpdate, "message", payload.id);
            return None;
        };
        let before = message.clone();
        message.apply_update(payload);
        Some(CacheEvent::MessageEdit {
            before,
            after: message.clone(),
        })
    }

    pub(super) fn message_delete(
        &self,
        store: &mut EntityStore,
        payload: MessageDelete,
    ) -> Option<CacheEvent> {
        let Some(message) = store.remove_message(payload.id) else {
            unknown_parent(GatewayEventType::MessageDelete, "message", payload.id);
            return None;
        };
        Some(CacheEvent::MessageDelete(message))
    }
}
