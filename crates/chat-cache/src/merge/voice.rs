//! VOICE_STATE_UPDATE

use chat_core::{GatewayEventType, VoiceState};

use super::{unknown_parent, MergeEngine};
use crate::event::CacheEvent;
use crate::store::EntityStore;

impl MergeEngine {
    /// Move, update, or evict a voice state
    ///
    /// A state whose channel is missing or not cached is evicted. The
    /// "before" side is an empty state when nothing was cached.
    pub(super) fn voice_state_update(
        &self,
        store: &mut EntityStore,
        mut state: VoiceState,
    ) -> Option<CacheEvent> {
        let Some(guild_id) = state.guild_id else {
            unknown_parent(GatewayEventType::VoiceStateUpdate, "guild", state.user_id);
            return None;
        };
        let Some(guild) = store.guild_mut(guild_id) else {
            unknown_parent(GatewayEventType::VoiceStateUpdate, "guild", guild_id);
            return None;
        };

        let user_id = state.user_id;
        let before = guild
            .voice_state(user_id)
            .cloned()
            .unwrap_or_else(|| VoiceState::empty(user_id, Some(guild_id)));

        state.channel_id = state.channel_id.filter(|c| guild.channels.contains_key(c));
        if state.channel_id.is_some() {
            guild.insert_voice_state(state.clone());
        } else {
            guild.remove_voice_state(user_id);
        }

        Some(CacheEvent::VoiceStateUpdate {
            member: guild.member(user_id).cloned(),
            before,
            after: state,
        })
    }
}
