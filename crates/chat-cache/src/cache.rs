//! Shared cache handle
//!
//! [`Cache`] wraps the entity store in a lock and fans change notifications
//! out over a broadcast channel. Shards feed it decoded dispatch events;
//! readers take owned snapshots so no lock is held across an `.await`.

use std::sync::Arc;

use chat_core::{
    DispatchEvent, Emoji, Guild, GuildChannel, Member, Message, Role, Snowflake, User,
    VoiceState,
};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::config::CacheConfig;
use crate::event::CacheEvent;
use crate::merge::MergeEngine;
use crate::store::EntityStore;

/// Cache shared between shards and consumers
pub type SharedCache = Arc<Cache>;

/// Thread-safe entity cache with change notifications
#[derive(Debug)]
pub struct Cache {
    store: RwLock<EntityStore>,
    engine: MergeEngine,
    notifier: broadcast::Sender<CacheEvent>,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Self {
        let (notifier, _) = broadcast::channel(config.notify_capacity.max(1));
        Self {
            store: RwLock::new(EntityStore::new(config.max_messages)),
            engine: MergeEngine::new(config),
            notifier,
        }
    }

    /// Create a cache behind an `Arc`
    pub fn shared(config: CacheConfig) -> SharedCache {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &CacheConfig {
        self.engine.config()
    }

    /// Receive every change merged from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.notifier.subscribe()
    }

    /// Merge one dispatch event and notify subscribers
    pub fn apply(&self, event: DispatchEvent) -> Option<CacheEvent> {
        let kind = event.kind();
        let change = {
            let mut store = self.store.write();
            self.engine.apply(&mut store, event)
        };

        if let Some(change) = &change {
            trace!(event = %kind, change = change.kind(), "merged");
            // No subscribers is fine
            let _ = self.notifier.send(change.clone());
        }
        change
    }

    /// Run a closure against the store under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        f(&self.store.read())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.read(|s| s.guild(id).cloned())
    }

    pub fn guild_ids(&self) -> Vec<Snowflake> {
        self.read(EntityStore::guild_ids)
    }

    pub fn guild_count(&self) -> usize {
        self.read(EntityStore::guild_count)
    }

    pub fn channel(&self, id: Snowflake) -> Option<GuildChannel> {
        self.read(|s| s.channel(id).cloned())
    }

    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.read(|s| s.member(guild_id, user_id).cloned())
    }

    pub fn member_named(&self, guild_id: Snowflake, name: &str) -> Option<Member> {
        self.read(|s| s.member_named(guild_id, name).cloned())
    }

    pub fn role(&self, guild_id: Snowflake, role_id: Snowflake) -> Option<Role> {
        self.read(|s| s.role(guild_id, role_id).cloned())
    }

    pub fn voice_state(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<VoiceState> {
        self.read(|s| s.voice_state(guild_id, user_id).cloned())
    }

    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.read(|s| s.user(id).cloned())
    }

    pub fn current_user(&self) -> Option<User> {
        self.read(|s| s.current_user().cloned())
    }

    pub fn message(&self, id: Snowflake) -> Option<Message> {
        self.read(|s| s.message(id).cloned())
    }

    pub fn emoji(&self, id: Snowflake) -> Option<Emoji> {
        self.read(|s| s.emoji(id).cloned())
    }

    pub fn guild_emojis(&self, guild_id: Snowflake) -> Vec<Emoji> {
        self.read(|s| s.guild_emojis(guild_id).into_iter().cloned().collect())
    }

    // =========================================================================
    // Shard bookkeeping
    // =========================================================================

    /// Drop every guild routed to a shard, ahead of a fresh identify
    pub fn purge_shard(&self, shard_id: u32, shard_count: u32) -> usize {
        let mut store = self.store.write();
        let owned: Vec<_> = store
            .guilds()
            .filter(|g| g.shard_id(shard_count) == shard_id)
            .map(|g| g.id)
            .collect();
        for id in &owned {
            store.remove_guild(*id);
        }
        info!(shard_id, purged = owned.len(), "shard cache purged");
        owned.len()
    }

    /// Flag every guild routed to a shard as unavailable while it is offline
    pub fn mark_unavailable(&self, shard_id: u32, shard_count: u32) -> usize {
        let mut store = self.store.write();
        let owned: Vec<_> = store
            .guilds()
            .filter(|g| g.shard_id(shard_count) == shard_id && !g.unavailable)
            .map(|g| g.id)
            .collect();
        for id in &owned {
            if let Some(guild) = store.guild_mut(*id) {
                guild.unavailable = true;
            }
        }
        debug!(shard_id, marked = owned.len(), "guilds marked unavailable");
        owned.len()
    }

    /// Forget everything
    pub fn clear(&self) {
        self.store.write().clear();
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
