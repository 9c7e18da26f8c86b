//! Shard manager
//!
//! Runs the configured shards in parallel over one shared cache. Shards never
//! share a guild, so their event streams need no ordering between them.

use std::sync::Arc;

use chat_cache::SharedCache;
use chat_common::ClientConfig;
use chat_core::Snowflake;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use super::config::ShardConfig;
use super::handle::ShardHandle;
use super::runner::Shard;
use crate::connection::{Connector, WsConnector};
use crate::error::{GatewayError, GatewayResult};

/// Registry of running shards
pub struct ShardManager {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    cache: SharedCache,
    shards: DashMap<u32, ShardHandle>,
    tasks: Mutex<JoinSet<(u32, GatewayResult<()>)>>,
}

impl ShardManager {
    /// Manager connecting over WebSocket
    pub fn new(config: ClientConfig, cache: SharedCache) -> Self {
        Self::with_connector(config, cache, Arc::new(WsConnector))
    }

    pub fn with_connector(
        config: ClientConfig,
        cache: SharedCache,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            connector,
            cache,
            shards: DashMap::new(),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Spawn every shard this process is configured to run
    ///
    /// Shards already running are left alone.
    pub async fn start(&self) {
        let mut tasks = self.tasks.lock().await;
        for shard_id in self.config.gateway.shard.ids() {
            if self.shards.contains_key(&shard_id) {
                continue;
            }
            let config = ShardConfig::from_client(&self.config, shard_id);
            let (shard, handle) =
                Shard::new(config, Arc::clone(&self.connector), Arc::clone(&self.cache));
            self.shards.insert(shard_id, handle);
            tasks.spawn(async move { (shard_id, shard.run().await) });
        }
        tracing::info!(
            shards = self.shards.len(),
            shard_count = self.config.gateway.shard.count,
            "Shards started"
        );
    }

    /// Handle for one shard
    pub fn shard(&self, shard_id: u32) -> Option<ShardHandle> {
        self.shards.get(&shard_id).map(|entry| entry.value().clone())
    }

    /// The shard that receives events for a guild
    ///
    /// # Errors
    /// `UnknownShard` when the owning shard is not run by this process.
    pub fn shard_for_guild(&self, guild_id: Snowflake) -> GatewayResult<ShardHandle> {
        let shard_id = guild_id.shard_id(self.config.gateway.shard.count);
        self.shard(shard_id).ok_or(GatewayError::UnknownShard(shard_id))
    }

    pub fn shard_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.shards.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Ask every shard to stop
    pub async fn shutdown_all(&self) {
        let handles: Vec<ShardHandle> = self.shards.iter().map(|e| e.value().clone()).collect();
        for handle in handles {
            handle.shutdown().await;
        }
    }

    /// Wait for every shard task to finish
    ///
    /// Returns the first fatal error any shard stopped with.
    pub async fn wait(&self) -> GatewayResult<()> {
        let mut tasks = self.tasks.lock().await;
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((shard_id, result)) => {
                    self.shards.remove(&shard_id);
                    if let Err(e) = result {
                        first_error.get_or_insert(e);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Shard task panicked"),
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
