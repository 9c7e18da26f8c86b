//! Gateway client entry point
//!
//! Run with:
//! ```bash
//! CHAT_TOKEN=... cargo run -p chat-gateway
//! ```
//!
//! Connects the configured shards and logs every cache change until Ctrl-C.

use anyhow::Context;
use chat_cache::{Cache, CacheConfig, CacheEvent};
use chat_common::{try_init_tracing_with_config, ClientConfig, TracingConfig};
use chat_gateway::ShardManager;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Gateway client failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("loading configuration")?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_format(config.log_format)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        url = %config.gateway.url,
        shards = ?config.gateway.shard.ids(),
        shard_count = config.gateway.shard.count,
        "Configuration loaded"
    );

    let cache = Cache::shared(CacheConfig::from(&config.cache));
    tokio::spawn(log_changes(cache.subscribe()));

    let manager = ShardManager::new(config, cache);
    manager.start().await;

    tokio::select! {
        result = manager.wait() => result.context("gateway stopped")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            info!("Shutting down");
            manager.shutdown_all().await;
            manager.wait().await.context("gateway stopped")?;
        }
    }

    Ok(())
}

async fn log_changes(mut changes: tokio::sync::broadcast::Receiver<CacheEvent>) {
    loop {
        match changes.recv().await {
            Ok(change) => info!(
                change = change.kind(),
                guild_id = ?change.guild_id(),
                "Cache changed"
            ),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Change log fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
