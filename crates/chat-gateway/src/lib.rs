//! # chat-gateway
//!
//! Client side of the real-time gateway: wire protocol, frame decoding and
//! the per-shard connection session that keeps a [`chat_cache::Cache`]
//! current.
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{Cache, CacheConfig};
//! use chat_common::ClientConfig;
//! use chat_gateway::ShardManager;
//!
//! let config = ClientConfig::from_env()?;
//! let cache = Cache::shared(CacheConfig::from(&config.cache));
//! let manager = ShardManager::new(config, cache);
//! manager.start().await;
//! manager.wait().await?;
//! ```

pub mod connection;
pub mod decoder;
pub mod error;
pub mod protocol;
pub mod shard;

pub use connection::{Connector, SessionState, ShardStatus, WsConnector};
pub use decoder::{Decoded, EventDecoder};
pub use error::{DecodeError, GatewayError, GatewayResult};
pub use shard::{Shard, ShardConfig, ShardHandle, ShardManager};
