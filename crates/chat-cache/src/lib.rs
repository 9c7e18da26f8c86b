//! # chat-cache
//!
//! In-memory entity cache kept current by gateway dispatch events.
//!
//! ## Features
//!
//! - **Entity Store**: Guilds, channels, members, roles, voice states, users,
//!   emojis, and a bounded message cache, keyed by snowflake
//! - **Merge Engine**: Applies one dispatch event at a time, tolerating
//!   events for entities that were never cached
//! - **Notifications**: Before/after snapshots broadcast to subscribers
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{Cache, CacheConfig};
//!
//! let cache = Cache::shared(CacheConfig::default());
//! let mut changes = cache.subscribe();
//!
//! cache.apply(dispatch_event);
//! while let Ok(change) = changes.recv().await {
//!     println!("{}", change.kind());
//! }
//! ```

mod cache;
mod config;
mod event;
pub mod merge;
pub mod store;

pub use cache::{Cache, SharedCache};
pub use config::CacheConfig;
pub use event::CacheEvent;
pub use merge::MergeEngine;
pub use store::EntityStore;
