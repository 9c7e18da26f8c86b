//! Shards
//!
//! A shard is one gateway connection owning a disjoint slice of guilds.

mod config;
mod handle;
mod manager;
mod runner;

pub use config::ShardConfig;
pub use handle::{ShardCommand, ShardHandle};
pub use manager::ShardManager;
pub use runner::Shard;
