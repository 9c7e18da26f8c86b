//! # chat-core
//!
//! Client domain model: snowflakes, the cached entity graph, and typed
//! gateway events. This crate performs no I/O.

pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Activity, ActivityKind, CategoryChannel, ChannelKind, Embed, Emoji, Guild, GuildChannel,
    Member, Message, OverwriteKind, PermissionOverwrite, Role, Status, TextChannel, User,
    VoiceChannel, VoiceState,
};
pub use error::DomainError;
pub use events::{DispatchEvent, GatewayEvent, GatewayEventType};
pub use value_objects::{Patch, Permissions, Snowflake, SnowflakeParseError};
