//! Gateway events - decoded frames and their payload shapes

mod event_types;
mod gateway_event;
mod payloads;

pub use event_types::GatewayEventType;
pub use gateway_event::{DispatchEvent, GatewayEvent};
pub use payloads::{
    ChannelPayload, GuildEmojisUpdate, GuildPayload, GuildUpdatePayload, Hello, MemberAdd,
    MemberPayload, MemberRemove, MemberUpdate, MembersChunk, MessageDelete, MessagePayload,
    MessageUpdatePayload, PresencePayload, Ready, RoleDelete, RoleEvent, UnavailableGuild,
};
