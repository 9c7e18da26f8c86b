//! Typed gateway events
//!
//! [`GatewayEvent`] is everything the decoder can produce from one inbound
//! frame. Dispatch frames carry a [`DispatchEvent`], which is what the cache
//! merges.

use serde_json::Value;

use crate::entities::{User, VoiceState};
use crate::events::payloads::{
    ChannelPayload, GuildEmojisUpdate, GuildPayload, GuildUpdatePayload, Hello, MemberAdd,
    MemberRemove, MemberUpdate, MembersChunk, MessageDelete, MessagePayload,
    MessageUpdatePayload, PresencePayload, Ready, RoleDelete, RoleEvent, UnavailableGuild,
};
use crate::events::GatewayEventType;

/// One decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Connection opened; carries the heartbeat interval
    Hello(Hello),
    /// Server asks for an immediate heartbeat
    HeartbeatRequest,
    HeartbeatAck,
    /// Server asks the client to reconnect and resume
    Reconnect,
    InvalidSession {
        resumable: bool,
    },
    Dispatch(DispatchEvent),
    /// Opcode or event name this client does not know
    Unhandled {
        op: u8,
        event: Option<String>,
        data: Value,
    },
}

impl GatewayEvent {
    /// Name used in logs
    pub fn name(&self) -> &str {
        match self {
            Self::Hello(_) => "HELLO",
            Self::HeartbeatRequest => "HEARTBEAT",
            Self::HeartbeatAck => "HEARTBEAT_ACK",
            Self::Reconnect => "RECONNECT",
            Self::InvalidSession { .. } => "INVALID_SESSION",
            Self::Dispatch(event) => event.kind().as_str(),
            Self::Unhandled { event, .. } => event.as_deref().unwrap_or("UNHANDLED"),
        }
    }
}

/// Dispatch payloads, one variant per [`GatewayEventType`]
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    Ready(Box<Ready>),
    Resumed,
    GuildCreate(Box<GuildPayload>),
    GuildUpdate(Box<GuildUpdatePayload>),
    GuildDelete(UnavailableGuild),
    GuildEmojisUpdate(GuildEmojisUpdate),
    ChannelCreate(ChannelPayload),
    ChannelUpdate(ChannelPayload),
    ChannelDelete(ChannelPayload),
    MemberAdd(Box<MemberAdd>),
    MemberUpdate(Box<MemberUpdate>),
    MemberRemove(MemberRemove),
    MembersChunk(MembersChunk),
    RoleCreate(RoleEvent),
    RoleUpdate(RoleEvent),
    RoleDelete(RoleDelete),
    VoiceStateUpdate(VoiceState),
    PresenceUpdate(PresencePayload),
    MessageCreate(Box<MessagePayload>),
    MessageUpdate(Box<MessageUpdatePayload>),
    MessageDelete(MessageDelete),
    UserUpdate(User),
}

impl DispatchEvent {
    /// Wire event name
    pub const fn kind(&self) -> GatewayEventType {
        match self {
            Self::Ready(_) => GatewayEventType::Ready,
            Self::Resumed => GatewayEventType::Resumed,
            Self::GuildCreate(_) => GatewayEventType::GuildCreate,
            Self::GuildUpdate(_) => GatewayEventType::GuildUpdate,
            Self::GuildDelete(_) => GatewayEventType::GuildDelete,
            Self::GuildEmojisUpdate(_) => GatewayEventType::GuildEmojisUpdate,
            Self::ChannelCreate(_) => GatewayEventType::ChannelCreate,
            Self::ChannelUpdate(_) => GatewayEventType::ChannelUpdate,
            Self::ChannelDelete(_) => GatewayEventType::ChannelDelete,
            Self::MemberAdd(_) => GatewayEventType::GuildMemberAdd,
            Self::MemberUpdate(_) => GatewayEventType::GuildMemberUpdate,
            Self::MemberRemove(_) => GatewayEventType::GuildMemberRemove,
            Self::MembersChunk(_) => GatewayEventType::GuildMembersChunk,
            Self::RoleCreate(_) => GatewayEventType::GuildRoleCreate,
            Self::RoleUpdate(_) => GatewayEventType::GuildRoleUpdate,
            Self::RoleDelete(_) => GatewayEventType::GuildRoleDelete,
            Self::VoiceStateUpdate(_) => GatewayEventType::VoiceStateUpdate,
            Self::PresenceUpdate(_) => GatewayEventType::PresenceUpdate,
            Self::MessageCreate(_) => GatewayEventType::MessageCreate,
            Self::MessageUpdate(_) => GatewayEventType::MessageUpdate,
            Self::MessageDelete(_) => GatewayEventType::MessageDelete,
            Self::UserUpdate(_) => GatewayEventType::UserUpdate,
        }
    }
}
