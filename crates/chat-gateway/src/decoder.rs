//! Event decoder
//!
//! Turns one inbound text frame into a typed [`GatewayEvent`]. Unknown
//! opcodes and unknown dispatch names become [`GatewayEvent::Unhandled`];
//! a known frame with a bad payload is a [`DecodeError`].

use chat_core::events::GatewayEventType;
use chat_core::{DispatchEvent, GatewayEvent};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::protocol::{GatewayMessage, OpCode};

/// A decoded frame and the sequence number it carried
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// `s` from the envelope; only dispatches carry one
    pub seq: Option<u64>,
    pub event: GatewayEvent,
}

/// Stateless frame decoder
pub struct EventDecoder;

impl EventDecoder {
    /// Decode a raw text frame
    pub fn decode(text: &str) -> Result<Decoded, DecodeError> {
        let message = GatewayMessage::from_json(text).map_err(DecodeError::MalformedFrame)?;
        Self::decode_message(message)
    }

    /// Decode an already parsed envelope
    pub fn decode_message(message: GatewayMessage) -> Result<Decoded, DecodeError> {
        let GatewayMessage { op, d, s, t } = message;

        let event = match OpCode::from_u8(op) {
            Some(OpCode::Hello) => GatewayEvent::Hello(payload(op, None, d)?),
            Some(OpCode::Heartbeat) => GatewayEvent::HeartbeatRequest,
            Some(OpCode::HeartbeatAck) => GatewayEvent::HeartbeatAck,
            Some(OpCode::Reconnect) => GatewayEvent::Reconnect,
            Some(OpCode::InvalidSession) => GatewayEvent::InvalidSession {
                resumable: d.as_bool().unwrap_or(false),
            },
            Some(OpCode::Dispatch) => {
                let Some(name) = t else {
                    return Err(DecodeError::MissingField {
                        op,
                        event: None,
                        field: "t".to_string(),
                    });
                };
                match GatewayEventType::from_str(&name) {
                    Some(kind) => GatewayEvent::Dispatch(dispatch(kind, d)?),
                    None => GatewayEvent::Unhandled {
                        op,
                        event: Some(name),
                        data: d,
                    },
                }
            }
            // Client-only opcodes never arrive from a well-behaved server
            _ => GatewayEvent::Unhandled { op, event: t, data: d },
        };

        Ok(Decoded { seq: s, event })
    }
}

fn payload<T: DeserializeOwned>(op: u8, event: Option<&str>, data: Value) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|e| DecodeError::from_serde(op, event, &e))
}

fn dispatch(kind: GatewayEventType, data: Value) -> Result<DispatchEvent, DecodeError> {
    let op = OpCode::Dispatch.as_u8();
    let name = Some(kind.as_str());

    let event = match kind {
        GatewayEventType::Ready => DispatchEvent::Ready(Box::new(payload(op, name, data)?)),
        GatewayEventType::Resumed => DispatchEvent::Resumed,
        GatewayEventType::GuildCreate => {
            DispatchEvent::GuildCreate(Box::new(payload(op, name, data)?))
        }
        GatewayEventType::GuildUpdate => {
            DispatchEvent::GuildUpdate(Box::new(payload(op, name, data)?))
        }
        GatewayEventType::GuildDelete => DispatchEvent::GuildDelete(payload(op, name, data)?),
        GatewayEventType::GuildEmojisUpdate => {
            DispatchEvent::GuildEmojisUpdate(payload(op, name, data)?)
        }
        GatewayEventType::ChannelCreate => DispatchEvent::ChannelCreate(payload(op, name, data)?),
        GatewayEventType::ChannelUpdate => DispatchEvent::ChannelUpdate(payload(op, name, data)?),
        GatewayEventType::ChannelDelete => DispatchEvent::ChannelDelete(payload(op, name, data)?),
        GatewayEventType::GuildMemberAdd => {
            DispatchEvent::MemberAdd(Box::new(payload(op, name, data)?))
        }
        GatewayEventType::GuildMemberUpdate => {
            DispatchEvent::MemberUpdate(Box::new(payload(op, name, data)?))
        }
        GatewayEventType::GuildMemberRemove => {
            DispatchEvent::MemberRemove(payload(op, name, data)?)
        }
        GatewayEventType::GuildMembersChunk => {
            DispatchEvent::MembersChunk(payload(op, name, data)?)
        }
        GatewayEventType::GuildRoleCreate => DispatchEvent::RoleCreate(payload(op, name, data)?),
        GatewayEventType::GuildRoleUpdate => DispatchEvent::RoleUpdate(payload(op, name, data)?),
        GatewayEventType::GuildRoleDelete => DispatchEvent::RoleDelete(payload(op, name, data)?),
        GatewayEventType::VoiceStateUpdate => {
            DispatchEvent::VoiceStateUpdate(payload(op, name, data)?)
        }
        GatewayEventType::PresenceUpdate => {
            DispatchEvent::PresenceUpdate(payload(op, name, data)?)
        }
        GatewayEventType::MessageCreate => {
            DispatchEvent::MessageCreate(Box::new(payload(op, name, data)?))
        }
        GatewayEventType::MessageUpdate => {
            DispatchEvent::MessageUpdate(Box::new(payload(op, name, data)?))
        }
        GatewayEventType::MessageDelete => DispatchEvent::MessageDelete(payload(op, name, data)?),
        GatewayEventType::UserUpdate => DispatchEvent::UserUpdate(payload(op, name, data)?),
    };

    Ok(event)
}
