//! Gateway protocol definitions
//!
//! Defines the WebSocket protocol including op codes, message formats, and close codes.

mod close_codes;
mod commands;
mod messages;
mod opcodes;

pub use close_codes::{CloseAction, CloseCode};
pub use commands::{
    IdentifyPayload, IdentifyProperties, PresenceUpdatePayload, RequestGuildMembersPayload,
    ResumePayload, VoiceStateCommand,
};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
