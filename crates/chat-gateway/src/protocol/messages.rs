//! Gateway message format
//!
//! Every frame in either direction is a JSON envelope:
//! `{"op": <u8>, "d": <payload>, "s": <seq>, "t": <event name>}`.
//! `s` and `t` are only set on dispatches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    IdentifyPayload, OpCode, PresenceUpdatePayload, RequestGuildMembersPayload, ResumePayload,
    VoiceStateCommand,
};

/// Gateway message envelope
///
/// The opcode is kept raw so frames with opcodes this client does not know
/// still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: u8,

    /// Event data payload
    #[serde(default)]
    pub d: Value,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event type (only for op=0 Dispatch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayMessage {
    /// Envelope for a client command
    pub fn command<T: Serialize>(op: OpCode, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: op.as_u8(),
            d: serde_json::to_value(payload)?,
            s: None,
            t: None,
        })
    }

    /// Heartbeat carrying the last sequence number seen (op=1)
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: OpCode::Heartbeat.as_u8(),
            d: last_sequence.map_or(Value::Null, Value::from),
            s: None,
            t: None,
        }
    }

    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Self::command(OpCode::Identify, payload)
    }

    pub fn resume(payload: &ResumePayload) -> Result<Self, serde_json::Error> {
        Self::command(OpCode::Resume, payload)
    }

    pub fn presence_update(payload: &PresenceUpdatePayload) -> Result<Self, serde_json::Error> {
        Self::command(OpCode::PresenceUpdate, payload)
    }

    pub fn request_guild_members(
        payload: &RequestGuildMembersPayload,
    ) -> Result<Self, serde_json::Error> {
        Self::command(OpCode::RequestGuildMembers, payload)
    }

    pub fn voice_state_update(payload: &VoiceStateCommand) -> Result<Self, serde_json::Error> {
        Self::command(OpCode::VoiceStateUpdate, payload)
    }

    // === Server Messages (used by test gateways) ===

    /// Create a Dispatch message (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch.as_u8(),
            d: data,
            s: Some(sequence),
            t: Some(event_type.into()),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(heartbeat_interval_ms: u64) -> Self {
        Self {
            op: OpCode::Hello.as_u8(),
            d: serde_json::json!({ "heartbeat_interval": heartbeat_interval_ms }),
            s: None,
            t: None,
        }
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self {
            op: OpCode::HeartbeatAck.as_u8(),
            d: Value::Null,
            s: None,
            t: None,
        }
    }

    /// Create an Invalid Session message (op=9)
    #[must_use]
    pub fn invalid_session(resumable: bool) -> Self {
        Self {
            op: OpCode::InvalidSession.as_u8(),
            d: Value::Bool(resumable),
            s: None,
            t: None,
        }
    }

    /// Create a Reconnect message (op=7)
    #[must_use]
    pub fn reconnect() -> Self {
        Self {
            op: OpCode::Reconnect.as_u8(),
            d: Value::Null,
            s: None,
            t: None,
        }
    }

    // === Utilities ===

    /// Known opcode, if any
    #[must_use]
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.op)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.t, self.s) {
            (Some(t), Some(s)) => write!(f, "GatewayMessage(op={}, t={t}, s={s})", self.op),
            (Some(t), None) => write!(f, "GatewayMessage(op={}, t={t})", self.op),
            _ => write!(f, "GatewayMessage(op={})", self.op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_carries_sequence() {
        assert_eq!(GatewayMessage::heartbeat(Some(41)).d, Value::from(41));
        assert_eq!(GatewayMessage::heartbeat(None).to_json().unwrap(), r#"{"op":1,"d":null}"#);
    }

    #[test]
    fn test_parse_unknown_opcode() {
        let msg = GatewayMessage::from_json(r#"{"op":42,"d":{"x":1}}"#).unwrap();
        assert_eq!(msg.op, 42);
        assert!(msg.opcode().is_none());
    }

    #[test]
    fn test_parse_dispatch() {
        let msg = GatewayMessage::from_json(r#"{"op":0,"s":7,"t":"RESUMED","d":{}}"#).unwrap();
        assert_eq!(msg.opcode(), Some(OpCode::Dispatch));
        assert_eq!(msg.s, Some(7));
        assert_eq!(msg.t.as_deref(), Some("RESUMED"));
    }

    #[test]
    fn test_missing_payload_defaults_to_null() {
        let msg = GatewayMessage::from_json(r#"{"op":11}"#).unwrap();
        assert_eq!(msg.d, Value::Null);
    }

    #[test]
    fn test_resume_command() {
        let msg = GatewayMessage::resume(&ResumePayload {
            token: "t".into(),
            session_id: "abc".into(),
            seq: 9,
        })
        .unwrap();
        assert_eq!(msg.op, 6);
        assert_eq!(msg.d["seq"], 9);
    }

    #[test]
    fn test_message_display() {
        let dispatch = GatewayMessage::dispatch("MESSAGE_CREATE", 5, serde_json::json!({}));
        let display = dispatch.to_string();
        assert!(display.contains("MESSAGE_CREATE"));
        assert!(display.contains("s=5"));
    }
}
