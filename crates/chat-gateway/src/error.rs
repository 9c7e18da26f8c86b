//! Gateway error types

use std::time::Duration;

use chat_common::ErrorCategory;
use thiserror::Error;

use crate::protocol::CloseCode;

/// A frame that could not be turned into a typed event
///
/// Decode failures are per-event: the shard logs and skips the frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not a gateway envelope at all
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    /// Known opcode whose payload lacks a required field
    #[error("Missing field `{field}` in op {op}{}", event_suffix(.event.as_deref()))]
    MissingField {
        op: u8,
        event: Option<String>,
        field: String,
    },

    /// Known opcode whose payload has the wrong shape
    #[error("Invalid payload for op {op}{}: {reason}", event_suffix(.event.as_deref()))]
    InvalidPayload {
        op: u8,
        event: Option<String>,
        reason: String,
    },
}

fn event_suffix(event: Option<&str>) -> String {
    event.map(|e| format!(" ({e})")).unwrap_or_default()
}

impl DecodeError {
    /// Build from a serde failure, pulling out the field name when serde reports one
    pub fn from_serde(op: u8, event: Option<&str>, err: &serde_json::Error) -> Self {
        let message = err.to_string();
        let event = event.map(String::from);
        match missing_field(&message) {
            Some(field) => Self::MissingField {
                op,
                event,
                field: field.to_string(),
            },
            None => Self::InvalidPayload {
                op,
                event,
                reason: message,
            },
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::Decode
    }
}

/// Extract `x` from serde's "missing field `x`" message
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport could not be opened or broke mid-session
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server closed with a code that retrying cannot fix
    #[error("Gateway closed the connection: {0}")]
    FatalClose(CloseCode),

    /// Heartbeat was not acknowledged before the next one was due
    #[error("Heartbeat not acknowledged")]
    HeartbeatTimeout,

    /// Server rejected the session
    #[error("Session invalidated")]
    SessionInvalidated,

    /// Frame could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Outbound command could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Outbound command gave up while the shard was reconnecting
    #[error("Shard not connected after {attempts} reconnect attempts")]
    NotConnected { attempts: u32 },

    /// Outbound command waited too long for the shard to reconnect
    #[error("Shard did not reconnect within {0:?}")]
    ReconnectTimeout(Duration),

    /// Shard task has stopped
    #[error("Shard {0} is shut down")]
    ShardClosed(u32),

    /// No shard with this ID is running
    #[error("Unknown shard {0}")]
    UnknownShard(u32),
}

impl GatewayError {
    /// Map onto the shared error taxonomy
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_)
            | Self::HeartbeatTimeout
            | Self::NotConnected { .. }
            | Self::ReconnectTimeout(_) => ErrorCategory::Transport,
            Self::FatalClose(CloseCode::AuthenticationFailed) => ErrorCategory::Auth,
            Self::FatalClose(_) | Self::UnknownShard(_) => ErrorCategory::Config,
            Self::SessionInvalidated => ErrorCategory::SessionInvalidated,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::Encode(_) | Self::ShardClosed(_) => ErrorCategory::Other,
        }
    }

    /// Check if this error stops the shard for good
    pub const fn is_fatal(&self) -> bool {
        self.category().is_fatal()
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
