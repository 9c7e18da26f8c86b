//! Session state

use std::fmt;

/// Lifecycle of one shard's connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Opening the transport
    Connecting,
    /// Identify sent, waiting for READY
    Identifying,
    Ready,
    /// Heartbeat went unacknowledged; reconnect pending
    Degraded,
    /// Resume sent, waiting for RESUMED
    Resuming,
}

impl SessionState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Identifying => "identifying",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
            Self::Resuming => "resuming",
        }
    }

    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a resume needs: the session and the last sequence seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeInfo {
    pub session_id: String,
    pub seq: u64,
}

/// Published on every state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardStatus {
    pub state: SessionState,
    /// Failed connection attempts since the last healthy session
    pub reconnect_attempts: u32,
}
