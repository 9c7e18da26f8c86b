//! Connection plumbing
//!
//! Backoff, heartbeat tracking, session state and the transport seam the
//! shard runner drives.

mod backoff;
mod heartbeat;
mod state;
mod transport;

pub use backoff::ExponentialBackoff;
pub use heartbeat::{Beat, Heartbeater};
pub use state::{ResumeInfo, SessionState, ShardStatus};
pub use transport::{Connector, Frame, Transport, WsConnector, WsTransport};

#[cfg(test)]
pub(crate) use transport::mock;
