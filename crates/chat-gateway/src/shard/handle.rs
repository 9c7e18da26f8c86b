//! Shard handle
//!
//! The application side of a running shard: status, outbound commands and
//! shutdown. Cheap to clone.

use std::num::NonZeroU32;
use std::sync::Arc;

use chat_common::OutboundPolicy;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::connection::ShardStatus;
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{
    GatewayMessage, OpCode, PresenceUpdatePayload, RequestGuildMembersPayload, VoiceStateCommand,
};

/// Commands the gateway accepts per minute, leaving room for heartbeats
const COMMANDS_PER_MINUTE: u32 = 110;

/// Sent from handles to the shard task
#[derive(Debug)]
pub enum ShardCommand {
    Send(GatewayMessage),
    Shutdown,
}

/// Handle to one running shard
#[derive(Clone)]
pub struct ShardHandle {
    shard_id: u32,
    commands: mpsc::Sender<ShardCommand>,
    status: watch::Receiver<ShardStatus>,
    limiter: Arc<DefaultDirectRateLimiter>,
    policy: OutboundPolicy,
}

impl ShardHandle {
    pub(crate) fn new(
        shard_id: u32,
        commands: mpsc::Sender<ShardCommand>,
        status: watch::Receiver<ShardStatus>,
        policy: OutboundPolicy,
    ) -> Self {
        let per_minute = NonZeroU32::new(COMMANDS_PER_MINUTE).unwrap_or(NonZeroU32::MIN);
        Self {
            shard_id,
            commands,
            status,
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            policy,
        }
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Current status snapshot
    pub fn status(&self) -> ShardStatus {
        *self.status.borrow()
    }

    /// Receiver that sees every status change
    pub fn watch_status(&self) -> watch::Receiver<ShardStatus> {
        self.status.clone()
    }

    /// Wait for a ready session, honouring the outbound policy
    ///
    /// # Errors
    /// `ReconnectTimeout` or `NotConnected` depending on the policy, or
    /// `ShardClosed` once the shard task has stopped.
    pub async fn wait_until_ready(&self) -> GatewayResult<()> {
        let mut status = self.status.clone();
        match self.policy {
            OutboundPolicy::WaitForReconnect { timeout } => {
                let ready = async { status.wait_for(|s| s.state.is_ready()).await.map(|_| ()) };
                tokio::time::timeout(timeout, ready)
                    .await
                    .map_err(|_| GatewayError::ReconnectTimeout(timeout))?
                    .map_err(|_| GatewayError::ShardClosed(self.shard_id))
            }
            OutboundPolicy::FailAfter { attempts } => loop {
                let current = *status.borrow_and_update();
                if current.state.is_ready() {
                    return Ok(());
                }
                if current.reconnect_attempts >= attempts {
                    return Err(GatewayError::NotConnected { attempts });
                }
                status
                    .changed()
                    .await
                    .map_err(|_| GatewayError::ShardClosed(self.shard_id))?;
            },
        }
    }

    /// Send a raw command once the session is ready
    ///
    /// Rate-limited opcodes wait for a slot in the per-shard budget.
    pub async fn send(&self, message: GatewayMessage) -> GatewayResult<()> {
        self.wait_until_ready().await?;
        if message.opcode().is_some_and(OpCode::is_rate_limited) {
            self.limiter.until_ready().await;
        }
        tracing::debug!(shard_id = self.shard_id, op = message.op, "Queueing command");
        self.commands
            .send(ShardCommand::Send(message))
            .await
            .map_err(|_| GatewayError::ShardClosed(self.shard_id))
    }

    async fn command<T: Serialize>(&self, op: OpCode, payload: &T) -> GatewayResult<()> {
        self.send(GatewayMessage::command(op, payload)?).await
    }

    pub async fn update_presence(&self, presence: &PresenceUpdatePayload) -> GatewayResult<()> {
        self.command(OpCode::PresenceUpdate, presence).await
    }

    /// Ask for member lists; answered with `GUILD_MEMBERS_CHUNK` dispatches
    pub async fn request_guild_members(
        &self,
        request: &RequestGuildMembersPayload,
    ) -> GatewayResult<()> {
        self.command(OpCode::RequestGuildMembers, request).await
    }

    /// Join, move or leave a voice channel
    pub async fn update_voice_state(&self, command: &VoiceStateCommand) -> GatewayResult<()> {
        self.command(OpCode::VoiceStateUpdate, command).await
    }

    /// Ask the shard to close its connection and stop
    pub async fn shutdown(&self) {
        if self.commands.send(ShardCommand::Shutdown).await.is_err() {
            tracing::debug!(shard_id = self.shard_id, "Shard already stopped");
        }
    }
}

impl std::fmt::Debug for ShardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardHandle")
            .field("shard_id", &self.shard_id)
            .field("status", &self.status())
            .field("policy", &self.policy)
            .finish()
    }
}
