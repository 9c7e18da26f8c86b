//! Shard runner
//!
//! Drives one gateway connection through its lifecycle:
//!
//! ```text
//! Disconnected -> Connecting -> Identifying -> Ready -> (Degraded) -> Resuming -> Ready
//! ```
//!
//! Frames are decoded and merged into the cache strictly in arrival order on
//! this task. The sequence number only advances after a frame decodes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chat_cache::SharedCache;
use chat_core::{DispatchEvent, GatewayEvent};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use super::config::ShardConfig;
use super::handle::{ShardCommand, ShardHandle};
use crate::connection::{
    Beat, Connector, ExponentialBackoff, Frame, Heartbeater, ResumeInfo, SessionState,
    ShardStatus, Transport,
};
use crate::decoder::EventDecoder;
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{CloseAction, CloseCode, GatewayMessage, IdentifyPayload, ResumePayload};

/// Close code that ends the session for good
const CLOSE_NORMAL: u16 = 1000;
/// Close code that keeps the session resumable
const CLOSE_RESUMABLE: u16 = 4000;
/// Commands buffered between handles and the shard task
const COMMAND_BUFFER: usize = 64;

/// Why a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Shutdown,
    /// Reconnect and resume if a session is held
    Resume,
    /// Session is gone; reconnect and identify from scratch
    Reidentify,
}

/// One gateway connection and its session
pub struct Shard {
    config: ShardConfig,
    connector: Arc<dyn Connector>,
    cache: SharedCache,
    commands: mpsc::Receiver<ShardCommand>,
    status: watch::Sender<ShardStatus>,
    backoff: ExponentialBackoff,
    session_id: Option<String>,
    seq: Option<u64>,
    /// Commands that arrived while the session was not ready
    pending: VecDeque<GatewayMessage>,
}

impl Shard {
    /// Create a shard and the handle that controls it
    ///
    /// The shard stops once every handle is dropped.
    pub fn new(
        config: ShardConfig,
        connector: Arc<dyn Connector>,
        cache: SharedCache,
    ) -> (Self, ShardHandle) {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (status, status_rx) = watch::channel(ShardStatus::default());
        let handle = ShardHandle::new(config.shard_id, command_tx, status_rx, config.outbound);
        let shard = Self {
            backoff: ExponentialBackoff::from(&config.reconnect),
            config,
            connector,
            cache,
            commands,
            status,
            session_id: None,
            seq: None,
            pending: VecDeque::new(),
        };
        (shard, handle)
    }

    /// Session held for resuming, if any
    pub fn resume_info(&self) -> Option<ResumeInfo> {
        Some(ResumeInfo {
            session_id: self.session_id.clone()?,
            seq: self.seq?,
        })
    }

    /// Run until shutdown or a fatal error
    ///
    /// Transport failures are retried forever with backoff. Only fatal close
    /// codes (bad token, bad shard, bad version or intents) end the task
    /// with an error.
    pub async fn run(mut self) -> GatewayResult<()> {
        let shard_id = self.config.shard_id;
        info!(shard_id, shard_count = self.config.shard_count, "Shard starting");

        let result = self.run_connections().await;

        // Nothing keeps these guilds fresh any more
        let stale = self
            .cache
            .mark_unavailable(shard_id, self.config.shard_count);
        self.set_state(SessionState::Disconnected);

        match &result {
            Ok(()) => info!(shard_id, stale, "Shard stopped"),
            Err(e) => error!(
                shard_id,
                error = %e,
                category = e.category().name(),
                "Shard stopped on fatal error"
            ),
        }
        result
    }

    async fn run_connections(&mut self) -> GatewayResult<()> {
        let shard_id = self.config.shard_id;

        loop {
            self.set_state(SessionState::Connecting);
            let outcome = match self.connector.connect(&self.config.url).await {
                Ok(mut transport) => {
                    let outcome = self.session(transport.as_mut()).await;
                    let code = match outcome {
                        Ok(Outcome::Shutdown | Outcome::Reidentify) => CLOSE_NORMAL,
                        _ => CLOSE_RESUMABLE,
                    };
                    transport.close(code).await;
                    outcome
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(Outcome::Shutdown) => return Ok(()),
                Ok(Outcome::Resume) => {}
                Ok(Outcome::Reidentify) => self.invalidate_session(),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(
                    shard_id,
                    error = %e,
                    attempt = self.backoff.attempts() + 1,
                    "Connection lost"
                ),
            }

            let delay = self.backoff.next_delay();
            self.set_state(SessionState::Disconnected);
            debug!(
                shard_id,
                delay_ms = delay.as_millis() as u64,
                resumable = self.resume_info().is_some(),
                "Reconnecting after delay"
            );
            if self.sleep_or_shutdown(delay).await {
                return Ok(());
            }
        }
    }

    /// Drive one open connection until it ends
    async fn session(&mut self, transport: &mut dyn Transport) -> GatewayResult<Outcome> {
        let shard_id = self.config.shard_id;
        let mut heart: Option<Heartbeater> = None;
        let mut ticker: Option<Interval> = None;

        loop {
            tokio::select! {
                () = next_tick(&mut ticker) => {
                    let Some(heart) = heart.as_mut() else { continue };
                    match heart.tick() {
                        Beat::Send => self.send_heartbeat(transport).await?,
                        Beat::Missed => {
                            warn!(
                                shard_id,
                                interval_ms = heart.interval().as_millis() as u64,
                                "Heartbeat not acknowledged; connection is a zombie"
                            );
                            self.set_state(SessionState::Degraded);
                            return Err(GatewayError::HeartbeatTimeout);
                        }
                    }
                }
                frame = transport.recv() => {
                    match frame? {
                        Frame::Text(text) => {
                            if let Some(outcome) = self
                                .handle_text(transport, &text, &mut heart, &mut ticker)
                                .await?
                            {
                                return Ok(outcome);
                            }
                        }
                        Frame::Close(code) => return self.handle_close(code),
                    }
                }
                command = self.commands.recv() => match command {
                    Some(ShardCommand::Send(message)) => {
                        if self.state().is_ready() {
                            self.send(transport, &message).await?;
                        } else {
                            self.pending.push_back(message);
                        }
                    }
                    Some(ShardCommand::Shutdown) | None => {
                        info!(shard_id, "Shutdown requested");
                        return Ok(Outcome::Shutdown);
                    }
                },
            }
        }
    }

    async fn handle_text(
        &mut self,
        transport: &mut dyn Transport,
        text: &str,
        heart: &mut Option<Heartbeater>,
        ticker: &mut Option<Interval>,
    ) -> GatewayResult<Option<Outcome>> {
        let shard_id = self.config.shard_id;
        trace!(shard_id, len = text.len(), "Frame received");

        let decoded = match EventDecoder::decode(text) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(shard_id, error = %e, "Skipping undecodable frame");
                return Ok(None);
            }
        };
        if let Some(seq) = decoded.seq {
            self.seq = Some(seq);
        }

        match decoded.event {
            GatewayEvent::Hello(hello) => {
                let interval = Duration::from_millis(hello.heartbeat_interval.max(1));
                debug!(shard_id, interval_ms = hello.heartbeat_interval, "Hello received");
                *heart = Some(Heartbeater::new(interval));
                let mut timer = tokio::time::interval_at(Instant::now() + interval, interval);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *ticker = Some(timer);
                self.handshake(transport).await?;
            }
            GatewayEvent::HeartbeatRequest => {
                trace!(shard_id, "Server requested a heartbeat");
                self.send_heartbeat(transport).await?;
            }
            GatewayEvent::HeartbeatAck => {
                if let Some(heart) = heart.as_mut() {
                    heart.ack();
                    trace!(shard_id, latency = ?heart.latency(), "Heartbeat acknowledged");
                }
            }
            GatewayEvent::Reconnect => {
                info!(shard_id, "Server requested reconnect");
                return Ok(Some(Outcome::Resume));
            }
            GatewayEvent::InvalidSession { resumable: true } => {
                info!(shard_id, "Session invalidated but resumable");
                return Ok(Some(Outcome::Resume));
            }
            GatewayEvent::InvalidSession { resumable: false } => {
                warn!(shard_id, "Session invalidated; starting a fresh one");
                self.invalidate_session();
                let delay = self.backoff.invalid_session_delay();
                if self.sleep_or_shutdown(delay).await {
                    return Ok(Some(Outcome::Shutdown));
                }
                if let Some(timer) = ticker.as_mut() {
                    timer.reset();
                }
                self.identify(transport).await?;
            }
            GatewayEvent::Dispatch(event) => self.dispatch(transport, event).await?,
            GatewayEvent::Unhandled { op, event, .. } => {
                debug!(shard_id, op, event = ?event, "Unhandled gateway event");
            }
        }

        Ok(None)
    }

    async fn dispatch(
        &mut self,
        transport: &mut dyn Transport,
        event: DispatchEvent,
    ) -> GatewayResult<()> {
        let shard_id = self.config.shard_id;
        match &event {
            DispatchEvent::Ready(ready) => {
                self.session_id = Some(ready.session_id.clone());
                info!(
                    shard_id,
                    session_id = %ready.session_id,
                    guilds = ready.guilds.len(),
                    "Session ready"
                );
                self.became_ready(transport).await?;
            }
            DispatchEvent::Resumed => {
                info!(shard_id, seq = ?self.seq, "Session resumed");
                self.became_ready(transport).await?;
            }
            _ => {}
        }
        self.cache.apply(event);
        Ok(())
    }

    async fn became_ready(&mut self, transport: &mut dyn Transport) -> GatewayResult<()> {
        self.backoff.reset();
        self.set_state(SessionState::Ready);
        while let Some(message) = self.pending.pop_front() {
            self.send(transport, &message).await?;
        }
        Ok(())
    }

    fn handle_close(&mut self, code: Option<u16>) -> GatewayResult<Outcome> {
        let shard_id = self.config.shard_id;
        let known = code.and_then(CloseCode::from_u16);
        let reason = known.map(CloseCode::description);

        match (CloseCode::action_for(code), known) {
            (CloseAction::Fatal, Some(close)) => Err(GatewayError::FatalClose(close)),
            (CloseAction::Reidentify, _) => {
                warn!(shard_id, code = ?code, reason, "Session cannot be resumed");
                Ok(Outcome::Reidentify)
            }
            _ => {
                warn!(shard_id, code = ?code, reason, "Connection closed by gateway");
                Ok(Outcome::Resume)
            }
        }
    }

    /// Resume if a session is held, otherwise identify
    async fn handshake(&mut self, transport: &mut dyn Transport) -> GatewayResult<()> {
        let Some(info) = self.resume_info() else {
            return self.identify(transport).await;
        };

        self.set_state(SessionState::Resuming);
        info!(
            shard_id = self.config.shard_id,
            session_id = %info.session_id,
            seq = info.seq,
            "Resuming session"
        );
        let resume = GatewayMessage::resume(&ResumePayload {
            token: self.config.token.expose().to_string(),
            session_id: info.session_id,
            seq: info.seq,
        })?;
        self.send(transport, &resume).await
    }

    async fn identify(&mut self, transport: &mut dyn Transport) -> GatewayResult<()> {
        self.set_state(SessionState::Identifying);
        info!(
            shard_id = self.config.shard_id,
            shard_count = self.config.shard_count,
            "Identifying"
        );
        let mut payload = IdentifyPayload::new(
            self.config.token.expose(),
            [self.config.shard_id, self.config.shard_count],
            self.config.large_threshold,
        );
        if let Some(presence) = &self.config.presence {
            payload = payload.with_presence(presence.clone());
        }
        self.send(transport, &GatewayMessage::identify(&payload)?).await
    }

    /// Drop the session and every guild this shard owns
    fn invalidate_session(&mut self) {
        self.session_id = None;
        self.seq = None;
        let purged = self
            .cache
            .purge_shard(self.config.shard_id, self.config.shard_count);
        info!(shard_id = self.config.shard_id, purged, "Discarded cached guilds");
    }

    async fn send_heartbeat(&mut self, transport: &mut dyn Transport) -> GatewayResult<()> {
        trace!(shard_id = self.config.shard_id, seq = ?self.seq, "Sending heartbeat");
        self.send(transport, &GatewayMessage::heartbeat(self.seq)).await
    }

    async fn send(
        &self,
        transport: &mut dyn Transport,
        message: &GatewayMessage,
    ) -> GatewayResult<()> {
        transport.send(message.to_json()?).await
    }

    /// Sleep, buffering commands; `true` if shutdown was requested meanwhile
    async fn sleep_or_shutdown(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => return false,
                command = self.commands.recv() => match command {
                    Some(ShardCommand::Send(message)) => self.pending.push_back(message),
                    Some(ShardCommand::Shutdown) | None => return true,
                },
            }
        }
    }

    fn state(&self) -> SessionState {
        self.status.borrow().state
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.status.send_replace(ShardStatus {
            state,
            reconnect_attempts: self.backoff.attempts(),
        });
        if previous.state != state {
            debug!(shard_id = self.config.shard_id, from = %previous.state, to = %state, "Session state");
        }
    }
}

/// Next heartbeat tick, or never before HELLO
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use chat_cache::{Cache, CacheConfig};
    use chat_common::{ReconnectSettings, Token};
    use chat_core::Snowflake;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::connection::mock::{MockConnector, Peer};

    const INTERVAL_MS: u64 = 40_000;

    fn config() -> ShardConfig {
        ShardConfig::new("wss://gateway.test", Token::new("secret")).with_reconnect(
            ReconnectSettings {
                base_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(32),
                jitter: false,
            },
        )
    }

    struct Fixture {
        handle: ShardHandle,
        peers: UnboundedReceiver<Peer>,
        cache: SharedCache,
        task: tokio::task::JoinHandle<GatewayResult<()>>,
    }

    fn start(connector: MockConnector, peers: UnboundedReceiver<Peer>) -> Fixture {
        let cache = Cache::shared(CacheConfig::default());
        let (shard, handle) = Shard::new(config(), Arc::new(connector), cache.clone());
        Fixture {
            handle,
            peers,
            cache,
            task: tokio::spawn(shard.run()),
        }
    }

    fn ready(seq: u64) -> Value {
        json!({
            "op": 0, "s": seq, "t": "READY",
            "d": {
                "v": 6,
                "user": {"id": "1", "username": "bot", "discriminator": "0001"},
                "guilds": [{"id": "100", "unavailable": true}],
                "session_id": "sess-1"
            }
        })
    }

    fn guild_create(seq: u64) -> Value {
        json!({
            "op": 0, "s": seq, "t": "GUILD_CREATE",
            "d": {
                "id": "100", "name": "rust", "owner_id": "1", "member_count": 1,
                "roles": [{"id": "100", "name": "@everyone", "position": 0, "permissions": 0}],
                "channels": [], "members": []
            }
        })
    }

    fn hello() -> Value {
        json!({"op": 10, "d": {"heartbeat_interval": INTERVAL_MS}})
    }

    /// Accept a connection, send HELLO and return the handshake frame
    async fn open(fixture: &mut Fixture) -> (Peer, Value) {
        let mut peer = fixture.peers.recv().await.unwrap();
        peer.send_json(&hello());
        let handshake = peer.next_json().await.unwrap();
        (peer, handshake)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_identify_then_ready() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);

        let (peer, identify) = open(&mut fixture).await;
        assert_eq!(identify["op"], 2);
        assert_eq!(identify["d"]["token"], "secret");
        assert_eq!(identify["d"]["shard"], json!([0, 1]));
        assert_eq!(fixture.handle.status().state, SessionState::Identifying);

        peer.send_json(&ready(1));
        peer.send_json(&guild_create(2));
        settle().await;

        assert_eq!(fixture.handle.status().state, SessionState::Ready);
        assert_eq!(fixture.cache.guild(Snowflake::new(100)).unwrap().name, "rust");
        assert_eq!(fixture.cache.current_user().unwrap().username, "bot");

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_carries_last_sequence() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (mut peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        peer.send_json(&guild_create(2));

        let heartbeat = peer.expect_op(1).await;
        assert_eq!(heartbeat["d"], 2);
        peer.send_json(&json!({"op": 11}));

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_heartbeat_request_is_answered() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (mut peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(7));
        peer.send_json(&json!({"op": 1, "d": null}));
        let heartbeat = peer.next_json().await.unwrap();
        assert_eq!(heartbeat, json!({"op": 1, "d": 7}));

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_frame_does_not_advance_sequence() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (mut peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        // Member remove without the user
        peer.send_json(&json!({"op": 0, "s": 2, "t": "GUILD_MEMBER_REMOVE", "d": {"guild_id": "100"}}));
        peer.send_json(&json!({"op": 1, "d": null}));

        let heartbeat = peer.next_json().await.unwrap();
        assert_eq!(heartbeat["d"], 1);
        assert_eq!(fixture.handle.status().state, SessionState::Ready);

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_resumes_and_keeps_cache() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        peer.send_json(&guild_create(2));
        settle().await;
        drop(peer);

        let (peer, resume) = open(&mut fixture).await;
        assert_eq!(resume["op"], 6);
        assert_eq!(resume["d"]["session_id"], "sess-1");
        assert_eq!(resume["d"]["seq"], 2);
        assert_eq!(fixture.handle.status().state, SessionState::Resuming);

        peer.send_json(&json!({"op": 0, "s": 3, "t": "RESUMED", "d": {}}));
        settle().await;
        assert_eq!(fixture.handle.status().state, SessionState::Ready);
        assert!(fixture.cache.guild(Snowflake::new(100)).is_some());

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ack_reconnects_and_resumes() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (mut peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        peer.expect_op(1).await;
        // No ack: the next tick finds the heartbeat outstanding

        let (_peer, resume) = open(&mut fixture).await;
        assert_eq!(resume["op"], 6);
        assert_eq!(resume["d"]["seq"], 1);

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
        drop(peer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_session_purges_and_reidentifies() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        peer.send_json(&guild_create(2));
        settle().await;
        drop(peer);

        let (mut peer, resume) = open(&mut fixture).await;
        assert_eq!(resume["op"], 6);
        peer.send_json(&json!({"op": 9, "d": false}));

        let identify = peer.expect_op(2).await;
        assert_eq!(identify["d"]["token"], "secret");
        assert_eq!(fixture.cache.guild_count(), 0);
        assert!(fixture.cache.guild(Snowflake::new(100)).is_none());

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_timeout_close_reidentifies() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        settle().await;
        peer.close(4009);

        let (_peer, handshake) = open(&mut fixture).await;
        assert_eq!(handshake["op"], 2);

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_recoverable_closes_resume() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (peer, _identify) = open(&mut fixture).await;

        peer.send_json(&ready(1));
        settle().await;
        // Gateway rate limit
        peer.close(4008);

        let (peer, handshake) = open(&mut fixture).await;
        assert_eq!(handshake["op"], 6);
        peer.send_json(&json!({"op": 0, "s": 2, "t": "RESUMED", "d": {}}));
        settle().await;
        // Not a gateway code at all
        peer.close(1011);

        let (_peer, handshake) = open(&mut fixture).await;
        assert_eq!(handshake["op"], 6);
        assert_eq!(handshake["d"]["seq"], 2);

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_is_fatal() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (peer, _identify) = open(&mut fixture).await;

        peer.close(4004);
        let err = fixture.task.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::FatalClose(CloseCode::AuthenticationFailed)
        ));
        assert!(fixture.handle.wait_until_ready().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_failures_back_off() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector.refusing(5), peers);

        let started = Instant::now();
        let _ = open(&mut fixture).await;
        // 1 + 2 + 4 + 8 + 16 seconds of backoff before the sixth attempt
        assert_eq!(started.elapsed().as_secs(), 31);

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_flow_once_ready() {
        let (connector, peers) = MockConnector::new();
        let mut fixture = start(connector, peers);
        let (mut peer, _identify) = open(&mut fixture).await;

        let sender = tokio::spawn({
            let handle = fixture.handle.clone();
            async move {
                handle
                    .request_guild_members(&crate::protocol::RequestGuildMembersPayload::all(
                        vec![Snowflake::new(100)],
                    ))
                    .await
            }
        });

        peer.send_json(&ready(1));
        sender.await.unwrap().unwrap();

        let request = peer.expect_op(8).await;
        assert_eq!(request["d"]["guild_id"], json!(["100"]));

        fixture.handle.shutdown().await;
        fixture.task.await.unwrap().unwrap();
    }
}
