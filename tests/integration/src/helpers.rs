//! Fake gateway and test helpers
//!
//! [`FakeGateway`] accepts WebSocket connections on an ephemeral port and
//! hands each one to the test as a [`GatewayPeer`], which plays the server
//! side of the protocol by hand.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chat_cache::{Cache, CacheConfig, SharedCache};
use chat_common::{ReconnectSettings, Token};
use chat_gateway::protocol::GatewayMessage;
use chat_gateway::{GatewayResult, Shard, ShardConfig, ShardHandle, WsConnector};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// How long any single wait in a test may take
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Token the scripted client identifies with
pub const TEST_TOKEN: &str = "integration-token";

/// Gateway server that only accepts connections
pub struct FakeGateway {
    url: String,
    connections: mpsc::UnboundedReceiver<GatewayPeer>,
    _accept_loop: JoinHandle<()>,
}

impl FakeGateway {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}", listener.local_addr()?);
        let (tx, connections) = mpsc::unbounded_channel();

        let accept_loop = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                if tx.send(GatewayPeer { ws }).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            url,
            connections,
            _accept_loop: accept_loop,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for the next client connection
    pub async fn accept(&mut self) -> Result<GatewayPeer> {
        tokio::time::timeout(STEP_TIMEOUT, self.connections.recv())
            .await
            .context("no connection within timeout")?
            .context("accept loop stopped")
    }
}

/// Server end of one client connection
pub struct GatewayPeer {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayPeer {
    pub async fn send(&mut self, message: &GatewayMessage) -> Result<()> {
        self.ws.send(Message::Text(message.to_json()?.into())).await?;
        Ok(())
    }

    pub async fn dispatch(&mut self, event: &str, seq: u64, data: Value) -> Result<()> {
        self.send(&GatewayMessage::dispatch(event, seq, data)).await
    }

    /// Next JSON frame from the client
    pub async fn recv(&mut self) -> Result<Value> {
        loop {
            let frame = tokio::time::timeout(STEP_TIMEOUT, self.ws.next())
                .await
                .context("no frame within timeout")?;
            match frame {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Close(frame))) => bail!("client closed: {frame:?}"),
                Some(Ok(_)) => {}
                Some(Err(e)) => bail!("socket error: {e}"),
                None => bail!("client went away"),
            }
        }
    }

    /// Skip frames until one with `op` arrives, returning it
    pub async fn expect_op(&mut self, op: u8) -> Result<Value> {
        loop {
            let frame = self.recv().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Wait for the client to close the socket, returning its close code
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            let frame = tokio::time::timeout(STEP_TIMEOUT, self.ws.next())
                .await
                .context("no close within timeout")?;
            match frame {
                Some(Ok(Message::Close(frame))) => return Ok(frame.map(|f| u16::from(f.code))),
                Some(Ok(_)) => {}
                Some(Err(_)) | None => return Ok(None),
            }
        }
    }

    /// Close with a gateway close code
    pub async fn close(mut self, code: u16) -> Result<()> {
        self.ws
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: "".into(),
            }))
            .await?;
        Ok(())
    }

    /// Hello, then answer the client's identify with READY
    ///
    /// Returns the identify frame.
    pub async fn open_session(&mut self, session_id: &str, guild_ids: &[u64]) -> Result<Value> {
        self.send(&GatewayMessage::hello(crate::fixtures::HEARTBEAT_INTERVAL_MS))
            .await?;
        let identify = self.expect_op(2).await?;
        self.dispatch("READY", 1, crate::fixtures::ready(session_id, guild_ids))
            .await?;
        Ok(identify)
    }
}

/// A shard pointed at the fake gateway, running on its own task
pub struct TestShard {
    pub cache: SharedCache,
    pub handle: ShardHandle,
    pub task: JoinHandle<GatewayResult<()>>,
}

impl TestShard {
    /// Spawn a shard with short, predictable reconnect delays
    pub fn spawn(url: &str) -> Self {
        let cache = Cache::shared(CacheConfig::default());
        let config = ShardConfig::new(url, Token::new(TEST_TOKEN)).with_reconnect(fast_reconnect());
        let (shard, handle) = Shard::new(config, Arc::new(WsConnector), Arc::clone(&cache));
        Self {
            cache,
            handle,
            task: tokio::spawn(shard.run()),
        }
    }

    /// Stop the shard and return how its task ended
    pub async fn stop(self) -> Result<GatewayResult<()>> {
        self.handle.shutdown().await;
        Ok(tokio::time::timeout(STEP_TIMEOUT, self.task).await??)
    }
}

pub fn fast_reconnect() -> ReconnectSettings {
    ReconnectSettings {
        base_delay: Duration::from_millis(50),
        max_delay: Duration::from_millis(200),
        jitter: false,
    }
}

/// Poll until `check` holds
pub async fn eventually(mut check: impl FnMut() -> bool) -> Result<()> {
    let deadline = tokio::time::Instant::now() + STEP_TIMEOUT;
    while !check() {
        if tokio::time::Instant::now() >= deadline {
            bail!("condition not met within {STEP_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}
