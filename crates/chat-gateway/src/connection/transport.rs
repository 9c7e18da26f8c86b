//! Transport abstraction
//!
//! The session only needs to send text, receive text or a close, and close.
//! [`WsConnector`] provides that over tokio-tungstenite; tests plug in an
//! in-memory transport.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{GatewayError, GatewayResult};

/// Inbound frame as the session sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    /// Server closed the connection, or the stream ended (`None`)
    Close(Option<u16>),
}

/// One open connection
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: String) -> GatewayResult<()>;

    /// Next text or close frame; must be cancel safe
    async fn recv(&mut self) -> GatewayResult<Frame>;

    /// Close with the given code
    async fn close(&mut self, code: u16);
}

/// Opens connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> GatewayResult<Box<dyn Transport>>;
}

// ============================================================================
// WebSocket
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects over WebSocket (TLS via rustls)
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> GatewayResult<Box<dyn Transport>> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| GatewayError::Transport(format!("connect to {url} failed: {e}")))?;
        tracing::debug!(url = %url, "WebSocket connected");
        Ok(Box::new(WsTransport { stream }))
    }
}

/// An open WebSocket
pub struct WsTransport {
    stream: WsStream,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> GatewayResult<()> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> GatewayResult<Frame> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Frame::Text(text.to_string())),
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Frame::Close(frame.map(|f| u16::from(f.code))));
                }
                Some(Ok(Message::Binary(data))) => {
                    // Compressed payloads are never requested
                    tracing::debug!(len = data.len(), "Ignoring binary frame");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(GatewayError::Transport(e.to_string())),
                None => return Ok(Frame::Close(None)),
            }
        }
    }

    async fn close(&mut self, code: u16) {
        let frame = CloseFrame {
            code: WsCloseCode::from(code),
            reason: "".into(),
        };
        if let Err(e) = self.stream.close(Some(frame)).await {
            tracing::trace!(error = %e, "Close handshake failed");
        }
    }
}

// ============================================================================
// In-memory transport for tests
// ============================================================================
