use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocketError {
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// A frame queued for delivery to one client.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Text(String),
    Binary(Vec<u8>),
    /// Keepalive probe
    Ping,
}

/// A frame read from one client.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    /// Ping/pong traffic; carries no payload we care about but counts as
    /// read activity
    Keepalive,
}

/// Write half of a client transport. The outbound writer task is its single
/// owner, which is what guarantees at most one in-flight write per
/// connection.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_frame(&mut self, frame: OutboundFrame) -> Result<(), SocketError>;

    async fn close(&mut self);
}

/// Read half of a client transport.
#[async_trait]
pub trait FrameStream: Send {
    /// Next inbound frame, or `None` once the client has closed.
    async fn next_frame(&mut self) -> Result<Option<InboundFrame>, SocketError>;
}

#[async_trait]
impl FrameSink for SplitSink<WebSocket, Message> {
    async fn send_frame(&mut self, frame: OutboundFrame) -> Result<(), SocketError> {
        let message = match frame {
            OutboundFrame::Text(text) => Message::Text(text),
            OutboundFrame::Binary(bytes) => Message::Binary(bytes),
            OutboundFrame::Ping => Message::Ping(Vec::new()),
        };
        self.send(message)
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.send(Message::Close(None)).await;
    }
}

#[async_trait]
impl FrameStream for SplitStream<WebSocket> {
    async fn next_frame(&mut self) -> Result<Option<InboundFrame>, SocketError> {
        match self.next().await {
            Some(Ok(Message::Text(text))) => Ok(Some(InboundFrame::Text(text))),
            Some(Ok(Message::Binary(bytes))) => Ok(Some(InboundFrame::Binary(bytes))),
            Some(Ok(Message::Ping(_)) | Ok(Message::Pong(_))) => Ok(Some(InboundFrame::Keepalive)),
            Some(Ok(Message::Close(_))) => Ok(None),
            Some(Err(e)) => Err(SocketError::ReceiveFailed(e.to_string())),
            None => Ok(None),
        }
    }
}
