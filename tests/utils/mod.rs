// Not every test binary exercises every helper
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use walkie::{
    AppState, Config, DisabledTranscriber, FrameSink, FrameStream, InboundFrame, OutboundFrame,
    SocketError, Transcriber,
};

// ============================================================================
// Fake transport: channel-backed sink/stream halves standing in for a
// split WebSocket
// ============================================================================

pub struct FakeSink {
    sender: mpsc::UnboundedSender<OutboundFrame>,
}

#[async_trait]
impl FrameSink for FakeSink {
    async fn send_frame(&mut self, frame: OutboundFrame) -> Result<(), SocketError> {
        self.sender
            .send(frame)
            .map_err(|_| SocketError::SendFailed("client gone".to_string()))
    }

    async fn close(&mut self) {}
}

pub struct FakeStream {
    receiver: mpsc::UnboundedReceiver<InboundFrame>,
}

#[async_trait]
impl FrameStream for FakeStream {
    async fn next_frame(&mut self) -> Result<Option<InboundFrame>, SocketError> {
        Ok(self.receiver.recv().await)
    }
}

pub fn fake_transport() -> (
    Box<FakeSink>,
    Box<FakeStream>,
    mpsc::UnboundedSender<InboundFrame>,
    mpsc::UnboundedReceiver<OutboundFrame>,
) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    (
        Box::new(FakeSink {
            sender: outbound_tx,
        }),
        Box::new(FakeStream {
            receiver: inbound_rx,
        }),
        inbound_tx,
        outbound_rx,
    )
}

pub fn test_state() -> AppState {
    AppState::new(Config::default(), Arc::new(DisabledTranscriber))
}

pub fn test_state_with_transcriber(transcriber: Arc<dyn Transcriber>) -> AppState {
    AppState::new(Config::default(), transcriber)
}

// ============================================================================
// Signaling test client driving run_session over the fake transport
// ============================================================================

pub struct TestClient {
    pub uuid: String,
    inbound: Option<mpsc::UnboundedSender<InboundFrame>>,
    outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    _task: JoinHandle<()>,
}

impl TestClient {
    /// Connects a fake client and consumes the identity notification.
    pub async fn connect(state: &AppState) -> Self {
        let (sink, stream, inbound, outbound) = fake_transport();
        let task = tokio::spawn(walkie::run_session(sink, stream, state.clone()));

        let mut client = Self {
            uuid: String::new(),
            inbound: Some(inbound),
            outbound,
            _task: task,
        };
        let identity = client.next_json().await.expect("identity notification");
        assert_eq!(identity["type"], "uuid");
        client.uuid = identity["uuid"].as_str().expect("uuid string").to_string();
        client
    }

    pub fn send(&self, text: &str) {
        self.inbound
            .as_ref()
            .expect("client already disconnected")
            .send(InboundFrame::Text(text.to_string()))
            .expect("session read loop gone");
    }

    /// Simulates read activity without carrying a message (pong traffic).
    pub fn send_keepalive(&self) {
        if let Some(inbound) = &self.inbound {
            let _ = inbound.send(InboundFrame::Keepalive);
        }
    }

    /// Hands out the inbound sender so a background task can keep this
    /// client's read activity going.
    pub fn keepalive_sender(&self) -> mpsc::UnboundedSender<InboundFrame> {
        self.inbound
            .as_ref()
            .expect("client already disconnected")
            .clone()
    }

    /// Closes the client side of the connection.
    pub fn disconnect(&mut self) {
        self.inbound = None;
    }

    /// Next JSON text message from the server, skipping keepalive pings.
    /// Returns `None` once the session's writer has shut down.
    pub async fn next_json(&mut self) -> Option<Value> {
        loop {
            match self.outbound.recv().await? {
                OutboundFrame::Text(text) => {
                    return Some(serde_json::from_str(&text).expect("server sent valid JSON"))
                }
                OutboundFrame::Ping | OutboundFrame::Binary(_) => continue,
            }
        }
    }

    /// Next frame of any kind, pings included.
    pub async fn next_frame(&mut self) -> Option<OutboundFrame> {
        self.outbound.recv().await
    }

    /// Asserts nothing is queued for this client right now.
    pub async fn assert_no_messages(&mut self) {
        tokio::task::yield_now().await;
        assert!(
            self.outbound.try_recv().is_err(),
            "expected no pending messages"
        );
    }
}
