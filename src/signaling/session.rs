use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::socket::{FrameSink, OutboundFrame};

#[derive(Error, Debug)]
pub enum EnqueueError {
    /// The session's writer has stopped and its queue is closed
    #[error("outbound queue closed")]
    Closed,
    /// The queue is at capacity; the recipient is too slow to keep up
    #[error("outbound queue full")]
    Full,
    #[error("failed to serialize outbound message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Cheap handle to one session: its identity plus the sending side of its
/// outbound queue. The relay and the keepalive monitor hold clones; only
/// the writer task ever touches the transport.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    uuid: String,
    sender: mpsc::Sender<OutboundFrame>,
}

impl SessionHandle {
    /// Creates a handle and the receiving end of its bounded FIFO queue.
    pub fn channel(uuid: String, capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { uuid, sender }, receiver)
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Enqueues a frame without blocking. A full queue is an error rather
    /// than a wait: delivery is best-effort and a stalled peer must not
    /// stall the sender.
    pub fn enqueue(&self, frame: OutboundFrame) -> Result<(), EnqueueError> {
        self.sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
            mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
        })
    }

    /// Serializes `message` as JSON and enqueues it as a text frame.
    pub fn enqueue_json<T: Serialize>(&self, message: &T) -> Result<(), EnqueueError> {
        let text = serde_json::to_string(message)?;
        self.enqueue(OutboundFrame::Text(text))
    }
}

/// Starts the outbound writer: the single consumer of the session's queue,
/// draining frames strictly in enqueue order and performing one write at a
/// time. On a write failure it stops and closes the transport; dropping the
/// receiver closes the queue so later enqueues fail fast.
pub fn spawn_writer(
    uuid: String,
    mut sink: Box<dyn FrameSink>,
    mut receiver: mpsc::Receiver<OutboundFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = receiver.recv().await {
            if let Err(e) = sink.send_frame(frame).await {
                warn!(uuid = %uuid, error = %e, "Write failed, stopping outbound writer");
                break;
            }
        }
        receiver.close();
        sink.close().await;
        debug!(uuid = %uuid, "Outbound writer stopped");
    })
}
