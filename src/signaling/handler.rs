use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::shared::AppState;

use super::dispatcher::Dispatcher;
use super::keepalive::spawn_keepalive;
use super::messages::ServerMessage;
use super::session::{spawn_writer, SessionHandle};
use super::socket::{FrameSink, FrameStream, InboundFrame};

/// GET /ws — the signaling endpoint. Every connection gets a fresh
/// server-generated identity; there is no authentication.
pub async fn signaling_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.max_message_size(state.config.max_frame_size)
        .on_upgrade(move |socket| async move {
            let (sink, stream) = socket.split();
            run_session(Box::new(sink), Box::new(stream), state).await;
        })
}

/// Runs one signaling session to completion: assigns the identity, starts
/// the outbound writer and keepalive monitor, then reads and dispatches
/// frames until the client closes, a read fails, or the liveness deadline
/// expires. All three endings take the same teardown path.
pub async fn run_session(
    sink: Box<dyn FrameSink>,
    mut stream: Box<dyn FrameStream>,
    state: AppState,
) {
    let uuid = Uuid::new_v4().to_string();
    info!(uuid = %uuid, "Signaling connection established");

    let (handle, receiver) = SessionHandle::channel(uuid.clone(), state.config.outbound_capacity);
    let writer = spawn_writer(uuid.clone(), sink, receiver);

    // The client learns its identity before anything else
    if let Err(e) = handle.enqueue_json(&ServerMessage::Uuid { uuid: uuid.clone() }) {
        warn!(uuid = %uuid, error = %e, "Failed to queue identity notice");
        return;
    }

    let keepalive = spawn_keepalive(handle.clone(), state.config.ping_period());
    let mut dispatcher = Dispatcher::new(state.directory.clone(), handle.clone());

    loop {
        match timeout(state.config.idle_timeout, stream.next_frame()).await {
            Err(_) => {
                warn!(uuid = %uuid, "No read activity within deadline, closing session");
                break;
            }
            Ok(Ok(Some(InboundFrame::Text(text)))) => dispatcher.handle_frame(&text),
            // Ping/pong extends the deadline by arriving; binary frames
            // have no meaning on the signaling socket
            Ok(Ok(Some(_))) => {}
            Ok(Ok(None)) => {
                info!(uuid = %uuid, "Client closed connection");
                break;
            }
            Ok(Err(e)) => {
                warn!(uuid = %uuid, error = %e, "Read error");
                break;
            }
        }
    }

    dispatcher.teardown();
    keepalive.abort();
    drop(dispatcher);
    drop(handle);
    let _ = writer.await;
    info!(uuid = %uuid, "Session terminated");
}
