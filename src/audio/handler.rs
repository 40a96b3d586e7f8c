use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::StreamExt;
use tokio::time::{interval, sleep_until, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::shared::AppState;
use crate::signaling::keepalive::spawn_keepalive;
use crate::signaling::session::{spawn_writer, SessionHandle};
use crate::signaling::socket::{FrameSink, FrameStream, InboundFrame};

use super::transcribe::contains_voice;

/// GET /ws-audio — raw audio relay. Binary frames fan out unmodified to
/// every other audio peer; no rooms.
pub async fn audio_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        run_audio_session(Box::new(sink), Box::new(stream), state).await;
    })
}

/// GET /ws-speech — transcript listeners. Write-only from the client's
/// point of view; the read loop just waits for the close.
pub async fn speech_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        run_speech_session(Box::new(sink), Box::new(stream), state).await;
    })
}

pub async fn run_audio_session(
    sink: Box<dyn FrameSink>,
    mut stream: Box<dyn FrameStream>,
    state: AppState,
) {
    let uuid = Uuid::new_v4().to_string();
    info!(uuid = %uuid, "Audio peer connected");

    let (handle, receiver) = SessionHandle::channel(uuid.clone(), state.config.outbound_capacity);
    let writer = spawn_writer(uuid.clone(), sink, receiver);
    state.audio.add_peer(handle.clone());
    let keepalive = spawn_keepalive(handle.clone(), state.config.ping_period());

    // Frames are relayed immediately and buffered for windowed transcription
    let mut buffer: Vec<u8> = Vec::new();
    let mut window = interval(state.config.transcribe_window);
    window.set_missed_tick_behavior(MissedTickBehavior::Delay);
    window.tick().await;

    // Absolute read deadline; the window ticks must not reset it
    let mut deadline = Instant::now() + state.config.idle_timeout;

    loop {
        tokio::select! {
            _ = window.tick() => {
                flush_transcription_window(&state, &mut buffer);
            }
            _ = sleep_until(deadline) => {
                warn!(uuid = %uuid, "No read activity within deadline, closing audio peer");
                break;
            }
            read = stream.next_frame() => {
                deadline = Instant::now() + state.config.idle_timeout;
                match read {
                    Ok(Some(InboundFrame::Binary(bytes))) => {
                        state.audio.broadcast_audio(&uuid, &bytes);
                        buffer.extend_from_slice(&bytes);
                    }
                    Ok(Some(_)) => {}
                    Ok(None) => break,
                    Err(e) => {
                        warn!(uuid = %uuid, error = %e, "Audio read error");
                        break;
                    }
                }
            }
        }
    }

    state.audio.remove_peer(&uuid);
    keepalive.abort();
    drop(handle);
    let _ = writer.await;
    info!(uuid = %uuid, "Audio peer disconnected");
}

/// Hands the buffered window to the transcriber when it passes the voice
/// gate; results go to the transcript listeners. Runs off-task so a slow
/// backend never stalls the relay loop.
fn flush_transcription_window(state: &AppState, buffer: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }
    let chunk = std::mem::take(buffer);
    if !contains_voice(&chunk) {
        debug!("No voice detected in audio window");
        return;
    }

    let transcriber = state.transcriber.clone();
    let audio = state.audio.clone();
    tokio::spawn(async move {
        match transcriber.transcribe(&chunk).await {
            Ok(text) => audio.publish_transcript(&text),
            Err(e) => debug!(error = %e, "Transcription failed"),
        }
    });
}

pub async fn run_speech_session(
    sink: Box<dyn FrameSink>,
    mut stream: Box<dyn FrameStream>,
    state: AppState,
) {
    let uuid = Uuid::new_v4().to_string();
    info!(uuid = %uuid, "Transcript listener connected");

    let (handle, receiver) = SessionHandle::channel(uuid.clone(), state.config.outbound_capacity);
    let writer = spawn_writer(uuid.clone(), sink, receiver);
    state.audio.add_listener(handle.clone());
    let keepalive = spawn_keepalive(handle.clone(), state.config.ping_period());

    loop {
        match timeout(state.config.idle_timeout, stream.next_frame()).await {
            Err(_) => {
                warn!(uuid = %uuid, "No read activity within deadline, closing listener");
                break;
            }
            Ok(Ok(Some(_))) => {}
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                warn!(uuid = %uuid, error = %e, "Listener read error");
                break;
            }
        }
    }

    state.audio.remove_listener(&uuid);
    keepalive.abort();
    drop(handle);
    let _ = writer.await;
    info!(uuid = %uuid, "Transcript listener disconnected");
}
