// Library crate for the walkie signaling relay
// This file exposes the public API for integration tests

pub mod audio;
pub mod config;
pub mod room;
pub mod shared;
pub mod signaling;

// Re-export commonly used types for easier access in tests
pub use audio::{AudioExchange, DisabledTranscriber, TranscribeError, Transcriber};
pub use config::Config;
pub use room::{JoinOutcome, RoomDirectory};
pub use shared::AppState;
pub use signaling::{
    parse_envelope, relay, run_session, ClientMessage, Dispatcher, FrameSink, FrameStream,
    Inbound, InboundFrame, OutboundFrame, ServerMessage, SessionHandle, SocketError,
};
