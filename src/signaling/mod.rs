// Public API
pub use dispatcher::Dispatcher;
pub use handler::{run_session, signaling_handler};
pub use messages::{parse_envelope, ClientMessage, Inbound, ParseError, ServerMessage};
pub use relay::relay;
pub use session::{spawn_writer, EnqueueError, SessionHandle};
pub use socket::{FrameSink, FrameStream, InboundFrame, OutboundFrame, SocketError};

// Internal modules
pub mod dispatcher;
pub mod handler;
pub mod keepalive;
pub mod messages;
pub mod relay;
pub mod session;
pub mod socket;
