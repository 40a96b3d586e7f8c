use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::room::directory::{JoinOutcome, RoomDirectory};
use crate::signaling::messages::{
    parse_envelope, relay_payload, ClientMessage, Inbound, ServerMessage,
};
use crate::signaling::relay::relay;
use crate::signaling::session::SessionHandle;

/// Per-session message dispatcher: the single reader of the session's
/// inbound frames and the only writer of its room/device state.
///
/// Room ids are taken from each payload rather than cached, since several
/// message types re-specify them; `room` only tracks current membership for
/// disconnect cleanup.
pub struct Dispatcher {
    directory: Arc<RoomDirectory>,
    handle: SessionHandle,
    room: Option<String>,
    camera_on: bool,
    audio_on: bool,
}

impl Dispatcher {
    pub fn new(directory: Arc<RoomDirectory>, handle: SessionHandle) -> Self {
        Self {
            directory,
            handle,
            room: None,
            camera_on: false,
            audio_on: false,
        }
    }

    pub fn uuid(&self) -> &str {
        self.handle.uuid()
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn camera_on(&self) -> bool {
        self.camera_on
    }

    pub fn audio_on(&self) -> bool {
        self.audio_on
    }

    /// Routes one inbound text frame. Malformed envelopes are discarded
    /// and logged; the session continues either way.
    pub fn handle_frame(&mut self, text: &str) {
        match parse_envelope(text) {
            Ok(Inbound::Message(message)) => self.dispatch(message),
            Ok(Inbound::Unrecognized {
                kind,
                room_id: Some(room_id),
                payload,
            }) => {
                // Unknown type naming a room: relay verbatim, type unchanged
                self.relay_verbatim(&kind, &room_id, &payload);
            }
            Ok(Inbound::Unrecognized { kind, .. }) => {
                debug!(uuid = %self.uuid(), kind = %kind, "Ignoring unknown message type without room");
            }
            Err(e) => {
                warn!(uuid = %self.uuid(), error = %e, "Discarding unparseable frame");
            }
        }
    }

    fn dispatch(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Join { room_id } => self.handle_join(room_id),
            ClientMessage::CloseCall { room_id } => self.handle_close_call(&room_id),
            ClientMessage::MicOnRemote { room_id } => {
                self.audio_on = true;
                self.relay_device_status(&room_id, "mic_on_remote");
            }
            ClientMessage::MicOffRemote { room_id } => {
                self.audio_on = false;
                self.relay_device_status(&room_id, "mic_off_remote");
            }
            ClientMessage::VideoOnRemote { room_id } => {
                self.camera_on = true;
                self.relay_device_status(&room_id, "video_on_remote");
            }
            ClientMessage::VideoOffRemote { room_id } => {
                self.camera_on = false;
                self.relay_device_status(&room_id, "video_off_remote");
            }
            ClientMessage::TranscriptText { room_id, text } => {
                let body = relay_payload::transcript(&text, self.camera_on, self.audio_on);
                relay(&self.directory, &room_id, body, self.uuid());
            }
            ClientMessage::WebrtcOffer { room_id, payload } => {
                self.relay_verbatim("webrtc_offer", &room_id, &payload);
            }
            ClientMessage::WebrtcAnswer { room_id, payload } => {
                self.relay_verbatim("webrtc_answer", &room_id, &payload);
            }
            ClientMessage::WebrtcIceCandidate { room_id, payload } => {
                self.relay_verbatim("webrtc_ice_candidate", &room_id, &payload);
            }
            ClientMessage::StartCall { room_id, payload } => {
                self.relay_verbatim("start_call", &room_id, &payload);
            }
        }
    }

    fn handle_join(&mut self, room_id: String) {
        // One room at a time: joining a new room implicitly leaves the old
        if let Some(current) = self.room.clone() {
            if current != room_id {
                self.leave_and_notify(&current);
            }
        }

        let outcome = self.directory.join(&room_id, self.handle.clone());
        let notice = match outcome {
            JoinOutcome::Created => ServerMessage::RoomCreated {
                room_id: room_id.clone(),
            },
            JoinOutcome::Joined => ServerMessage::RoomJoined {
                room_id: room_id.clone(),
            },
        };
        if let Err(e) = self.handle.enqueue_json(&notice) {
            warn!(uuid = %self.uuid(), room_id = %room_id, error = %e, "Failed to queue join notice");
        }

        if outcome == JoinOutcome::Joined {
            relay(
                &self.directory,
                &room_id,
                relay_payload::start_call(),
                self.uuid(),
            );
        }

        self.room = Some(room_id);
    }

    fn handle_close_call(&mut self, room_id: &str) {
        self.leave_and_notify(room_id);
        if self.room.as_deref() == Some(room_id) {
            self.room = None;
        }
    }

    /// Cleanup-before-notify: the member is removed first, then the notice
    /// goes to the post-removal snapshot. A departing last member leaves an
    /// already-deleted room and no notice is sent.
    fn leave_and_notify(&self, room_id: &str) {
        self.directory.leave(room_id, self.uuid());
        relay(
            &self.directory,
            room_id,
            relay_payload::close_call(room_id),
            self.uuid(),
        );
    }

    fn relay_device_status(&self, room_id: &str, kind: &str) {
        let body = relay_payload::device_status(kind, self.camera_on, self.audio_on);
        relay(&self.directory, room_id, body, self.uuid());
    }

    fn relay_verbatim(&self, kind: &str, room_id: &str, payload: &Map<String, Value>) {
        let body = relay_payload::verbatim(kind, room_id, payload);
        relay(&self.directory, room_id, body, self.uuid());
    }

    /// Read error, close, or liveness timeout: equivalent to a close_call
    /// for the current room, if any.
    pub fn teardown(&mut self) {
        if let Some(room_id) = self.room.take() {
            debug!(uuid = %self.uuid(), room_id = %room_id, "Session terminating, leaving room");
            self.leave_and_notify(&room_id);
        }
    }
}
