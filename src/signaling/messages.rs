use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Client-to-server envelopes, discriminated by the `type` field.
///
/// Negotiation messages (`webrtc_*`, `start_call`) carry an opaque payload
/// the server relays unmodified; `#[serde(flatten)]` captures it without
/// the server knowing its shape.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    CloseCall {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    MicOnRemote {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    MicOffRemote {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    VideoOnRemote {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    VideoOffRemote {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    TranscriptText {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(default)]
        text: String,
    },
    WebrtcOffer {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    WebrtcAnswer {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    WebrtcIceCandidate {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    StartCall {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
}

/// Result of the schema check on one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(ClientMessage),
    /// A well-formed envelope with a `type` the server does not know.
    /// Relayed verbatim when it names a room, ignored otherwise.
    Unrecognized {
        kind: String,
        room_id: Option<String>,
        payload: Map<String, Value>,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("envelope is not a JSON object")]
    NotAnObject,
    #[error("envelope has no string `type` field")]
    MissingType,
    #[error("malformed `{kind}` envelope: {source}")]
    Malformed {
        kind: String,
        source: serde_json::Error,
    },
}

const KNOWN_TYPES: &[&str] = &[
    "join",
    "close_call",
    "mic_on_remote",
    "mic_off_remote",
    "video_on_remote",
    "video_off_remote",
    "transcript_text",
    "webrtc_offer",
    "webrtc_answer",
    "webrtc_ice_candidate",
    "start_call",
];

/// Parses one text frame into a typed envelope. Known types must pass the
/// schema check; unknown types come back as `Unrecognized` with their raw
/// payload intact for verbatim relay.
pub fn parse_envelope(text: &str) -> Result<Inbound, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(ParseError::NotAnObject);
    };
    let kind = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingType)?
        .to_string();

    if KNOWN_TYPES.contains(&kind.as_str()) {
        let message = serde_json::from_value(Value::Object(map))
            .map_err(|source| ParseError::Malformed { kind, source })?;
        Ok(Inbound::Message(message))
    } else {
        let room_id = map
            .get("roomId")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Inbound::Unrecognized {
            kind,
            room_id,
            payload: map,
        })
    }
}

/// Server-synthesized messages sent to a single client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Identity notification, first message on every connection
    Uuid { uuid: String },
    RoomCreated {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    RoomJoined {
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

/// Builders for relayed message bodies. The relay attaches the sender's
/// `uuid` before fan-out; these produce everything else.
pub mod relay_payload {
    use super::*;

    pub fn start_call() -> Value {
        json!({ "type": "start_call" })
    }

    pub fn device_status(kind: &str, camera_on: bool, audio_on: bool) -> Value {
        json!({
            "type": kind,
            "cameraOn": camera_on,
            "audioOn": audio_on,
        })
    }

    pub fn transcript(text: &str, camera_on: bool, audio_on: bool) -> Value {
        json!({
            "type": "transcript_text",
            "text": text,
            "cameraOn": camera_on,
            "audioOn": audio_on,
        })
    }

    /// Departure notice sent to the remaining members of a room
    pub fn close_call(room_id: &str) -> Value {
        json!({
            "type": "close_call",
            "roomId": room_id,
        })
    }

    /// Reassembles an opaque negotiation payload with its original type and
    /// room id so it goes out exactly as it came in.
    pub fn verbatim(kind: &str, room_id: &str, payload: &Map<String, Value>) -> Value {
        let mut map = payload.clone();
        map.insert("type".to_string(), json!(kind));
        map.insert("roomId".to_string(), json!(room_id));
        Value::Object(map)
    }
}
