use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::room::directory::RoomDirectory;
use crate::signaling::socket::OutboundFrame;

/// Fans `message` out to every member of the room except the sender, with
/// the sender's identity attached as `uuid`.
///
/// Delivery is best-effort: a member whose queue is closed or full is
/// treated as dead, pruned from the room, and skipped. The sender and the
/// other recipients are unaffected. Per-recipient ordering is preserved by
/// each recipient's single-consumer queue; no ordering holds across
/// recipients.
pub fn relay(directory: &RoomDirectory, room_id: &str, mut message: Value, sender_uuid: &str) {
    if let Some(body) = message.as_object_mut() {
        body.insert("uuid".to_string(), json!(sender_uuid));
    }
    let text = message.to_string();

    for member in directory.members(room_id) {
        if member.uuid() == sender_uuid {
            continue;
        }
        if let Err(e) = member.enqueue(OutboundFrame::Text(text.clone())) {
            warn!(
                room_id = %room_id,
                uuid = %member.uuid(),
                error = %e,
                "Relay enqueue failed, pruning member"
            );
            directory.leave(room_id, member.uuid());
        }
    }

    debug!(room_id = %room_id, uuid = %sender_uuid, "Relayed message to room");
}
