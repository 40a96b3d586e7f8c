use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::signaling::session::SessionHandle;
use crate::signaling::socket::OutboundFrame;

/// Room-less audio exchange: every connected audio peer hears every other
/// peer, and transcript listeners receive whatever the transcriber produces.
///
/// Both maps follow the relay's failure policy: a recipient whose queue is
/// closed or full is dropped from the set.
pub struct AudioExchange {
    peers: Mutex<HashMap<String, SessionHandle>>,
    listeners: Mutex<HashMap<String, SessionHandle>>,
}

impl Default for AudioExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioExchange {
    pub fn new() -> Self {
        Self {
            peers: Mutex::new(HashMap::new()),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_peer(&self, handle: SessionHandle) {
        let mut peers = self.peers.lock().unwrap();
        peers.insert(handle.uuid().to_string(), handle);
        debug!(peers = peers.len(), "Audio peer connected");
    }

    pub fn remove_peer(&self, uuid: &str) {
        self.peers.lock().unwrap().remove(uuid);
        debug!(uuid = %uuid, "Audio peer disconnected");
    }

    pub fn add_listener(&self, handle: SessionHandle) {
        let mut listeners = self.listeners.lock().unwrap();
        listeners.insert(handle.uuid().to_string(), handle);
        debug!(listeners = listeners.len(), "Transcript listener connected");
    }

    pub fn remove_listener(&self, uuid: &str) {
        self.listeners.lock().unwrap().remove(uuid);
    }

    /// Fans one binary frame out to every audio peer except the sender.
    pub fn broadcast_audio(&self, sender_uuid: &str, frame: &[u8]) {
        let snapshot: Vec<SessionHandle> = {
            let peers = self.peers.lock().unwrap();
            peers.values().cloned().collect()
        };

        for peer in snapshot {
            if peer.uuid() == sender_uuid {
                continue;
            }
            if let Err(e) = peer.enqueue(OutboundFrame::Binary(frame.to_vec())) {
                warn!(uuid = %peer.uuid(), error = %e, "Audio enqueue failed, dropping peer");
                self.remove_peer(peer.uuid());
            }
        }
    }

    /// Sends a transcription result to every registered listener.
    pub fn publish_transcript(&self, text: &str) {
        let snapshot: Vec<SessionHandle> = {
            let listeners = self.listeners.lock().unwrap();
            listeners.values().cloned().collect()
        };

        for listener in snapshot {
            if let Err(e) = listener.enqueue(OutboundFrame::Text(text.to_string())) {
                warn!(uuid = %listener.uuid(), error = %e, "Transcript enqueue failed, dropping listener");
                self.remove_listener(listener.uuid());
            }
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.lock().unwrap().len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connected_peer(
        exchange: &AudioExchange,
        uuid: &str,
    ) -> mpsc::Receiver<OutboundFrame> {
        let (handle, receiver) = SessionHandle::channel(uuid.to_string(), 8);
        exchange.add_peer(handle);
        receiver
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let exchange = AudioExchange::new();
        let mut rx_a = connected_peer(&exchange, "a");
        let mut rx_b = connected_peer(&exchange, "b");

        exchange.broadcast_audio("a", &[1, 2, 3]);

        assert!(rx_a.try_recv().is_err());
        assert_eq!(
            rx_b.try_recv().unwrap(),
            OutboundFrame::Binary(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_broadcast_prunes_dead_peer() {
        let exchange = AudioExchange::new();
        let _rx_a = connected_peer(&exchange, "a");
        let rx_dead = connected_peer(&exchange, "dead");
        drop(rx_dead);

        exchange.broadcast_audio("a", &[1]);

        assert_eq!(exchange.peer_count(), 1);
    }

    #[test]
    fn test_publish_transcript_reaches_listeners_and_prunes() {
        let exchange = AudioExchange::new();

        let (alive, mut rx_alive) = SessionHandle::channel("alive".to_string(), 8);
        let (dead, rx_dead) = SessionHandle::channel("dead".to_string(), 8);
        exchange.add_listener(alive);
        exchange.add_listener(dead);
        drop(rx_dead);

        exchange.publish_transcript("hola");

        assert_eq!(
            rx_alive.try_recv().unwrap(),
            OutboundFrame::Text("hola".to_string())
        );
        assert_eq!(exchange.listener_count(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let exchange = AudioExchange::new();
        let _rx = connected_peer(&exchange, "a");

        exchange.remove_peer("a");
        exchange.remove_peer("a");
        exchange.remove_listener("never-added");

        assert_eq!(exchange.peer_count(), 0);
    }
}
