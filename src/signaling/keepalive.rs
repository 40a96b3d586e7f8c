use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::session::SessionHandle;
use super::socket::OutboundFrame;

/// Starts the keepalive monitor: enqueues a liveness probe every `period`
/// until the session's queue closes. The matching read-inactivity deadline
/// is enforced by the session's read loop, which treats an expired timeout
/// like a read error.
pub fn spawn_keepalive(handle: SessionHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; probes start one period in
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if handle.enqueue(OutboundFrame::Ping).is_err() {
                debug!(uuid = %handle.uuid(), "Outbound queue closed, stopping keepalive");
                break;
            }
        }
    })
}
