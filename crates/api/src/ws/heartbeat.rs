//! Periodic ping task that keeps channel connections warm and flushes
//! out dead sockets.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::hub::ChannelHub;

const HEARTBEAT_INTERVAL_SECS: u64 = 30;

pub fn spawn_heartbeat(hub: Arc<ChannelHub>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let count = hub.connection_count().await;
            if count > 0 {
                tracing::debug!(connections = count, "sending heartbeat pings");
                hub.ping_all().await;
            }
        }
    })
}
