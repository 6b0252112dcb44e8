//! WebSocket collaboration channel.
//!
//! A single socket per principal carries per-request subscriptions, typing
//! presence, fresh-state snapshots after every mutation, and in-app
//! notification delivery.

pub mod handler;
pub mod heartbeat;
pub mod hub;

use std::sync::Arc;

use reforma_core::channel::ChannelMessage;
use reforma_db::repositories::RequestRepo;
use reforma_db::DbPool;

pub use self::hub::ChannelHub;

/// Load the full aggregate for a request and push it to every subscriber.
///
/// Called after every mutation that changes observable request state.
/// Failures are logged and swallowed; a missed snapshot never fails the
/// originating HTTP request.
pub async fn broadcast_snapshot(pool: &DbPool, hub: &Arc<ChannelHub>, request_id: i64) {
    let aggregate = match RequestRepo::load_aggregate(pool, request_id).await {
        Ok(Some(aggregate)) => aggregate,
        Ok(None) => {
            tracing::warn!(request_id, "request vanished before snapshot broadcast");
            return;
        }
        Err(e) => {
            tracing::warn!(request_id, error = %e, "failed to load snapshot for broadcast");
            return;
        }
    };

    let snapshot = match serde_json::to_value(&aggregate) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(request_id, error = %e, "failed to serialize snapshot");
            return;
        }
    };

    hub.send_to_request(
        request_id,
        &ChannelMessage::RequestSnapshot {
            request_id,
            snapshot,
        },
    )
    .await;
}
