//! Unit tests for `ChannelHub`.
//!
//! These tests exercise the channel connection registry directly, without
//! performing any HTTP upgrades. They verify subscription semantics, typing
//! presence, fan-out delivery, and graceful shutdown behaviour.

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use reforma_api::ws::hub::{ChannelHub, Principal};
use reforma_core::channel::ChannelMessage;
use tokio::sync::mpsc::UnboundedReceiver;

fn principal(tax_id: &str, name: &str, can_review: bool) -> Principal {
    Principal {
        tax_id: tax_id.to_string(),
        display_name: name.to_string(),
        can_review,
    }
}

fn parse(message: Message) -> ChannelMessage {
    match message {
        Message::Text(text) => serde_json::from_str(&text).expect("valid channel frame"),
        other => panic!("Expected Text frame, got: {other:?}"),
    }
}

async fn recv(rx: &mut UnboundedReceiver<Message>) -> ChannelMessage {
    parse(rx.recv().await.expect("a frame should be delivered"))
}

// ---------------------------------------------------------------------------
// Connection accounting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_hub_has_zero_connections() {
    let hub = ChannelHub::new();
    assert_eq!(hub.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let hub = ChannelHub::new();

    let _rx = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    assert_eq!(hub.connection_count().await, 1);

    hub.remove_connection("conn-1").await;
    assert_eq!(hub.connection_count().await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let hub = ChannelHub::new();

    let _rx = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let changed = hub.remove_connection("nonexistent").await;

    assert!(changed.is_empty());
    assert_eq!(hub.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Subscription fan-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_request_reaches_only_subscribers() {
    let hub = ChannelHub::new();

    let mut rx_sub = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let mut rx_other = hub
        .add_connection("conn-2".to_string(), principal("222", "Rui", true))
        .await;

    hub.subscribe("conn-1", 7).await;
    hub.subscribe("conn-2", 99).await;

    hub.send_to_request(
        7,
        &ChannelMessage::TypingUpdate {
            request_id: 7,
            names: vec!["Ana".to_string()],
        },
    )
    .await;

    let delivered = recv(&mut rx_sub).await;
    assert_eq!(
        delivered,
        ChannelMessage::TypingUpdate {
            request_id: 7,
            names: vec!["Ana".to_string()],
        }
    );

    // The connection subscribed to another request receives nothing.
    assert!(rx_other.try_recv().is_err());
}

#[tokio::test]
async fn multiple_subscribers_all_receive_a_broadcast() {
    let hub = ChannelHub::new();

    let mut rx1 = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let mut rx2 = hub
        .add_connection("conn-2".to_string(), principal("222", "Rui", true))
        .await;

    hub.subscribe("conn-1", 7).await;
    hub.subscribe("conn-2", 7).await;

    let snapshot = ChannelMessage::RequestSnapshot {
        request_id: 7,
        snapshot: serde_json::json!({"status": "approved"}),
    };
    hub.send_to_request(7, &snapshot).await;

    assert_eq!(recv(&mut rx1).await, snapshot);
    assert_eq!(recv(&mut rx2).await, snapshot);
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let hub = ChannelHub::new();

    let mut rx = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    hub.subscribe("conn-1", 7).await;
    hub.unsubscribe("conn-1", 7).await;

    hub.send_to_request(
        7,
        &ChannelMessage::TypingUpdate {
            request_id: 7,
            names: vec![],
        },
    )
    .await;

    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Recipient-addressed delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_recipient_reaches_every_connection_of_that_principal() {
    let hub = ChannelHub::new();

    // Same principal on two devices, plus an unrelated connection.
    let mut rx_a = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let mut rx_b = hub
        .add_connection("conn-2".to_string(), principal("111", "Ana", false))
        .await;
    let mut rx_other = hub
        .add_connection("conn-3".to_string(), principal("222", "Rui", true))
        .await;

    let notification = ChannelMessage::Notification {
        category: "reforma".to_string(),
        title: "Renovation request update".to_string(),
        body: "Request ART-9 is now approved".to_string(),
        link: Some("/reformas?art=ART-9".to_string()),
        request_id: Some(9),
    };
    hub.send_to_recipient("111", &notification).await;

    assert_eq!(recv(&mut rx_a).await, notification);
    assert_eq!(recv(&mut rx_b).await, notification);
    assert!(rx_other.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Typing presence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn typing_requires_a_subscription() {
    let hub = ChannelHub::new();

    let _rx = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;

    assert!(hub.set_typing("conn-1", 7, true).await.is_none());
}

#[tokio::test]
async fn typing_set_and_clear_report_the_updated_names() {
    let hub = ChannelHub::new();

    let _rx1 = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let _rx2 = hub
        .add_connection("conn-2".to_string(), principal("222", "Rui", true))
        .await;
    hub.subscribe("conn-1", 7).await;
    hub.subscribe("conn-2", 7).await;

    let names = hub.set_typing("conn-1", 7, true).await.unwrap();
    assert_eq!(names, vec!["Ana".to_string()]);

    let names = hub.set_typing("conn-2", 7, true).await.unwrap();
    assert_eq!(names, vec!["Ana".to_string(), "Rui".to_string()]);

    let names = hub.set_typing("conn-1", 7, false).await.unwrap();
    assert_eq!(names, vec!["Rui".to_string()]);
}

#[tokio::test]
async fn repeated_typing_set_is_a_noop() {
    let hub = ChannelHub::new();

    let _rx = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    hub.subscribe("conn-1", 7).await;

    assert!(hub.set_typing("conn-1", 7, true).await.is_some());
    assert!(hub.set_typing("conn-1", 7, true).await.is_none());
}

#[tokio::test]
async fn disconnect_clears_typing_and_reports_affected_requests() {
    let hub = ChannelHub::new();

    let _rx1 = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let _rx2 = hub
        .add_connection("conn-2".to_string(), principal("222", "Rui", true))
        .await;
    hub.subscribe("conn-1", 7).await;
    hub.subscribe("conn-2", 7).await;
    hub.set_typing("conn-1", 7, true).await;
    hub.set_typing("conn-2", 7, true).await;

    let changed = hub.remove_connection("conn-1").await;
    assert_eq!(changed, vec![(7, vec!["Rui".to_string()])]);
}

#[tokio::test]
async fn unsubscribe_clears_the_typing_flag() {
    let hub = ChannelHub::new();

    let _rx = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    hub.subscribe("conn-1", 7).await;
    hub.set_typing("conn-1", 7, true).await;

    let names = hub.unsubscribe("conn-1", 7).await.unwrap();
    assert!(names.is_empty());
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let hub = ChannelHub::new();

    let mut rx1 = hub
        .add_connection("conn-1".to_string(), principal("111", "Ana", false))
        .await;
    let mut rx2 = hub
        .add_connection("conn-2".to_string(), principal("222", "Rui", true))
        .await;
    assert_eq!(hub.connection_count().await, 2);

    hub.shutdown_all().await;

    assert_eq!(hub.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert_matches!(msg1, Message::Close(None));

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert_matches!(msg2, Message::Close(None));

    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}
