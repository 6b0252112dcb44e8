//! WebSocket upgrade handler and per-connection message loop.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use reforma_core::channel::ChannelMessage;
use reforma_db::repositories::RequestRepo;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::hub::Principal;

/// `GET /api/v1/ws` -- upgrade to the collaboration channel.
///
/// Authentication happens before the upgrade; an unauthenticated request
/// never becomes a socket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    auth: AuthUser,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let can_review = auth.can_review();
    let principal = Principal {
        tax_id: auth.tax_id,
        display_name: auth.display_name,
        can_review,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, principal, state))
}

async fn handle_socket(socket: WebSocket, principal: Principal, state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    tracing::info!(
        connection_id,
        tax_id = %principal.tax_id,
        "channel connection established"
    );

    let mut rx = state
        .hub
        .add_connection(connection_id.clone(), principal.clone())
        .await;

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer task: drains the hub's outbound queue into the socket.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let is_close = matches!(message, Message::Close(_));
            if ws_tx.send(message).await.is_err() {
                break;
            }
            if is_close {
                break;
            }
        }
    });

    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                handle_text(&connection_id, &principal, &state, &text).await;
            }
            Message::Close(_) => break,
            // Pongs and pings need no handling; axum answers pings itself.
            _ => {}
        }
    }

    let changed = state.hub.remove_connection(&connection_id).await;
    for (request_id, names) in changed {
        state
            .hub
            .send_to_request(request_id, &ChannelMessage::TypingUpdate { request_id, names })
            .await;
    }
    writer.abort();
    tracing::info!(connection_id, "channel connection closed");
}

async fn handle_text(connection_id: &str, principal: &Principal, state: &AppState, text: &str) {
    let message: ChannelMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(connection_id, error = %e, "ignoring malformed channel frame");
            return;
        }
    };

    match message {
        ChannelMessage::Subscribe { request_id } => {
            handle_subscribe(connection_id, principal, state, request_id).await;
        }
        ChannelMessage::Unsubscribe { request_id } => {
            if let Some(names) = state.hub.unsubscribe(connection_id, request_id).await {
                state
                    .hub
                    .send_to_request(request_id, &ChannelMessage::TypingUpdate { request_id, names })
                    .await;
            }
        }
        ChannelMessage::Typing {
            request_id,
            is_typing,
        } => {
            if let Some(names) = state
                .hub
                .set_typing(connection_id, request_id, is_typing)
                .await
            {
                state
                    .hub
                    .send_to_request(request_id, &ChannelMessage::TypingUpdate { request_id, names })
                    .await;
            }
        }
        // Server-to-client frames arriving inbound are ignored.
        _ => {}
    }
}

/// Authorize and register a per-request subscription, then push the current
/// aggregate snapshot to the new subscriber.
async fn handle_subscribe(
    connection_id: &str,
    principal: &Principal,
    state: &AppState,
    request_id: i64,
) {
    let request = match RequestRepo::find_by_id(&state.pool, request_id).await {
        Ok(Some(request)) => request,
        Ok(None) => {
            state
                .hub
                .send_to_connection(
                    connection_id,
                    &ChannelMessage::Denied {
                        request_id,
                        reason: "Request not found".to_string(),
                    },
                )
                .await;
            return;
        }
        Err(e) => {
            tracing::warn!(connection_id, request_id, error = %e, "subscribe lookup failed");
            return;
        }
    };

    let is_owner = request.resident_tax_id == principal.tax_id;
    if !is_owner && !principal.can_review {
        state
            .hub
            .send_to_connection(
                connection_id,
                &ChannelMessage::Denied {
                    request_id,
                    reason: "Not authorized for this request".to_string(),
                },
            )
            .await;
        return;
    }

    state.hub.subscribe(connection_id, request_id).await;

    match RequestRepo::load_aggregate(&state.pool, request_id).await {
        Ok(Some(aggregate)) => match serde_json::to_value(&aggregate) {
            Ok(snapshot) => {
                state
                    .hub
                    .send_to_connection(
                        connection_id,
                        &ChannelMessage::RequestSnapshot {
                            request_id,
                            snapshot,
                        },
                    )
                    .await;
            }
            Err(e) => {
                tracing::warn!(request_id, error = %e, "failed to serialize snapshot")
            }
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(request_id, error = %e, "failed to load snapshot"),
    }
}
