pub mod health;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                          WebSocket channel
///
/// /requests                                    list (GET), submit (POST)
/// /requests/{id}                               full aggregate (GET)
/// /requests/{id}/status                        staff transition (PUT)
/// /requests/{id}/resubmit                      resident resubmission (POST)
/// /requests/{id}/link                          deep link (GET)
/// /requests/{id}/messages                      post message (POST)
/// /requests/{id}/inspections                   append record (POST)
/// /requests/{id}/inspections/{inspection_id}   delete within window (DELETE)
///
/// /notifications                               inbox (GET)
/// /notifications/unread-count                  badge counter (GET)
/// /notifications/read-all                      acknowledge all (PUT)
/// /notifications/{id}/read                     acknowledge one (PUT)
///
/// /devices                                     register (POST), remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::handler::ws_handler))
        .route(
            "/requests",
            get(handlers::requests::list_requests).post(handlers::requests::create_request),
        )
        .route("/requests/{id}", get(handlers::requests::get_request))
        .route(
            "/requests/{id}/status",
            put(handlers::requests::transition_request),
        )
        .route(
            "/requests/{id}/resubmit",
            post(handlers::requests::resubmit_request),
        )
        .route("/requests/{id}/link", get(handlers::requests::get_request_link))
        .route(
            "/requests/{id}/messages",
            post(handlers::messages::post_message),
        )
        .route(
            "/requests/{id}/inspections",
            post(handlers::inspections::create_inspection),
        )
        .route(
            "/requests/{id}/inspections/{inspection_id}",
            delete(handlers::inspections::delete_inspection),
        )
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_notification_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_notification_read),
        )
        .route(
            "/devices",
            post(handlers::devices::register_device).delete(handlers::devices::unregister_device),
        )
}
