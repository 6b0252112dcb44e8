//! Collaboration channel protocol and notification constants.
//!
//! This module lives in `core` (zero internal deps) so the API layer, the
//! WebSocket hub, and the notification dispatcher all reference the same
//! message protocol and category names.
//!
//! Typing presence is best-effort and lossy by contract: it exists only to
//! render a "is composing" indicator, is never persisted, and may be lost
//! on reconnect. It must never be treated as part of the durable message
//! history.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Notification category for every request-lifecycle event. The value is a
/// pre-existing client convention.
pub const CATEGORY_REFORMA: &str = "reforma";

/// Maximum length of a chat message body.
pub const MAX_MESSAGE_LENGTH: usize = 4_000;

/// Messages exchanged over the per-request WebSocket channel.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator so
/// the frontend can route messages by type string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ChannelMessage {
    /// Client sends: start receiving updates for a request.
    #[serde(rename = "subscribe")]
    Subscribe { request_id: DbId },

    /// Client sends: stop receiving updates for a request.
    #[serde(rename = "unsubscribe")]
    Unsubscribe { request_id: DbId },

    /// Client sends: the caller started or stopped composing a message.
    #[serde(rename = "typing")]
    Typing { request_id: DbId, is_typing: bool },

    /// Server sends: the full current aggregate for a request. Emitted on
    /// subscribe (resync) and after every committed mutation, so a client
    /// that reconnects never depends on missed deltas.
    #[serde(rename = "request.snapshot")]
    RequestSnapshot {
        request_id: DbId,
        snapshot: serde_json::Value,
    },

    /// Server broadcasts: the display names currently composing a message.
    #[serde(rename = "typing.update")]
    TypingUpdate { request_id: DbId, names: Vec<String> },

    /// Server sends to one recipient: mirror of a stored notification.
    #[serde(rename = "notification")]
    Notification {
        category: String,
        title: String,
        body: String,
        link: Option<String>,
        request_id: Option<DbId>,
    },

    /// Server sends to the requesting client: a channel operation was
    /// refused (unknown request, or no permission to read it).
    #[serde(rename = "channel.denied")]
    Denied { request_id: DbId, reason: String },
}

/// Validate and normalize a chat message body: must be non-blank after
/// trimming and within the length cap. Returns the trimmed body.
pub fn validate_message_body(body: &str) -> Result<String, crate::error::CoreError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(crate::error::CoreError::Validation(
            "Message body must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(crate::error::CoreError::Validation(format!(
            "Message body exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_serialization() {
        let msg = ChannelMessage::Subscribe { request_id: 42 };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"subscribe"#));

        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn typing_serialization() {
        let msg = ChannelMessage::Typing {
            request_id: 7,
            is_typing: true,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"typing"#));

        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn typing_update_serialization() {
        let msg = ChannelMessage::TypingUpdate {
            request_id: 1,
            names: vec!["Ana Souza".to_string()],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"typing.update"#));

        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn snapshot_serialization() {
        let msg = ChannelMessage::RequestSnapshot {
            request_id: 3,
            snapshot: serde_json::json!({"status": "under_review"}),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"request.snapshot"#));

        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn notification_serialization() {
        let msg = ChannelMessage::Notification {
            category: CATEGORY_REFORMA.to_string(),
            title: "Request rejected".to_string(),
            body: "Your renovation request ART-1 was rejected".to_string(),
            link: Some("/reformas?art=ART-1".to_string()),
            request_id: Some(9),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"notification"#));

        let parsed: ChannelMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn blank_body_is_rejected() {
        assert!(validate_message_body("").is_err());
        assert!(validate_message_body("   \n\t ").is_err());
    }

    #[test]
    fn body_is_trimmed() {
        assert_eq!(validate_message_body("  hello ").unwrap(), "hello");
    }

    #[test]
    fn oversized_body_is_rejected() {
        let body = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_message_body(&body).is_err());
    }

    #[test]
    fn length_cap_counts_characters_not_bytes() {
        // Multi-byte characters: at the cap in characters even though the
        // byte length is twice the cap.
        let body = "á".repeat(MAX_MESSAGE_LENGTH);
        assert!(validate_message_body(&body).is_ok());
        let body = "á".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_message_body(&body).is_err());
    }
}
