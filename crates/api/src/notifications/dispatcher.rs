//! Notification dispatcher: consumes committed domain events and fans
//! them out to recipients across three delivery surfaces -- the durable
//! inbox row, the live channel mirror, and the best-effort push transport.
//!
//! Delivery is advisory. A failure on any surface is logged and skipped;
//! it never affects the mutation that triggered the event, which has
//! already committed by the time the event is published.

use std::sync::Arc;

use reforma_core::channel::{ChannelMessage, CATEGORY_REFORMA};
use reforma_core::deeplink::request_link;
use reforma_db::repositories::{DeviceTokenRepo, NotificationRepo, StaffRepo};
use reforma_db::DbPool;
use reforma_events::{Audience, DomainEvent, PushClient};
use tokio::sync::broadcast;

use crate::ws::ChannelHub;

pub struct NotificationDispatcher {
    pool: DbPool,
    hub: Arc<ChannelHub>,
    push: Arc<PushClient>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, hub: Arc<ChannelHub>, push: Arc<PushClient>) -> Self {
        Self { pool, hub, push }
    }

    /// Consume events until the bus closes. Lagged receivers skip the
    /// dropped events and keep going; recipients recover state through
    /// the inbox endpoints.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        tracing::info!("notification dispatcher started");
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "notification dispatcher lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("event bus closed, notification dispatcher stopping");
                    break;
                }
            }
        }
    }

    async fn dispatch(&self, event: DomainEvent) {
        let Some(audience) = event.audience() else {
            return;
        };

        let recipients = match self.resolve(&audience).await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!(error = %e, "failed to resolve notification audience");
                return;
            }
        };
        if recipients.is_empty() {
            return;
        }

        let (title, body) = render(&event);
        let link = request_link(event.art_number());
        let request_id = event.request_id();

        for recipient in &recipients {
            match NotificationRepo::create(
                &self.pool,
                recipient,
                CATEGORY_REFORMA,
                &title,
                &body,
                Some(&link),
                Some(request_id),
            )
            .await
            {
                Ok(_) => {
                    self.hub
                        .send_to_recipient(
                            recipient,
                            &ChannelMessage::Notification {
                                category: CATEGORY_REFORMA.to_string(),
                                title: title.clone(),
                                body: body.clone(),
                                link: Some(link.clone()),
                                request_id: Some(request_id),
                            },
                        )
                        .await;
                }
                Err(e) => {
                    tracing::error!(
                        recipient = %recipient,
                        error = %e,
                        "failed to store notification"
                    );
                }
            }
        }

        match DeviceTokenRepo::tokens_for(&self.pool, &recipients).await {
            Ok(tokens) if !tokens.is_empty() => {
                let push = Arc::clone(&self.push);
                tokio::spawn(async move {
                    push.send(&tokens, &title, &body, Some(&link)).await;
                });
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "failed to load device tokens"),
        }
    }

    async fn resolve(&self, audience: &Audience) -> Result<Vec<String>, sqlx::Error> {
        match audience {
            Audience::Resident(tax_id) => Ok(vec![tax_id.clone()]),
            Audience::ReviewPool => Ok(StaffRepo::review_pool(&self.pool)
                .await?
                .into_iter()
                .map(|a| a.tax_id)
                .collect()),
            Audience::EngineeringPool => Ok(StaffRepo::engineering_pool(&self.pool)
                .await?
                .into_iter()
                .map(|a| a.tax_id)
                .collect()),
        }
    }
}

/// Title and body text for one event.
fn render(event: &DomainEvent) -> (String, String) {
    match event {
        DomainEvent::StatusChanged {
            art_number,
            new_status,
            ..
        } => (
            "Renovation request update".to_string(),
            format!("Request {art_number} is now {}", status_label(new_status)),
        ),
        DomainEvent::InspectionRequested {
            art_number,
            scheduled_for,
            ..
        } => (
            "Inspection requested".to_string(),
            format!("An inspection for request {art_number} is scheduled for {scheduled_for}"),
        ),
        DomainEvent::MessagePosted {
            art_number,
            author_name,
            preview,
            ..
        } => (
            format!("New message on request {art_number}"),
            format!("{author_name}: {preview}"),
        ),
    }
}

/// Human-readable label for a stored status string.
fn status_label(status: &str) -> &str {
    match status {
        "under_review" => "under review",
        "approved" => "approved",
        "rejected" => "rejected",
        "awaiting_inspection" => "awaiting inspection",
        "inspection_approved" => "approved after inspection",
        "inspection_rejected" => "rejected after inspection",
        "completed" => "completed",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn status_change_renders_label() {
        let event = DomainEvent::StatusChanged {
            request_id: 1,
            art_number: "ART-9".to_string(),
            resident_tax_id: "111".to_string(),
            new_status: "awaiting_inspection".to_string(),
            actor_name: "Staff".to_string(),
            is_resubmission: false,
            timestamp: Utc::now(),
        };
        let (title, body) = render(&event);
        assert_eq!(title, "Renovation request update");
        assert_eq!(body, "Request ART-9 is now awaiting inspection");
    }

    #[test]
    fn message_posted_renders_author_and_preview() {
        let event = DomainEvent::MessagePosted {
            request_id: 1,
            art_number: "ART-9".to_string(),
            resident_tax_id: "111".to_string(),
            author_tax_id: "222".to_string(),
            author_name: "Ana".to_string(),
            author_is_staff: true,
            preview: "When does the work start?".to_string(),
            timestamp: Utc::now(),
        };
        let (title, body) = render(&event);
        assert_eq!(title, "New message on request ART-9");
        assert_eq!(body, "Ana: When does the work start?");
    }

    #[test]
    fn unknown_status_falls_back_to_raw_value() {
        assert_eq!(status_label("weird_state"), "weird_state");
    }
}
