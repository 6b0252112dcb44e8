//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Events are published only after the triggering mutation has committed;
//! notification delivery is advisory and must never roll back a mutation.

use chrono::{DateTime, Utc};
use reforma_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A committed mutation on a request aggregate, as seen by the
/// notification dispatcher.
///
/// The three kinds mirror the three notification triggers: a lifecycle
/// transition, an inspection being requested (scheduled), and a message
/// post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A request's status was rewritten (staff transition, resident
    /// resubmission, or an inspection outcome side effect).
    StatusChanged {
        request_id: DbId,
        art_number: String,
        resident_tax_id: String,
        new_status: String,
        actor_name: String,
        /// Resubmissions notify nobody; the audit message is the record.
        is_resubmission: bool,
        timestamp: DateTime<Utc>,
    },

    /// A `scheduled` inspection was appended to a request's ledger.
    InspectionRequested {
        request_id: DbId,
        art_number: String,
        scheduled_for: chrono::NaiveDate,
        author_name: String,
        timestamp: DateTime<Utc>,
    },

    /// A message was posted on a request's channel.
    MessagePosted {
        request_id: DbId,
        art_number: String,
        resident_tax_id: String,
        author_tax_id: String,
        author_name: String,
        author_is_staff: bool,
        preview: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// The aggregate this event belongs to.
    pub fn request_id(&self) -> DbId {
        match self {
            Self::StatusChanged { request_id, .. }
            | Self::InspectionRequested { request_id, .. }
            | Self::MessagePosted { request_id, .. } => *request_id,
        }
    }

    /// The technical-responsibility number used for deep links.
    pub fn art_number(&self) -> &str {
        match self {
            Self::StatusChanged { art_number, .. }
            | Self::InspectionRequested { art_number, .. }
            | Self::MessagePosted { art_number, .. } => art_number,
        }
    }

    /// Resolve who should be notified about this event, or `None` when the
    /// event notifies nobody.
    ///
    /// - Status changes go to the owning resident, except resubmissions
    ///   (the synthetic audit message already records those).
    /// - Inspection requests go to the engineering pool.
    /// - Staff messages go to the owning resident -- unless the author IS
    ///   the resident (a master-flagged owner posting on their own
    ///   request). Resident messages go to the review pool.
    pub fn audience(&self) -> Option<Audience> {
        match self {
            Self::StatusChanged {
                resident_tax_id,
                is_resubmission,
                ..
            } => {
                if *is_resubmission {
                    None
                } else {
                    Some(Audience::Resident(resident_tax_id.clone()))
                }
            }
            Self::InspectionRequested { .. } => Some(Audience::EngineeringPool),
            Self::MessagePosted {
                resident_tax_id,
                author_tax_id,
                author_is_staff,
                ..
            } => {
                if *author_is_staff {
                    if author_tax_id == resident_tax_id {
                        None
                    } else {
                        Some(Audience::Resident(resident_tax_id.clone()))
                    }
                } else {
                    Some(Audience::ReviewPool)
                }
            }
        }
    }
}

/// The recipient set for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// The single resident owning the request.
    Resident(String),
    /// Every staff account holding `ReviewRequests`.
    ReviewPool,
    /// Active engineering accounts only.
    EngineeringPool,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus, shared via `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`. Subscribers recover
    /// by full-state resync, so lag never corrupts what a client sees.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the notifications table is only written by live dispatchers.
    pub fn publish(&self, event: DomainEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
