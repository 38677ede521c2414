//! In-process activity bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ActivityBus`] is the publish/subscribe hub for [`ActivityEvent`]s.
//! It is designed to be shared via `Arc<ActivityBus>` across the application.

use chrono::{DateTime, Utc};
use clubhouse_core::activity::{self, ActivityKind};
use clubhouse_core::rsvp::RsvpStatus;
use clubhouse_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ActivityEvent
// ---------------------------------------------------------------------------

/// Something that happened in the club, destined for the activity log.
///
/// Constructed via [`ActivityEvent::new`] and enriched with the builder
/// methods [`with_user`](ActivityEvent::with_user),
/// [`with_event`](ActivityEvent::with_event), and
/// [`with_payload`](ActivityEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,

    /// Human-readable line shown in the club feed.
    pub details: String,

    /// The member the activity is about, if any.
    pub user_id: Option<DbId>,

    /// The club event the activity is about, if any.
    pub event_id: Option<DbId>,

    /// Free-form JSON payload carrying activity-specific data.
    pub payload: serde_json::Value,

    /// When the activity was emitted (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    /// Create an activity with only its kind and detail line.
    pub fn new(kind: ActivityKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            user_id: None,
            event_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_event(mut self, event_id: DbId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// An RSVP moved to `status`, by the member or by the engine.
    pub fn rsvp_changed(
        event_id: DbId,
        user_id: DbId,
        status: RsvpStatus,
        actor_name: &str,
        event_title: &str,
    ) -> Self {
        Self::new(
            ActivityKind::RsvpUpdated,
            activity::rsvp_updated_details(actor_name, status, event_title),
        )
        .with_user(user_id)
        .with_event(event_id)
        .with_payload(serde_json::json!({ "status": status }))
    }

    /// A waitlisted RSVP was promoted into a free seat.
    pub fn waitlist_promoted(
        event_id: DbId,
        user_id: DbId,
        priority: i32,
        actor_name: &str,
        event_title: &str,
    ) -> Self {
        Self::new(
            ActivityKind::WaitlistPromoted,
            activity::waitlist_promoted_details(actor_name, event_title),
        )
        .with_user(user_id)
        .with_event(event_id)
        .with_payload(serde_json::json!({
            "status": RsvpStatus::Going,
            "priority": priority,
        }))
    }
}

// ---------------------------------------------------------------------------
// ActivityBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out activity bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ActivityEvent`].
///
/// # Usage
///
/// ```rust
/// use clubhouse_activity::bus::{ActivityBus, ActivityEvent};
/// use clubhouse_core::activity::ActivityKind;
///
/// let bus = ActivityBus::default();
/// let _rx = bus.subscribe();
///
/// bus.publish(ActivityEvent::new(ActivityKind::EventCreated, "Event 'Dune' has been created."));
/// ```
pub struct ActivityBus {
    sender: broadcast::Sender<ActivityEvent>,
}

impl ActivityBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an activity to all current subscribers.
    ///
    /// Never fails: with no active subscribers the activity is dropped.
    pub fn publish(&self, event: ActivityEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Record that a member's RSVP changed status.
    pub fn record_rsvp_change(
        &self,
        event_id: DbId,
        user_id: DbId,
        status: RsvpStatus,
        actor_name: &str,
        event_title: &str,
    ) {
        self.publish(ActivityEvent::rsvp_changed(
            event_id,
            user_id,
            status,
            actor_name,
            event_title,
        ));
    }

    /// Subscribe to all activities published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }
}

impl Default for ActivityBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
