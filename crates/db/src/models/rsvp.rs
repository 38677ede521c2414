//! RSVP entity model and list filters.

use clubhouse_core::rsvp::RsvpStatus;
use clubhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rsvps` table.
///
/// `status_id` is decoded straight into the closed [`RsvpStatus`] enum and
/// serialized as its wire string under the `status` key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rsvp {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: RsvpStatus,
    /// Arrival order within the event; lower is promoted first.
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Optional filters for listing RSVPs. `None` fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpFilter {
    pub rsvp_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub status: Option<RsvpStatus>,
}
