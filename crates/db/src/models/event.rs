//! Club event entity model and DTOs.

use clubhouse_core::error::CoreError;
use clubhouse_core::types::{DbId, Timestamp};
use clubhouse_core::validation::{validate_description, validate_max_attendees, validate_name};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub location: String,
    /// Upper bound on simultaneous `going` RSVPs.
    pub max_attendees: i32,
    pub host_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new event.
#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub location: String,
    pub max_attendees: i32,
    pub host_id: Option<DbId>,
}

impl CreateEvent {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("title", &self.title)?;
        validate_name("location", &self.location)?;
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        validate_max_attendees(self.max_attendees)
    }
}

/// DTO for updating an existing event. All fields are optional.
///
/// A change to `max_attendees` triggers a waitlist rebalance.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub location: Option<String>,
    pub max_attendees: Option<i32>,
}

impl UpdateEvent {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(ref title) = self.title {
            validate_name("title", title)?;
        }
        if let Some(ref location) = self.location {
            validate_name("location", location)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        if let Some(max_attendees) = self.max_attendees {
            validate_max_attendees(max_attendees)?;
        }
        Ok(())
    }
}
