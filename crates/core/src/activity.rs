//! Activity-log vocabulary: the closed set of activity kinds and the
//! human-readable detail lines written for each.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rsvp::RsvpStatus;

/// Kind of a club activity-log entry.
///
/// Stored in `activity_logs.activity_type` as [`ActivityKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    #[serde(rename = "User joined")]
    UserJoined,
    #[serde(rename = "Event created")]
    EventCreated,
    #[serde(rename = "Event updated")]
    EventUpdated,
    #[serde(rename = "RSVP updated")]
    RsvpUpdated,
    #[serde(rename = "Waitlist promoted")]
    WaitlistPromoted,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserJoined => "User joined",
            Self::EventCreated => "Event created",
            Self::EventUpdated => "Event updated",
            Self::RsvpUpdated => "RSVP updated",
            Self::WaitlistPromoted => "Waitlist promoted",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn user_joined_details(username: &str) -> String {
    format!("User '{username}' has joined the club.")
}

pub fn event_created_details(title: &str) -> String {
    format!("Event '{title}' has been created.")
}

pub fn event_updated_details(title: &str) -> String {
    format!("Event '{title}' has been edited.")
}

pub fn rsvp_updated_details(actor_name: &str, status: RsvpStatus, event_title: &str) -> String {
    format!("User '{actor_name}' updated RSVP to '{status}' for event '{event_title}'.")
}

pub fn waitlist_promoted_details(actor_name: &str, event_title: &str) -> String {
    format!("User '{actor_name}' was promoted from the waitlist for event '{event_title}'.")
}
