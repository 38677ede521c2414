//! RSVP status, state machine and admission arithmetic.
//!
//! This module lives in `core` (zero internal deps) so the repository layer,
//! the admission engine and the activity bus all agree on one closed status
//! enum and one set of transition rules.
//!
//! Occupancy is always derived from a count of `going` rows supplied by the
//! caller; nothing here keeps a running tally.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching the SMALLINT `rsvp_statuses.id` column.
pub type StatusId = i16;

/// Priority handed to the first RSVP of an event.
pub const FIRST_PRIORITY: i32 = 1;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Enrollment state of a single RSVP.
///
/// Discriminants match the seed order of the `rsvp_statuses` lookup table.
/// The serialized form is the literal wire string (`"not going"` carries a
/// space).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsvpStatus {
    #[serde(rename = "going")]
    Going = 1,
    #[serde(rename = "waitlisted")]
    Waitlisted = 2,
    #[serde(rename = "not going")]
    NotGoing = 3,
}

impl RsvpStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Resolve a database status ID, or `None` for an unknown value.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Going),
            2 => Some(Self::Waitlisted),
            3 => Some(Self::NotGoing),
            _ => None,
        }
    }

    /// The wire / activity-log spelling of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Waitlisted => "waitlisted",
            Self::NotGoing => "not going",
        }
    }

    /// Whether an RSVP in this status counts against the event's capacity.
    pub fn occupies_seat(self) -> bool {
        matches!(self, Self::Going)
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RsvpStatus> for StatusId {
    fn from(value: RsvpStatus) -> Self {
        value.id()
    }
}

impl TryFrom<StatusId> for RsvpStatus {
    type Error = CoreError;

    fn try_from(value: StatusId) -> Result<Self, Self::Error> {
        Self::from_id(value)
            .ok_or_else(|| CoreError::Internal(format!("unknown RSVP status id {value}")))
    }
}

/// The statuses a member may ask for directly.
///
/// `waitlisted` is deliberately absent: it is only ever assigned by the
/// admission engine, so a request body carrying it fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestedStatus {
    #[serde(rename = "going")]
    Going,
    #[serde(rename = "not going")]
    NotGoing,
}

impl From<RequestedStatus> for RsvpStatus {
    fn from(value: RequestedStatus) -> Self {
        match value {
            RequestedStatus::Going => RsvpStatus::Going,
            RequestedStatus::NotGoing => RsvpStatus::NotGoing,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::RsvpStatus::{self, Going, NotGoing, Waitlisted};
    use crate::error::CoreError;

    /// Who is driving a transition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Actor {
        /// The member who owns the RSVP, via an explicit update.
        Member,
        /// The admission engine, while rebalancing an event.
        Engine,
    }

    /// Check whether `actor` may move an RSVP from `from` to `to`.
    ///
    /// Members may cancel from any active state and re-enter from
    /// `not going`. Only the engine moves RSVPs between `waitlisted` and
    /// `going`. Nothing ever moves `not going -> waitlisted`.
    pub fn can_transition(from: RsvpStatus, to: RsvpStatus, actor: Actor) -> bool {
        match (from, to) {
            (Going, NotGoing) | (Waitlisted, NotGoing) | (NotGoing, Going) => true,
            (Waitlisted, Going) | (Going, Waitlisted) => actor == Actor::Engine,
            _ => false,
        }
    }

    /// Validate a transition, returning a validation error for illegal ones.
    pub fn validate_transition(
        from: RsvpStatus,
        to: RsvpStatus,
        actor: Actor,
    ) -> Result<(), CoreError> {
        if can_transition(from, to, actor) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid RSVP transition: {from} -> {to}"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Admission arithmetic
// ---------------------------------------------------------------------------

/// Whether an event with `going_count` confirmed attendees has room for one more.
pub fn has_free_seat(going_count: i64, max_attendees: i32) -> bool {
    going_count < i64::from(max_attendees)
}

/// Status assigned to a brand-new RSVP.
pub fn initial_status(going_count: i64, max_attendees: i32) -> RsvpStatus {
    if has_free_seat(going_count, max_attendees) {
        RsvpStatus::Going
    } else {
        RsvpStatus::Waitlisted
    }
}

/// Next priority for an event given the current maximum (if any).
///
/// Priorities are never reused: a status change also draws a fresh value
/// from here, which sends the member to the back of the line.
pub fn next_priority(current_max: Option<i32>) -> i32 {
    current_max.map_or(FIRST_PRIORITY, |max| max + 1)
}

/// What a rebalance pass has to do to restore the capacity invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalancePlan {
    /// `going` count equals capacity; nothing to do.
    Balanced,
    /// Promote up to this many waitlisted RSVPs, oldest priority first.
    Promote(i64),
    /// Capacity shrank below the `going` count; demote this many of the
    /// most recent `going` RSVPs back to the waitlist.
    Demote(i64),
}

/// Compare occupancy with capacity and decide the rebalance step.
pub fn plan_rebalance(going_count: i64, max_attendees: i32) -> RebalancePlan {
    let available = i64::from(max_attendees) - going_count;
    match available {
        0 => RebalancePlan::Balanced,
        n if n > 0 => RebalancePlan::Promote(n),
        n => RebalancePlan::Demote(-n),
    }
}
