//! Admission, status updates and waitlist rebalancing.
//!
//! Every operation runs in a single transaction that first locks the event
//! row. Occupancy is recounted under that lock and the rebalance pass runs
//! before commit, so the capacity invariant holds whenever the lock is
//! released. Activity is published only after a successful commit; a rolled
//! back operation emits nothing.

use std::sync::Arc;

use clubhouse_activity::{ActivityBus, ActivityEvent};
use clubhouse_core::activity::{self, ActivityKind};
use clubhouse_core::error::CoreError;
use clubhouse_core::pagination::{Page, PageRequest};
use clubhouse_core::rsvp::state_machine::{validate_transition, Actor};
use clubhouse_core::rsvp::{
    has_free_seat, initial_status, plan_rebalance, RebalancePlan, RequestedStatus, RsvpStatus,
};
use clubhouse_core::types::DbId;
use clubhouse_db::models::event::{Event, UpdateEvent};
use clubhouse_db::models::rsvp::{Rsvp, RsvpFilter};
use clubhouse_db::repositories::{EventRepo, PgTransaction, RsvpRepo, UserRepo};
use clubhouse_db::DbPool;

use crate::error::{AppResult, DUPLICATE_RSVP_MESSAGE};

/// RSVPs moved by one rebalance pass, in priority order.
#[derive(Debug, Default)]
struct RebalanceOutcome {
    promoted: Vec<Rsvp>,
    demoted: Vec<Rsvp>,
}

impl RebalanceOutcome {
    fn is_empty(&self) -> bool {
        self.promoted.is_empty() && self.demoted.is_empty()
    }

    fn into_changed(self) -> Vec<Rsvp> {
        let mut changed = self.promoted;
        changed.extend(self.demoted);
        changed
    }
}

/// The RSVP admission engine.
pub struct RsvpEngine {
    pool: DbPool,
    activity: Arc<ActivityBus>,
}

impl RsvpEngine {
    pub fn new(pool: DbPool, activity: Arc<ActivityBus>) -> Self {
        Self { pool, activity }
    }

    // ── Member operations ────────────────────────────────────────────

    /// Enroll `user_id` in `event_id`.
    ///
    /// The new RSVP is `going` while a seat is free and `waitlisted`
    /// otherwise, with the next priority in the event.
    pub async fn request_rsvp(&self, event_id: DbId, user_id: DbId) -> AppResult<Rsvp> {
        // Users are never removed by this flow, so the lookup can run
        // outside the event lock.
        let user = UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;

        let mut tx = self.pool.begin().await?;
        let event = Self::lock_event(&mut tx, event_id).await?;

        if RsvpRepo::find_for_update(&mut tx, event_id, user_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(DUPLICATE_RSVP_MESSAGE.into()).into());
        }

        let going = RsvpRepo::count_going(&mut tx, event_id).await?;
        let status = initial_status(going, event.max_attendees);
        let priority = RsvpRepo::next_priority(&mut tx, event_id).await?;
        let rsvp = RsvpRepo::create(&mut tx, event_id, user_id, status, priority).await?;

        let outcome = Self::rebalance_locked(&mut tx, &event).await?;
        tx.commit().await?;

        tracing::info!(
            event_id = %event_id,
            user_id = %user_id,
            status = %rsvp.status,
            priority = rsvp.priority,
            "RSVP created"
        );

        self.activity.record_rsvp_change(
            event_id,
            user_id,
            rsvp.status,
            &user.username,
            &event.title,
        );
        self.announce(&event, &outcome).await;

        Ok(rsvp)
    }

    /// Change a member's own RSVP to `going` or `not going`.
    ///
    /// Asking for the current status is a no-op. A waitlisted member asking
    /// for `going` never skips the line: if a seat is free the waitlist is
    /// rebalanced in priority order and the member moves only if their turn
    /// has come. Any other change draws a fresh priority.
    pub async fn update_rsvp(
        &self,
        event_id: DbId,
        user_id: DbId,
        requested: RequestedStatus,
    ) -> AppResult<Rsvp> {
        let target = RsvpStatus::from(requested);

        let mut tx = self.pool.begin().await?;
        let event = Self::lock_event(&mut tx, event_id).await?;
        let current = RsvpRepo::find_for_update(&mut tx, event_id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Rsvp", format!("{user_id}/{event_id}")))?;

        if current.status == target {
            return Ok(current);
        }

        if target == RsvpStatus::Going {
            let going = RsvpRepo::count_going(&mut tx, event_id).await?;
            if !has_free_seat(going, event.max_attendees) {
                return Err(CoreError::CapacityExceeded(format!(
                    "Event '{}' is full ({} of {} seats taken)",
                    event.title, going, event.max_attendees
                ))
                .into());
            }
        }

        let wants_promotion =
            current.status == RsvpStatus::Waitlisted && target == RsvpStatus::Going;
        let (rsvp, outcome, member_changed) = if wants_promotion {
            // waitlisted -> going: only the engine moves people off the list.
            let outcome = Self::rebalance_locked(&mut tx, &event).await?;
            let rsvp = outcome
                .promoted
                .iter()
                .find(|r| r.id == current.id)
                .cloned()
                .unwrap_or(current);
            (rsvp, outcome, false)
        } else {
            validate_transition(current.status, target, Actor::Member)?;
            let priority = RsvpRepo::next_priority(&mut tx, event_id).await?;
            let rsvp = RsvpRepo::update_status(&mut tx, current.id, target, priority).await?;
            let outcome = Self::rebalance_locked(&mut tx, &event).await?;
            (rsvp, outcome, true)
        };

        tx.commit().await?;

        if member_changed {
            tracing::info!(
                event_id = %event_id,
                user_id = %user_id,
                status = %rsvp.status,
                priority = rsvp.priority,
                "RSVP updated"
            );
            let actor = self.display_name(user_id).await;
            self.activity
                .record_rsvp_change(event_id, user_id, rsvp.status, &actor, &event.title);
        }
        self.announce(&event, &outcome).await;

        Ok(rsvp)
    }

    // ── Engine operations ────────────────────────────────────────────

    /// Restore the capacity invariant for one event.
    ///
    /// Promotes waitlisted RSVPs into free seats (lowest priority first) or,
    /// after a capacity cut, demotes the most recent `going` RSVPs back to
    /// the waitlist. Returns the RSVPs whose status changed; empty when the
    /// event was already balanced.
    pub async fn rebalance_waitlist(&self, event_id: DbId) -> AppResult<Vec<Rsvp>> {
        let mut tx = self.pool.begin().await?;
        let event = Self::lock_event(&mut tx, event_id).await?;
        let outcome = Self::rebalance_locked(&mut tx, &event).await?;
        tx.commit().await?;

        self.announce(&event, &outcome).await;
        Ok(outcome.into_changed())
    }

    /// Apply a partial event edit. A capacity change rebalances the
    /// waitlist before the edit commits.
    pub async fn edit_event(&self, event_id: DbId, input: &UpdateEvent) -> AppResult<Event> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let before = Self::lock_event(&mut tx, event_id).await?;
        let event = EventRepo::update(&mut tx, event_id, input)
            .await?
            .ok_or_else(|| CoreError::not_found("Event", event_id))?;

        let outcome = if event.max_attendees != before.max_attendees {
            Self::rebalance_locked(&mut tx, &event).await?
        } else {
            RebalanceOutcome::default()
        };
        tx.commit().await?;

        tracing::info!(
            event_id = %event_id,
            max_attendees = event.max_attendees,
            promoted = outcome.promoted.len(),
            demoted = outcome.demoted.len(),
            "Event updated"
        );

        self.activity.publish(
            ActivityEvent::new(
                ActivityKind::EventUpdated,
                activity::event_updated_details(&event.title),
            )
            .with_event(event.id)
            .with_payload(serde_json::json!({ "max_attendees": event.max_attendees })),
        );
        self.announce(&event, &outcome).await;

        Ok(event)
    }

    /// One page of RSVPs matching `filter`, with the total match count.
    pub async fn list_rsvps(&self, filter: &RsvpFilter, page: PageRequest) -> AppResult<Page<Rsvp>> {
        let items = RsvpRepo::list(&self.pool, filter, page).await?;
        let total = RsvpRepo::count(&self.pool, filter).await?;
        Ok(Page::new(items, total, page))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn lock_event(tx: &mut PgTransaction<'_>, event_id: DbId) -> AppResult<Event> {
        let event = EventRepo::lock_for_update(tx, event_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Event", event_id))?;
        Ok(event)
    }

    /// Rebalance an event whose row lock is held by `tx`.
    async fn rebalance_locked(
        tx: &mut PgTransaction<'_>,
        event: &Event,
    ) -> Result<RebalanceOutcome, sqlx::Error> {
        let going = RsvpRepo::count_going(tx, event.id).await?;
        let outcome = match plan_rebalance(going, event.max_attendees) {
            RebalancePlan::Balanced => RebalanceOutcome::default(),
            RebalancePlan::Promote(available) => RebalanceOutcome {
                promoted: RsvpRepo::promote_waitlisted(tx, event.id, available).await?,
                demoted: Vec::new(),
            },
            RebalancePlan::Demote(excess) => RebalanceOutcome {
                promoted: Vec::new(),
                demoted: RsvpRepo::demote_going(tx, event.id, excess).await?,
            },
        };

        if !outcome.is_empty() {
            tracing::debug!(
                event_id = %event.id,
                going,
                max_attendees = event.max_attendees,
                promoted = outcome.promoted.len(),
                demoted = outcome.demoted.len(),
                "Waitlist rebalanced"
            );
        }
        Ok(outcome)
    }

    /// Publish one activity per RSVP moved by a committed rebalance.
    async fn announce(&self, event: &Event, outcome: &RebalanceOutcome) {
        for rsvp in &outcome.promoted {
            let actor = self.display_name(rsvp.user_id).await;
            tracing::info!(
                event_id = %event.id,
                user_id = %rsvp.user_id,
                priority = rsvp.priority,
                "Promoted from waitlist"
            );
            self.activity.publish(ActivityEvent::waitlist_promoted(
                event.id,
                rsvp.user_id,
                rsvp.priority,
                &actor,
                &event.title,
            ));
        }
        for rsvp in &outcome.demoted {
            let actor = self.display_name(rsvp.user_id).await;
            tracing::info!(
                event_id = %event.id,
                user_id = %rsvp.user_id,
                priority = rsvp.priority,
                "Demoted to waitlist"
            );
            self.activity.record_rsvp_change(
                event.id,
                rsvp.user_id,
                RsvpStatus::Waitlisted,
                &actor,
                &event.title,
            );
        }
    }

    /// Username for activity text. Falls back to the raw id, since the
    /// activity log must never fail an operation that already committed.
    async fn display_name(&self, user_id: DbId) -> String {
        match UserRepo::username(&self.pool, user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => user_id.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Username lookup failed");
                user_id.to_string()
            }
        }
    }
}
