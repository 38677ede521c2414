//! Repository for the `rsvps` table.
//!
//! Every write used by the admission engine takes an open transaction; the
//! caller is expected to hold the event row lock from
//! [`EventRepo::lock_for_update`](super::EventRepo::lock_for_update) so that
//! counts, priority draws and status writes for one event never interleave.

use clubhouse_core::pagination::PageRequest;
use clubhouse_core::rsvp::{next_priority, RsvpStatus};
use clubhouse_core::types::DbId;
use sqlx::PgPool;

use super::PgTransaction;
use crate::models::rsvp::{Rsvp, RsvpFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, user_id, status_id, priority, created_at, updated_at";

/// Shared `WHERE` clause for filtered listing. `NULL` parameters match all rows.
const FILTER_CLAUSE: &str = "($1::UUID IS NULL OR id = $1) \
    AND ($2::UUID IS NULL OR event_id = $2) \
    AND ($3::UUID IS NULL OR user_id = $3) \
    AND ($4::SMALLINT IS NULL OR status_id = $4)";

/// Provides admission-path writes and filtered reads for RSVPs.
pub struct RsvpRepo;

impl RsvpRepo {
    // ── Reads ────────────────────────────────────────────────────────

    /// Find the RSVP for an (event, user) pair.
    pub async fn find(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Rsvp>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rsvps WHERE event_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Rsvp>(&query)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Full roster for an event in priority order.
    pub async fn list_by_event(pool: &PgPool, event_id: DbId) -> Result<Vec<Rsvp>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM rsvps WHERE event_id = $1 ORDER BY priority ASC");
        sqlx::query_as::<_, Rsvp>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// One page of RSVPs matching `filter`, ordered by event then priority.
    pub async fn list(
        pool: &PgPool,
        filter: &RsvpFilter,
        page: PageRequest,
    ) -> Result<Vec<Rsvp>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rsvps WHERE {FILTER_CLAUSE} \
             ORDER BY event_id, priority ASC LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Rsvp>(&query)
            .bind(filter.rsvp_id)
            .bind(filter.event_id)
            .bind(filter.user_id)
            .bind(filter.status.map(RsvpStatus::id))
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Number of RSVPs matching `filter` across all pages.
    pub async fn count(pool: &PgPool, filter: &RsvpFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM rsvps WHERE {FILTER_CLAUSE}");
        sqlx::query_scalar(&query)
            .bind(filter.rsvp_id)
            .bind(filter.event_id)
            .bind(filter.user_id)
            .bind(filter.status.map(RsvpStatus::id))
            .fetch_one(pool)
            .await
    }

    /// Number of RSVPs for an event currently in `status`.
    pub async fn count_with_status(
        pool: &PgPool,
        event_id: DbId,
        status: RsvpStatus,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status_id = $2")
            .bind(event_id)
            .bind(status.id())
            .fetch_one(pool)
            .await
    }

    // ── Admission path (transactional) ───────────────────────────────

    /// Find and row-lock the RSVP for an (event, user) pair.
    pub async fn find_for_update(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Rsvp>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rsvps WHERE event_id = $1 AND user_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, Rsvp>(&query)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Count the `going` RSVPs of an event. Occupancy is always derived from
    /// this count, never from a stored tally.
    pub async fn count_going(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status_id = $2")
            .bind(event_id)
            .bind(RsvpStatus::Going.id())
            .fetch_one(&mut **tx)
            .await
    }

    /// Draw the next priority for an event (`max + 1`, or 1 when empty).
    pub async fn next_priority(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let current_max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(priority) FROM rsvps WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(next_priority(current_max))
    }

    /// Insert a new RSVP with a precomputed status and priority.
    ///
    /// The `uq_rsvps_event_user` constraint rejects a second row for the
    /// same pair even if a caller skipped the existence check.
    pub async fn create(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
        user_id: DbId,
        status: RsvpStatus,
        priority: i32,
    ) -> Result<Rsvp, sqlx::Error> {
        let query = format!(
            "INSERT INTO rsvps (event_id, user_id, status_id, priority)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rsvp>(&query)
            .bind(event_id)
            .bind(user_id)
            .bind(status.id())
            .bind(priority)
            .fetch_one(&mut **tx)
            .await
    }

    /// Set status and priority of a single RSVP.
    pub async fn update_status(
        tx: &mut PgTransaction<'_>,
        id: DbId,
        status: RsvpStatus,
        priority: i32,
    ) -> Result<Rsvp, sqlx::Error> {
        let query = format!(
            "UPDATE rsvps SET status_id = $2, priority = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rsvp>(&query)
            .bind(id)
            .bind(status.id())
            .bind(priority)
            .fetch_one(&mut **tx)
            .await
    }

    /// Promote up to `limit` waitlisted RSVPs to `going`, lowest priority
    /// first. Priorities are left untouched. Returns the promoted rows in
    /// priority order.
    pub async fn promote_waitlisted(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
        limit: i64,
    ) -> Result<Vec<Rsvp>, sqlx::Error> {
        Self::move_batch(
            tx,
            event_id,
            RsvpStatus::Waitlisted,
            RsvpStatus::Going,
            "ASC",
            limit,
        )
        .await
    }

    /// Demote up to `limit` `going` RSVPs back to the waitlist, most recent
    /// priority first. Priorities are left untouched, so a demoted member
    /// keeps their original place in line. Returns the demoted rows in
    /// priority order.
    pub async fn demote_going(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
        limit: i64,
    ) -> Result<Vec<Rsvp>, sqlx::Error> {
        Self::move_batch(
            tx,
            event_id,
            RsvpStatus::Going,
            RsvpStatus::Waitlisted,
            "DESC",
            limit,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Move up to `limit` RSVPs of an event from `from` to `to`, picking rows
    /// by priority in `order` (a fixed `ASC` / `DESC` literal).
    async fn move_batch(
        tx: &mut PgTransaction<'_>,
        event_id: DbId,
        from: RsvpStatus,
        to: RsvpStatus,
        order: &'static str,
        limit: i64,
    ) -> Result<Vec<Rsvp>, sqlx::Error> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let query = format!(
            "UPDATE rsvps SET status_id = $3
             WHERE id IN (
                 SELECT id FROM rsvps
                 WHERE event_id = $1 AND status_id = $2
                 ORDER BY priority {order}
                 LIMIT $4
             )
             RETURNING {COLUMNS}"
        );
        let mut moved = sqlx::query_as::<_, Rsvp>(&query)
            .bind(event_id)
            .bind(from.id())
            .bind(to.id())
            .bind(limit)
            .fetch_all(&mut **tx)
            .await?;

        // RETURNING order is unspecified.
        moved.sort_by_key(|r| r.priority);
        Ok(moved)
    }
}
