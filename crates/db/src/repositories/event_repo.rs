//! Repository for the `events` table.

use clubhouse_core::pagination::PageRequest;
use clubhouse_core::rsvp::RsvpStatus;
use clubhouse_core::types::DbId;
use sqlx::PgPool;

use super::PgTransaction;
use crate::models::event::{CreateEvent, Event, UpdateEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, starts_at, location, max_attendees, \
    host_id, created_at, updated_at";

/// Provides CRUD operations and admission-path locking for club events.
pub struct EventRepo;

impl EventRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new event. A missing description is stored as empty text.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (title, description, starts_at, location, max_attendees, host_id)
             VALUES ($1, COALESCE($2, ''), $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.location.trim())
            .bind(input.max_attendees)
            .bind(input.host_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of events, soonest first.
    pub async fn list(pool: &PgPool, page: PageRequest) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events ORDER BY starts_at ASC, id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Total number of events.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await
    }

    // ── Admission path (transactional) ───────────────────────────────

    /// Load an event and take a row lock on it for the rest of `tx`.
    ///
    /// Every admission decision for the event runs while this lock is held,
    /// so concurrent requests for the same event serialize here while
    /// different events proceed in parallel.
    pub async fn lock_for_update(
        tx: &mut PgTransaction<'_>,
        id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Apply the non-`None` fields of `input` to a (locked) event.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        tx: &mut PgTransaction<'_>,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                location = COALESCE($5, location),
                max_attendees = COALESCE($6, max_attendees)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.location.as_deref().map(str::trim))
            .bind(input.max_attendees)
            .fetch_optional(&mut **tx)
            .await
    }

    // ── Reconciliation ───────────────────────────────────────────────

    /// IDs of events whose `going` set is out of balance with capacity:
    /// waitlisted RSVPs next to a free seat, or more `going` than seats.
    ///
    /// Used by the background sweep; each hit is rebalanced under its own lock.
    pub async fn list_ids_needing_rebalance(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT e.id FROM events e
             CROSS JOIN LATERAL (
                 SELECT
                     COUNT(*) FILTER (WHERE r.status_id = $2) AS going,
                     COUNT(*) FILTER (WHERE r.status_id = $1) AS waitlisted
                 FROM rsvps r WHERE r.event_id = e.id
             ) c
             WHERE (c.waitlisted > 0 AND c.going < e.max_attendees)
                OR c.going > e.max_attendees
             ORDER BY e.starts_at ASC",
        )
        .bind(RsvpStatus::Waitlisted.id())
        .bind(RsvpStatus::Going.id())
        .fetch_all(pool)
        .await
    }
}
