//! Repository for the `activity_logs` table.

use clubhouse_core::pagination::PageRequest;
use clubhouse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::activity::{ActivityFilter, ActivityLog};

/// Column list for `activity_logs` queries.
const COLUMNS: &str = "id, activity_type, details, user_id, event_id, payload, created_at";

/// Shared `WHERE` clause for filtered listing. `NULL` parameters match all rows.
const FILTER_CLAUSE: &str =
    "($1::UUID IS NULL OR event_id = $1) AND ($2::UUID IS NULL OR user_id = $2)";

/// Provides append and read operations for the activity log.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a new activity row, returning the generated ID.
    ///
    /// `occurred_at` is the time the activity was emitted, which may precede
    /// the insert by the bus delivery delay.
    pub async fn insert(
        pool: &PgPool,
        activity_type: &str,
        details: &str,
        user_id: Option<DbId>,
        event_id: Option<DbId>,
        payload: &serde_json::Value,
        occurred_at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO activity_logs \
                (activity_type, details, user_id, event_id, payload, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(activity_type)
        .bind(details)
        .bind(user_id)
        .bind(event_id)
        .bind(payload)
        .bind(occurred_at)
        .fetch_one(pool)
        .await
    }

    /// List one page of activity ordered newest-first.
    pub async fn list(
        pool: &PgPool,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_logs WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(filter.event_id)
            .bind(filter.user_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Number of activity rows matching `filter`.
    pub async fn count(pool: &PgPool, filter: &ActivityFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM activity_logs WHERE {FILTER_CLAUSE}");
        sqlx::query_scalar(&query)
            .bind(filter.event_id)
            .bind(filter.user_id)
            .fetch_one(pool)
            .await
    }
}
