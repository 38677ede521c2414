//! Activity log entity model.

use clubhouse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `activity_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    pub activity_type: String,
    pub details: String,
    pub user_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// Optional filters for listing activity. `None` fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilter {
    pub event_id: Option<DbId>,
    pub user_id: Option<DbId>,
}
