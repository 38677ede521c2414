//! Durable activity-log writer.
//!
//! [`ActivityPersistence`] subscribes to the [`ActivityBus`](crate::bus::ActivityBus)
//! and writes every received [`ActivityEvent`] to the `activity_logs` table.
//! A failed write is logged and dropped; it never reaches the operation that
//! published the activity.

use clubhouse_core::types::DbId;
use clubhouse_db::repositories::ActivityRepo;
use clubhouse_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ActivityEvent;

/// Background service that persists club activity to the database.
pub struct ActivityPersistence;

impl ActivityPersistence {
    /// Run the persistence loop until the bus is dropped.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ActivityEvent>) {
        loop {
            match receiver.recv().await {
                Ok(activity) => {
                    if let Err(e) = Self::persist(&pool, &activity).await {
                        tracing::error!(
                            error = %e,
                            activity_type = %activity.kind,
                            "Failed to persist activity"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Activity persistence lagged, some activities were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Activity bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, activity: &ActivityEvent) -> Result<DbId, sqlx::Error> {
        ActivityRepo::insert(
            pool,
            activity.kind.as_str(),
            &activity.details,
            activity.user_id,
            activity.event_id,
            &activity.payload,
            activity.timestamp,
        )
        .await
    }
}
