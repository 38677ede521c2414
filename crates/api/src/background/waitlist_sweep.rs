//! Periodic waitlist reconciliation.
//!
//! Request handlers rebalance synchronously, so in steady state this finds
//! nothing. It catches events left out of balance by anything that bypassed
//! the engine, such as a manual capacity fix in the database.

use std::sync::Arc;
use std::time::Duration;

use clubhouse_db::repositories::EventRepo;
use clubhouse_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::engine::RsvpEngine;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    engine: Arc<RsvpEngine>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "Waitlist sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Waitlist sweep stopping");
                break;
            }
            _ = interval.tick() => {
                sweep_once(&pool, &engine).await;
            }
        }
    }
}

/// Rebalance every event currently out of balance. Returns the number of
/// RSVPs whose status changed.
///
/// A failure on one event is logged and the sweep moves on.
pub async fn sweep_once(pool: &DbPool, engine: &RsvpEngine) -> usize {
    let event_ids = match EventRepo::list_ids_needing_rebalance(pool).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "Waitlist sweep: scan failed");
            return 0;
        }
    };

    if event_ids.is_empty() {
        tracing::debug!("Waitlist sweep: all events balanced");
        return 0;
    }

    let mut changed = 0;
    for event_id in event_ids {
        match engine.rebalance_waitlist(event_id).await {
            Ok(moved) => changed += moved.len(),
            Err(e) => {
                tracing::error!(error = %e, event_id = %event_id, "Waitlist sweep: rebalance failed");
            }
        }
    }

    tracing::info!(changed, "Waitlist sweep: rebalanced events");
    changed
}
