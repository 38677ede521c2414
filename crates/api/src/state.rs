use std::sync::Arc;

use clubhouse_activity::ActivityBus;

use crate::config::ServerConfig;
use crate::engine::RsvpEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: clubhouse_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Activity bus for publishing club activity.
    pub activity: Arc<ActivityBus>,
    /// RSVP admission engine.
    pub engine: Arc<RsvpEngine>,
}

impl AppState {
    /// Wire the engine to the same pool and activity bus the handlers use.
    pub fn new(
        pool: clubhouse_db::DbPool,
        config: ServerConfig,
        activity: Arc<ActivityBus>,
    ) -> Self {
        let engine = Arc::new(RsvpEngine::new(pool.clone(), Arc::clone(&activity)));
        Self {
            pool,
            config: Arc::new(config),
            activity,
            engine,
        }
    }
}
