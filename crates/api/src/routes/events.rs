//! Route definitions for club events.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                  list
/// POST   /                  create
/// GET    /{id}              get_by_id
/// PATCH  /{id}              update
/// GET    /{id}/rsvps        list_rsvps
/// POST   /{id}/rebalance    rebalance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list).post(events::create))
        .route("/{id}", get(events::get_by_id).patch(events::update))
        .route("/{id}/rsvps", get(events::list_rsvps))
        .route("/{id}/rebalance", post(events::rebalance))
}
