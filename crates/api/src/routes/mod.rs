pub mod activity;
pub mod events;
pub mod health;
pub mod rsvps;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                                  create
/// /users/{id}                             get
///
/// /events                                 list, create
/// /events/{id}                            get, update (PATCH)
/// /events/{id}/rsvps                      roster in priority order
/// /events/{id}/rebalance                  rebalance waitlist (POST)
///
/// /rsvps                                  filtered, paginated list
/// /rsvps/{user_id}/{event_id}             request (POST), update (PATCH)
///
/// /activity                               activity feed
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/events", events::router())
        .nest("/rsvps", rsvps::router())
        .nest("/activity", activity::router())
}
