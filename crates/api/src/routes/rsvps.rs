//! Route definitions for RSVPs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rsvps;
use crate::state::AppState;

/// Routes mounted at `/rsvps`.
///
/// ```text
/// GET    /                       list
/// POST   /{user_id}/{event_id}   create
/// PATCH  /{user_id}/{event_id}   update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rsvps::list))
        .route(
            "/{user_id}/{event_id}",
            post(rsvps::create).patch(rsvps::update),
        )
}
