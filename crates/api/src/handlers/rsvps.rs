//! Handlers for the `/rsvps` resource.
//!
//! Member-facing RSVP routes are keyed by `/{user_id}/{event_id}`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clubhouse_core::pagination::Page;
use clubhouse_core::rsvp::RequestedStatus;
use clubhouse_core::types::DbId;
use clubhouse_db::models::rsvp::Rsvp;
use serde::Deserialize;

use crate::error::AppResult;
use crate::query::RsvpListParams;
use crate::state::AppState;

/// Request body for `PATCH /rsvps/{user_id}/{event_id}`.
///
/// `waitlisted` is not a [`RequestedStatus`], so such a body is rejected
/// before the handler runs.
#[derive(Debug, Deserialize)]
pub struct UpdateRsvpRequest {
    pub status: RequestedStatus,
}

/// GET /api/v1/rsvps
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RsvpListParams>,
) -> AppResult<Json<Page<Rsvp>>> {
    let (filter, page) = params.into_parts();
    let rsvps = state.engine.list_rsvps(&filter, page).await?;
    Ok(Json(rsvps))
}

/// POST /api/v1/rsvps/{user_id}/{event_id}
pub async fn create(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(DbId, DbId)>,
) -> AppResult<(StatusCode, Json<Rsvp>)> {
    let rsvp = state.engine.request_rsvp(event_id, user_id).await?;
    Ok((StatusCode::CREATED, Json(rsvp)))
}

/// PATCH /api/v1/rsvps/{user_id}/{event_id}
///
/// A waitlisted member asking for `going` is never moved ahead of earlier
/// waitlisted members. If a seat is free but someone else is next in line,
/// the response is 200 with the RSVP still `waitlisted`; callers should read
/// `status` rather than assume the request took effect.
pub async fn update(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRsvpRequest>,
) -> AppResult<Json<Rsvp>> {
    let rsvp = state
        .engine
        .update_rsvp(event_id, user_id, input.status)
        .await?;
    Ok(Json(rsvp))
}
