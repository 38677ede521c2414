//! Handlers for the `/events` resource.
//!
//! Capacity edits and manual rebalancing go through the
//! [`RsvpEngine`](crate::engine::RsvpEngine); plain reads hit the
//! repositories directly.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clubhouse_activity::ActivityEvent;
use clubhouse_core::activity::{event_created_details, ActivityKind};
use clubhouse_core::error::CoreError;
use clubhouse_core::pagination::Page;
use clubhouse_core::types::DbId;
use clubhouse_db::models::event::{CreateEvent, Event, UpdateEvent};
use clubhouse_db::models::rsvp::Rsvp;
use clubhouse_db::repositories::{EventRepo, RsvpRepo};

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/events
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<Event>)> {
    input.validate()?;
    let event = EventRepo::create(&state.pool, &input).await?;

    tracing::info!(
        event_id = %event.id,
        max_attendees = event.max_attendees,
        "Event created"
    );

    let mut activity =
        ActivityEvent::new(ActivityKind::EventCreated, event_created_details(&event.title))
            .with_event(event.id);
    if let Some(host_id) = event.host_id {
        activity = activity.with_user(host_id);
    }
    state.activity.publish(activity);

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/v1/events
///
/// Paginated list, soonest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Page<Event>>> {
    let page = params.page_request();
    let items = EventRepo::list(&state.pool, page).await?;
    let total = EventRepo::count(&state.pool).await?;
    Ok(Json(Page::new(items, total, page)))
}

/// GET /api/v1/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let event = find_event(&state, id).await?;
    Ok(Json(event))
}

/// PATCH /api/v1/events/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<Event>> {
    let event = state.engine.edit_event(id, &input).await?;
    Ok(Json(event))
}

/// GET /api/v1/events/{id}/rsvps
///
/// Full roster in priority order.
pub async fn list_rsvps(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Rsvp>>> {
    find_event(&state, id).await?;
    let rsvps = RsvpRepo::list_by_event(&state.pool, id).await?;
    Ok(Json(rsvps))
}

/// POST /api/v1/events/{id}/rebalance
///
/// Returns the RSVPs whose status changed.
pub async fn rebalance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Rsvp>>>> {
    let changed = state.engine.rebalance_waitlist(id).await?;
    Ok(Json(DataResponse { data: changed }))
}

async fn find_event(state: &AppState, id: DbId) -> AppResult<Event> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Event", id))?;
    Ok(event)
}
