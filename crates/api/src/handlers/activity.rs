//! Handler for the `/activity` feed.

use axum::extract::{Query, State};
use axum::Json;
use clubhouse_core::pagination::Page;
use clubhouse_db::models::activity::ActivityLog;
use clubhouse_db::repositories::ActivityRepo;

use crate::error::AppResult;
use crate::query::ActivityListParams;
use crate::state::AppState;

/// GET /api/v1/activity
///
/// Newest first. Activity is written asynchronously, so an entry may lag
/// the operation that produced it.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ActivityListParams>,
) -> AppResult<Json<Page<ActivityLog>>> {
    let (filter, page) = params.into_parts();
    let items = ActivityRepo::list(&state.pool, &filter, page).await?;
    let total = ActivityRepo::count(&state.pool, &filter).await?;
    Ok(Json(Page::new(items, total, page)))
}
