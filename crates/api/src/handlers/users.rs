//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use clubhouse_activity::ActivityEvent;
use clubhouse_core::activity::{user_joined_details, ActivityKind};
use clubhouse_core::error::CoreError;
use clubhouse_core::types::DbId;
use clubhouse_db::models::user::{CreateUser, User};
use clubhouse_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    input.validate()?;
    let user = UserRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    state.activity.publish(
        ActivityEvent::new(ActivityKind::UserJoined, user_joined_details(&user.username))
            .with_user(user.id),
    );

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<User>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    Ok(Json(user))
}
