use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::services::{AdminOnly, AuthUser, DriverOnly};
use crate::error::{parse_id, ApiError};
use crate::state::AppState;
use crate::users::dto::{
    DriverAvailability, UpdateDriverStatusRequest, UpdatedResponse, UserResponse,
};
use crate::users::repo;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/drivers/:id/status", patch(update_driver_status))
}

/// Full directory of accounts, so admin-gated rather than merely
/// authenticated.
#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AdminOnly(_who): AdminOnly,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = repo::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    AuthUser(_who): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;
    let user = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, payload))]
async fn update_driver_status(
    State(state): State<AppState>,
    DriverOnly(who): DriverOnly,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDriverStatusRequest>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let id = parse_id(&id)?;
    let availability = payload
        .status
        .as_deref()
        .and_then(DriverAvailability::parse)
        .ok_or_else(|| ApiError::Validation("status must be available or unavailable".into()))?;

    let updated = repo::set_driver_availability(&state.db, id, availability.as_str()).await?;
    if updated == 0 {
        return Err(ApiError::NotFound("driver"));
    }

    info!(driver_id = %id, actor = %who.user_id, status = %availability.as_str(), "driver availability updated");
    Ok(Json(UpdatedResponse { updated }))
}
