use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::admin::dto::{AnalyticsResponse, UpdatedResponse};
use crate::auth::services::AdminOnly;
use crate::error::{parse_id, ApiError};
use crate::state::AppState;
use crate::{rides, users};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users/:id/block", post(block_user))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/analytics", get(analytics))
}

/// Soft delete: the record stays, the account stops working at next login.
#[instrument(skip(state))]
async fn block_user(
    State(state): State<AppState>,
    AdminOnly(who): AdminOnly,
    Path(id): Path<String>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let id = parse_id(&id)?;
    let updated = users::repo::set_status(&state.db, id, "blocked").await?;
    if updated == 0 {
        return Err(ApiError::NotFound("user"));
    }
    info!(target = %id, admin = %who.user_id, "user blocked");
    Ok(Json(UpdatedResponse { updated }))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AdminOnly(who): AdminOnly,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let deleted = users::repo::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("user"));
    }
    info!(target = %id, admin = %who.user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn analytics(
    State(state): State<AppState>,
    AdminOnly(_who): AdminOnly,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let total_users = users::repo::count(&state.db).await?;
    let total_rides = rides::repo::count(&state.db).await?;
    Ok(Json(AnalyticsResponse {
        total_users,
        total_rides,
    }))
}
