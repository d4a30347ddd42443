use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::dto::Role;
use crate::auth::services::{AuthUser, PassengerOnly};
use crate::error::{parse_id, ApiError};
use crate::rides::dto::{
    CreateRideRequest, CreatedRideResponse, DeletedResponse, UpdateRideStatusRequest,
    UpdatedResponse,
};
use crate::rides::repo::{self, Ride};
use crate::rides::services::{validate_create, RideStatus};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/rides", get(list_rides))
        .route("/rides/:id", get(get_ride))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/rides", axum::routing::post(create_ride))
        .route(
            "/rides/:id",
            axum::routing::patch(update_ride_status).delete(delete_ride),
        )
}

#[instrument(skip(state))]
async fn list_rides(
    State(state): State<AppState>,
    AuthUser(_who): AuthUser,
) -> Result<Json<Vec<Ride>>, ApiError> {
    let rides = repo::list(&state.db).await?;
    Ok(Json(rides))
}

#[instrument(skip(state))]
async fn get_ride(
    State(state): State<AppState>,
    AuthUser(_who): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Ride>, ApiError> {
    let id = parse_id(&id)?;
    let ride = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("ride"))?;
    Ok(Json(ride))
}

#[instrument(skip(state, payload))]
async fn create_ride(
    State(state): State<AppState>,
    PassengerOnly(who): PassengerOnly,
    Json(payload): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<CreatedRideResponse>), ApiError> {
    let new_ride = validate_create(payload)?;
    let ride = repo::insert(&state.db, who.user_id, &new_ride).await?;

    info!(ride_id = %ride.id, passenger_id = %who.user_id, "ride requested");
    Ok((
        StatusCode::CREATED,
        Json(CreatedRideResponse { ride_id: ride.id }),
    ))
}

#[instrument(skip(state, payload))]
async fn update_ride_status(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRideStatusRequest>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let id = parse_id(&id)?;
    let new_status = payload
        .status
        .as_deref()
        .and_then(RideStatus::parse)
        .ok_or_else(|| ApiError::Validation("status must be one of the ride lifecycle values".into()))?;

    let ride = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("ride"))?;
    let current = RideStatus::parse(&ride.status)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unknown stored ride status")))?;

    // Re-sending the current status is an idempotent no-op.
    if current == new_status {
        return Ok(Json(UpdatedResponse { updated: 0 }));
    }
    if !current.can_transition(new_status) {
        return Err(ApiError::Validation(format!(
            "cannot move ride from {} to {}",
            current.as_str(),
            new_status.as_str()
        )));
    }

    // A driver taking the assignment step becomes the ride's driver.
    let driver_id = (new_status == RideStatus::Assigned && who.role == Role::Driver)
        .then_some(who.user_id);

    let updated =
        repo::update_status(&state.db, id, current.as_str(), new_status.as_str(), driver_id)
            .await?;
    if updated == 0 {
        // Status moved underneath us between the read and the write.
        return Err(ApiError::Validation(
            "ride status changed concurrently, retry".into(),
        ));
    }

    info!(ride_id = %id, from = %current.as_str(), to = %new_status.as_str(), "ride status updated");
    Ok(Json(UpdatedResponse { updated }))
}

#[instrument(skip(state))]
async fn delete_ride(
    State(state): State<AppState>,
    AuthUser(_who): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = repo::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("ride"));
    }
    info!(ride_id = %id, "ride deleted");
    Ok(Json(DeletedResponse { deleted }))
}
