use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{
    CarDetails, JwtKeys, LoginRequest, RegisterRequest, RegisterResponse, Role, TokenResponse,
};
use crate::auth::repo;
use crate::auth::services::{hash_password, is_valid_email, verify_password};
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/auth/login", post(login))
}

struct RegisterInput {
    name: String,
    email: String,
    password: String,
    role: Role,
    car_details: Option<CarDetails>,
}

fn validate_register(payload: RegisterRequest) -> Result<RegisterInput, ApiError> {
    let name = payload
        .name
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("name is required".into()))?;

    let email = payload
        .email
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("email is required".into()))?;
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("invalid email".into()));
    }

    let password = payload
        .password
        .ok_or_else(|| ApiError::Validation("password is required".into()))?;
    if password.len() < 8 {
        return Err(ApiError::Validation("password too short".into()));
    }

    let role = payload
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or_else(|| {
            ApiError::Validation("role must be passenger, driver or admin".into())
        })?;

    let car_details = match (role, payload.car_details) {
        (Role::Driver, Some(car))
            if !car.make.trim().is_empty() && !car.plate.trim().is_empty() =>
        {
            Some(car)
        }
        (Role::Driver, _) => {
            return Err(ApiError::Validation(
                "drivers must supply car_details.make and car_details.plate".into(),
            ));
        }
        (_, _) => None,
    };

    Ok(RegisterInput {
        name,
        email,
        password,
        role,
        car_details,
    })
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let input = validate_register(payload)?;

    let hash = hash_password(&input.password)?;
    let (car_make, car_plate) = match &input.car_details {
        Some(car) => (Some(car.make.as_str()), Some(car.plate.as_str())),
        None => (None, None),
    };
    // Fresh drivers start out available.
    let availability = (input.role == Role::Driver).then_some("available");

    let user = repo::insert(
        &state.db,
        &input.name,
        &input.email,
        &hash,
        input.role.as_str(),
        availability,
        car_make,
        car_plate,
    )
    .await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id: user.id }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = payload
        .email
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::InvalidCredentials)?;
    let password = payload.password.ok_or(ApiError::InvalidCredentials)?;

    // Unknown email and wrong password report identically.
    let user = repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if user.status == "blocked" {
        warn!(user_id = %user.id, "login attempt on blocked account");
        return Err(ApiError::Forbidden);
    }

    let role = Role::parse(&user.role)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unknown stored role")))?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
