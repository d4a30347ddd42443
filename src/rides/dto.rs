use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for POST /rides. Fields optional at the serde level so
/// missing input maps to a 400 with the error envelope.
#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    #[serde(default)]
    pub pickup: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub fare: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreatedRideResponse {
    #[serde(rename = "rideId")]
    pub ride_id: Uuid,
}

/// Request body for PATCH /rides/:id. Status arrives as a raw string and
/// is checked against the lifecycle vocabulary in the handler.
#[derive(Debug, Deserialize)]
pub struct UpdateRideStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
