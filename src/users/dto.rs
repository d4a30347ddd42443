use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::CarDetails;
use crate::users::repo::User;

/// Driver availability values accepted by PATCH /drivers/:id/status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverAvailability {
    Available,
    Unavailable,
}

impl DriverAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverAvailability::Available => "available",
            DriverAvailability::Unavailable => "unavailable",
        }
    }

    pub fn parse(s: &str) -> Option<DriverAvailability> {
        match s {
            "available" => Some(DriverAvailability::Available),
            "unavailable" => Some(DriverAvailability::Unavailable),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDriverStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Public view of a user; the password hash never leaves the repo layer.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_details: Option<CarDetails>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let car_details = match (u.car_make, u.car_plate) {
            (Some(make), Some(plate)) => Some(CarDetails { make, plate }),
            _ => None,
        };
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            status: u.status,
            availability: u.availability,
            car_details,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}
