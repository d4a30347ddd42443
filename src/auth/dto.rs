use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Access role carried inside the token and on the user record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Passenger,
    Driver,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Passenger => "passenger",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "passenger" => Some(Role::Passenger),
            "driver" => Some(Role::Driver),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// JWT payload: identity plus the role it was issued with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // user ID
    pub role: Role,   // role at issue time
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,  // issuer
    pub aud: String,  // audience
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

/// Identity attached to a request after token verification.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// Driver-only car details, required at registration when role = driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarDetails {
    pub make: String,
    pub plate: String,
}

/// Request body for user registration. Fields are optional at the serde
/// level so missing input surfaces as a 400 with the error envelope.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub car_details: Option<CarDetails>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
