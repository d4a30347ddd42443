use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::rides::dto::CreateRideRequest;

/// Ride lifecycle vocabulary. The store keeps these as text; anything
/// outside this set is rejected before it reaches the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Requested,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Requested => "requested",
            RideStatus::Assigned => "assigned",
            RideStatus::InProgress => "in_progress",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<RideStatus> {
        match s {
            "requested" => Some(RideStatus::Requested),
            "assigned" => Some(RideStatus::Assigned),
            "in_progress" => Some(RideStatus::InProgress),
            "completed" => Some(RideStatus::Completed),
            "cancelled" => Some(RideStatus::Cancelled),
            _ => None,
        }
    }

    /// Transition table. Completed and cancelled are terminal.
    pub fn can_transition(self, to: RideStatus) -> bool {
        use RideStatus::*;
        matches!(
            (self, to),
            (Requested, Assigned)
                | (Requested, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

/// Validated ride-creation input.
#[derive(Debug)]
pub struct NewRide {
    pub pickup: String,
    pub destination: String,
    pub fare: f64,
    pub distance: Option<f64>,
}

pub fn validate_create(req: CreateRideRequest) -> Result<NewRide, ApiError> {
    let pickup = req
        .pickup
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("pickup is required".into()))?;
    let destination = req
        .destination
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("destination is required".into()))?;
    let fare = req
        .fare
        .ok_or_else(|| ApiError::Validation("fare is required".into()))?;
    if !fare.is_finite() || fare < 0.0 {
        return Err(ApiError::Validation("fare must be a non-negative number".into()));
    }

    Ok(NewRide {
        pickup,
        destination,
        fare,
        distance: req.distance,
    })
}


#[cfg(test)]
mod validate_tests {
    use super::*;
    use axum::http::StatusCode;

    fn valid_request() -> CreateRideRequest {
        CreateRideRequest {
            pickup: Some("A".into()),
            destination: Some("B".into()),
            fare: Some(10.0),
            distance: None,
        }
    }

    #[test]
    fn accepts_valid_input_without_distance() {
        let ride = validate_create(valid_request()).expect("valid");
        assert_eq!(ride.pickup, "A");
        assert_eq!(ride.destination, "B");
        assert_eq!(ride.fare, 10.0);
        assert!(ride.distance.is_none());
    }

    #[test]
    fn missing_or_empty_pickup_is_rejected() {
        let mut req = valid_request();
        req.pickup = None;
        assert_eq!(
            validate_create(req).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );

        let mut req = valid_request();
        req.pickup = Some("   ".into());
        assert!(validate_create(req).is_err());
    }

    #[test]
    fn missing_destination_or_fare_is_rejected() {
        let mut req = valid_request();
        req.destination = Some(String::new());
        assert!(validate_create(req).is_err());

        let mut req = valid_request();
        req.fare = None;
        assert!(validate_create(req).is_err());
    }

    #[test]
    fn negative_fare_is_rejected() {
        let mut req = valid_request();
        req.fare = Some(-1.0);
        assert!(validate_create(req).is_err());
    }
}
