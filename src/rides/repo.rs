use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::rides::services::NewRide;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ride {
    pub id: Uuid,
    pub passenger_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub pickup: String,
    pub destination: String,
    pub fare: f64,
    pub distance: Option<f64>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const RIDE_COLUMNS: &str =
    "id, passenger_id, driver_id, pickup, destination, fare, distance, status, created_at";

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Ride>> {
    sqlx::query_as::<_, Ride>(&format!(
        "SELECT {RIDE_COLUMNS} FROM rides ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Ride>> {
    sqlx::query_as::<_, Ride>(&format!("SELECT {RIDE_COLUMNS} FROM rides WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert(db: &PgPool, passenger_id: Uuid, ride: &NewRide) -> sqlx::Result<Ride> {
    sqlx::query_as::<_, Ride>(&format!(
        "INSERT INTO rides (passenger_id, pickup, destination, fare, distance, status)
         VALUES ($1, $2, $3, $4, $5, 'requested')
         RETURNING {RIDE_COLUMNS}"
    ))
    .bind(passenger_id)
    .bind(&ride.pickup)
    .bind(&ride.destination)
    .bind(ride.fare)
    .bind(ride.distance)
    .fetch_one(db)
    .await
}

/// Guarded by the expected current status: a concurrent transition makes
/// this a no-op and the caller re-reports.
pub async fn update_status(
    db: &PgPool,
    id: Uuid,
    expected: &str,
    new_status: &str,
    driver_id: Option<Uuid>,
) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE rides
         SET status = $2, driver_id = COALESCE($3, driver_id)
         WHERE id = $1 AND status = $4",
    )
    .bind(id)
    .bind(new_status)
    .bind(driver_id)
    .bind(expected)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM rides WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count(db: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rides")
        .fetch_one(db)
        .await
}
