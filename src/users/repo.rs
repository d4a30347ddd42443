use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the store. Role, status and availability are kept as
/// text columns; the typed enums live in the dto modules.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub availability: Option<String>,
    pub car_make: Option<String>,
    pub car_plate: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, status, \
     availability, car_make, car_plate, created_at";

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Scoped to driver records so the endpoint cannot repurpose a
/// passenger/admin row that happens to share the id shape.
pub async fn set_driver_availability(
    db: &PgPool,
    id: Uuid,
    availability: &str,
) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE users SET availability = $2 WHERE id = $1 AND role = 'driver'")
        .bind(id)
        .bind(availability)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(db: &PgPool, id: Uuid, status: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count(db: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await
}
