use sqlx::PgPool;

use crate::users::repo::User;

pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, role, status,
               availability, car_make, car_plate, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

/// Inserts a new user. Email uniqueness is enforced by the store; the
/// unique-violation error surfaces to the caller as DuplicateEmail.
#[allow(clippy::too_many_arguments)]
pub async fn insert(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
    availability: Option<&str>,
    car_make: Option<&str>,
    car_plate: Option<&str>,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role, status, availability, car_make, car_plate)
        VALUES ($1, $2, $3, $4, 'active', $5, $6, $7)
        RETURNING id, name, email, password_hash, role, status,
                  availability, car_make, car_plate, created_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(availability)
    .bind(car_make)
    .bind(car_plate)
    .fetch_one(db)
    .await
}
