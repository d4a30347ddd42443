use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "ridehail".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "ridehail-users".into()),
            ttl_minutes: ttl_minutes_or_default(std::env::var("JWT_TTL_MINUTES").ok()),
        };
        Ok(Self { database_url, jwt })
    }
}

/// Token lifetime must be positive; unparsable or non-positive values fall
/// back to the default rather than wrapping into a huge TTL downstream.
fn ttl_minutes_or_default(raw: Option<String>) -> i64 {
    raw.and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(60)
}
