use crate::auth::dto::{Claims, Identity, JwtKeys, Role};
use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, role = ?role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, role = ?data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts and validates the bearer token, attaching the caller's identity.
/// Every failure mode is a 401 with the same generic message.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(ApiError::InvalidToken)?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                // Do not distinguish expiry from signature failure.
                warn!("invalid or expired token");
                return Err(ApiError::InvalidToken);
            }
        };

        Ok(AuthUser(Identity {
            user_id: claims.sub,
            role: claims.role,
        }))
    }
}

async fn require_role<S>(parts: &mut Parts, state: &S, allowed: &[Role]) -> Result<Identity, ApiError>
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    let AuthUser(who) = AuthUser::from_request_parts(parts, state).await?;
    if !allowed.contains(&who.role) {
        warn!(user_id = %who.user_id, role = ?who.role, "role not permitted");
        return Err(ApiError::Forbidden);
    }
    Ok(who)
}

/// Role gate: passenger endpoints (ride creation).
pub struct PassengerOnly(pub Identity);

/// Role gate: driver endpoints (availability updates).
pub struct DriverOnly(pub Identity);

/// Role gate: admin endpoints (block, delete, analytics).
pub struct AdminOnly(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for PassengerOnly
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(PassengerOnly(
            require_role(parts, state, &[Role::Passenger]).await?,
        ))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for DriverOnly
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(DriverOnly(
            require_role(parts, state, &[Role::Driver]).await?,
        ))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(AdminOnly(require_role(parts, state, &[Role::Admin]).await?))
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn hash_is_never_plaintext() {
        let hash = hash_password("plain-secret").expect("hashing should succeed");
        assert!(!hash.contains("plain-secret"));
        assert!(hash.starts_with("$argon2"));
    }
}

#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_returns_identity() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, Role::Driver).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Driver);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn verify_rejects_token_signed_with_other_secret() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other-secret"),
            decoding: DecodingKey::from_secret(b"other-secret"),
            issuer: keys.issuer.clone(),
            audience: keys.audience.clone(),
            ttl: keys.ttl,
        };
        let token = other.sign(Uuid::new_v4(), Role::Passenger).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        // Expired well past the default 60s validation leeway.
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::Passenger,
            iat: (now - TimeDuration::minutes(10)).unix_timestamp() as usize,
            exp: (now - TimeDuration::minutes(5)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_malformed_token() {
        let keys = make_keys();
        assert!(keys.verify("definitely.not.a-jwt").is_err());
    }
}

#[cfg(test)]
mod extractor_tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};

    fn parts_with_header(value: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(()).expect("request").into_parts().0
    }

    fn token_for(state: &AppState, role: Role) -> String {
        let keys = JwtKeys::from_ref(state);
        keys.sign(Uuid::new_v4(), role).expect("sign")
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_header(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz".into()));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, Role::Passenger).expect("sign");
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));
        let AuthUser(who) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("accepted");
        assert_eq!(who.user_id, user_id);
        assert_eq!(who.role, Role::Passenger);
    }

    #[tokio::test]
    async fn admin_gate_rejects_other_roles() {
        let state = AppState::fake();
        for role in [Role::Passenger, Role::Driver] {
            let token = token_for(&state, role);
            let mut parts = parts_with_header(Some(format!("Bearer {token}")));
            let err = AdminOnly::from_request_parts(&mut parts, &state)
                .await
                .err()
                .expect("rejected");
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn passenger_gate_rejects_driver() {
        let state = AppState::fake();
        let token = token_for(&state, Role::Driver);
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));
        let err = PassengerOnly::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn driver_gate_accepts_driver() {
        let state = AppState::fake();
        let token = token_for(&state, Role::Driver);
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));
        assert!(DriverOnly::from_request_parts(&mut parts, &state)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn gate_without_token_is_unauthorized_not_forbidden() {
        let state = AppState::fake();
        let mut parts = parts_with_header(None);
        let err = AdminOnly::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("rider@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
