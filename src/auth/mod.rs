pub mod password;
pub mod policy;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

pub use password::{hash_password, verify_password};
pub use policy::{authorize, Action, Role};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token purpose does not match this endpoint")]
    WrongPurpose,

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("password hash error: {0}")]
    Hash(String),
}

/// What a signed token may be redeemed for. Session tokens drive the API;
/// reset tokens are only accepted by the password-reset endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String, role: Role, purpose: TokenPurpose) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.token_expiry_hours;
        Self {
            sub: user_id,
            username,
            role,
            purpose,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

/// Sign a token for the given claims with the configured HS256 secret.
pub fn issue_token(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::InvalidToken("JWT secret not configured".into()));
    }
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Validate signature and expiry, and require the expected purpose.
pub fn verify_token(token: &str, purpose: TokenPurpose) -> Result<Claims, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::InvalidToken("JWT secret not configured".into()));
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    if data.claims.purpose != purpose {
        return Err(AuthError::WrongPurpose);
    }
    Ok(data.claims)
}
