// Authentication endpoints: login, logout, and the stateless password-reset
// flow. Reset links carry a purpose-bound JWT, so no reset state is stored.

use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::{self, AuthError, Claims, TokenPurpose};
use crate::config;
use crate::database::models::user::{self, User};
use crate::database::value::SqlValue;
use crate::database::{manager, payload, Repository};
use crate::error::ApiError;
use crate::mailer;
use crate::middleware::AuthUser;

fn required_body_text(body: &Value, field: &'static str) -> Result<String, ApiError> {
    let map = payload::as_object(body)?;
    Ok(payload::required_text(map, field)?)
}

/// POST /api/auth/login
///
/// The identifier may be a username or an email. Both bad-identifier and
/// bad-password fail identically so the response does not reveal whether the
/// account exists.
pub async fn login(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let map = payload::as_object(&body)?;
    let identifier = payload::required_text(map, "identifier")
        .or_else(|_| payload::required_text(map, "username"))
        .map_err(|_| ApiError::validation("identifier is required"))?;
    let password = payload::required_text(map, "password")?;

    let pool = manager::pool().await?;
    let found: Option<User> =
        sqlx::query_as("SELECT * FROM \"users\" WHERE \"username\" = $1 OR \"email\" = $1")
            .bind(&identifier)
            .fetch_optional(&pool)
            .await
            .map_err(crate::database::DatabaseError::from)?;

    let user = found.ok_or(AuthError::InvalidCredentials)?;
    if !auth::verify_password(&password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let claims = Claims::new(
        user.id,
        user.username.clone(),
        user.role,
        TokenPurpose::Session,
    );
    let token = auth::issue_token(&claims)?;

    tracing::info!("User {} logged in", user.username);
    Ok(Json(json!({ "token": token, "user": user })))
}

/// POST /api/auth/logout - nothing to revoke server-side; the middleware has
/// already required a valid token.
pub async fn logout(Extension(user): Extension<AuthUser>) -> Json<Value> {
    tracing::info!("User {} logged out", user.username);
    Json(json!({ "message": "Logged out" }))
}

/// POST /api/auth/forgot-password
///
/// Emails a signed, hour-limited reset link. The confirmation is the same
/// whether or not the address matches an account.
pub async fn forgot_password(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let email = required_body_text(&body, "email")?;

    let pool = manager::pool().await?;
    let found: Option<User> = sqlx::query_as("SELECT * FROM \"users\" WHERE \"email\" = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await
        .map_err(crate::database::DatabaseError::from)?;

    if let Some(user) = found {
        let claims = Claims::new(
            user.id,
            user.username.clone(),
            user.role,
            TokenPurpose::PasswordReset,
        );
        let token = auth::issue_token(&claims)?;
        let reset_url = format!(
            "{}/reset-password?token={}",
            config::config().server.frontend_url,
            token
        );
        mailer::send_password_reset(&user.email, &reset_url).await?;
    } else {
        tracing::info!("Password reset requested for unknown email");
    }

    Ok(Json(json!({
        "message": "If the account exists, a password reset link has been sent"
    })))
}

/// POST /api/auth/reset-password - redeems a reset token issued by
/// forgot-password and stores the new hash.
pub async fn reset_password(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let map = payload::as_object(&body)?;
    let token = payload::required_text(map, "token")?;
    let password = payload::required_text(map, "password")?;

    let claims = auth::verify_token(&token, TokenPurpose::PasswordReset)?;
    let hash = auth::hash_password(&password)?;

    let pool = manager::pool().await?;
    let repo: Repository<User> = Repository::new(user::TABLE, pool);

    let mut cols = crate::database::ColumnSet::new();
    cols.push("password_hash", SqlValue::Text(hash));
    cols.push("updated_at", SqlValue::Timestamp(chrono::Utc::now()));

    repo.update(claims.sub, cols)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!("Password reset for user {}", claims.username);
    Ok(Json(json!({ "message": "Password updated" })))
}
