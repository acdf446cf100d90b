use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::{self, authorize, Action};
use crate::database::models::user::{self, User};
use crate::database::{manager, payload, Repository};
use crate::error::ApiError;
use crate::filter::{self, ListParams};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;

async fn repo() -> Result<Repository<User>, ApiError> {
    Ok(Repository::new(user::TABLE, manager::pool().await?))
}

pub async fn list(
    Extension(who): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    authorize(who.role, Action::ReadUsers)?;
    let query = filter::build(&user::LIST, &params)?;
    Ok(Json(repo().await?.list(query).await?))
}

pub async fn create(
    Extension(who): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    authorize(who.role, Action::CreateUser)?;
    let map = payload::as_object(&body)?;

    let password = payload::required_text(map, "password")?;
    let hash = auth::hash_password(&password)?;
    let cols = user::insert_columns(map, hash)?;

    let created = repo().await?.insert(cols).await?;
    tracing::info!("User {} created by {}", created.username, who.username);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    authorize(who.role, Action::ReadUsers)?;
    let id = parse_id(&id)?;
    repo()
        .await?
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn update(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<User>, ApiError> {
    authorize(who.role, Action::UpdateUser)?;
    let id = parse_id(&id)?;
    let map = payload::as_object(&body)?;

    // A present, non-empty password re-hashes; empty or absent leaves the
    // stored hash alone, like any other required string field
    let hash = match payload::text_update(map, "password")? {
        Some(plaintext) => Some(auth::hash_password(&plaintext)?),
        None => None,
    };
    let cols = user::update_columns(map, hash)?;

    repo()
        .await?
        .update(id, cols)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn delete(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(who.role, Action::DeleteUser)?;
    let id = parse_id(&id)?;

    if !repo().await?.delete(id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!("User {} deleted by {}", id, who.username);
    Ok(Json(json!({ "message": format!("User {} deleted", id) })))
}
