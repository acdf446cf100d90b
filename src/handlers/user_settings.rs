use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::{authorize, Action};
use crate::database::models::user_settings::{self, UserSettings};
use crate::database::value::SqlValue;
use crate::database::{manager, payload, Repository};
use crate::error::ApiError;
use crate::filter::{self, ListParams};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;

async fn repo() -> Result<Repository<UserSettings>, ApiError> {
    Ok(Repository::new(user_settings::TABLE, manager::pool().await?))
}

pub async fn list(
    Extension(who): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserSettings>>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let query = filter::build(&user_settings::LIST, &params)?;
    Ok(Json(repo().await?.list(query).await?))
}

/// POST /api/user-settings - one row per user; a second create for the same
/// user is a validation error, not an upsert.
pub async fn create(
    Extension(who): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<UserSettings>), ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let map = payload::as_object(&body)?;
    let user_id = payload::required_id(map, "user_id")?;
    let cols = user_settings::insert_columns(map)?;

    let repo = repo().await?;
    if repo.find_by("user_id", SqlValue::Uuid(user_id)).await?.is_some() {
        return Err(ApiError::validation("Settings already exist for this user"));
    }
    Ok((StatusCode::CREATED, Json(repo.insert(cols).await?)))
}

pub async fn get(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<UserSettings>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    repo()
        .await?
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Settings not found"))
}

pub async fn update(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<UserSettings>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    let cols = user_settings::update_columns(payload::as_object(&body)?)?;
    repo()
        .await?
        .update(id, cols)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Settings not found"))
}

pub async fn delete(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    if !repo().await?.delete(id).await? {
        return Err(ApiError::not_found("Settings not found"));
    }
    Ok(Json(json!({ "message": format!("Settings {} deleted", id) })))
}
