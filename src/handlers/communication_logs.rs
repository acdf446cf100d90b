use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::{authorize, Action};
use crate::database::models::communication_log::{self, CommunicationLog};
use crate::database::{manager, payload, Repository};
use crate::error::ApiError;
use crate::filter::{self, ListParams};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;

async fn repo() -> Result<Repository<CommunicationLog>, ApiError> {
    Ok(Repository::new(communication_log::TABLE, manager::pool().await?))
}

pub async fn list(
    Extension(who): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CommunicationLog>>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let query = filter::build(&communication_log::LIST, &params)?;
    Ok(Json(repo().await?.list(query).await?))
}

pub async fn create(
    Extension(who): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CommunicationLog>), ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let map = payload::as_object(&body)?;

    // Attribute the note to the caller unless the body names someone else
    let mut owned = map.clone();
    if !owned.contains_key("user_id") {
        owned.insert("user_id".into(), json!(who.id.to_string()));
    }
    let cols = communication_log::insert_columns(&owned)?;
    Ok((StatusCode::CREATED, Json(repo().await?.insert(cols).await?)))
}

pub async fn get(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CommunicationLog>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    repo()
        .await?
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Communication log not found"))
}

pub async fn update(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<CommunicationLog>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    let cols = communication_log::update_columns(payload::as_object(&body)?)?;
    repo()
        .await?
        .update(id, cols)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Communication log not found"))
}

pub async fn delete(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    if !repo().await?.delete(id).await? {
        return Err(ApiError::not_found("Communication log not found"));
    }
    Ok(Json(json!({ "message": format!("Communication log {} deleted", id) })))
}
