use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::{authorize, Action};
use crate::database::models::client_document::{self, ClientDocument};
use crate::database::{manager, payload, Repository};
use crate::error::ApiError;
use crate::filter::{self, ListParams};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;

async fn repo() -> Result<Repository<ClientDocument>, ApiError> {
    Ok(Repository::new(client_document::TABLE, manager::pool().await?))
}

pub async fn list(
    Extension(who): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ClientDocument>>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let query = filter::build(&client_document::LIST, &params)?;
    Ok(Json(repo().await?.list(query).await?))
}

pub async fn create(
    Extension(who): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ClientDocument>), ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let cols = client_document::insert_columns(payload::as_object(&body)?)?;
    Ok((StatusCode::CREATED, Json(repo().await?.insert(cols).await?)))
}

pub async fn get(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ClientDocument>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    repo()
        .await?
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Document not found"))
}

pub async fn update(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ClientDocument>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    let cols = client_document::update_columns(payload::as_object(&body)?)?;
    repo()
        .await?
        .update(id, cols)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Document not found"))
}

pub async fn delete(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    if !repo().await?.delete(id).await? {
        return Err(ApiError::not_found("Document not found"));
    }
    Ok(Json(json!({ "message": format!("Document {} deleted", id) })))
}
