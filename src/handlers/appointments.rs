use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{authorize, Action};
use crate::database::models::{
    appointment::{self, Appointment},
    property, user,
};
use crate::database::{manager, payload, repository, Repository};
use crate::error::ApiError;
use crate::filter::{self, ListParams};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;

async fn repo() -> Result<Repository<Appointment>, ApiError> {
    Ok(Repository::new(appointment::TABLE, manager::pool().await?))
}

/// Storage has no FK constraints, so the referential invariants live here:
/// the agent must be a user, and the property (when given) must exist.
async fn check_references(
    pool: &sqlx::PgPool,
    agent_id: Option<Uuid>,
    property_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(agent_id) = agent_id {
        if !repository::row_exists(pool, user::TABLE, agent_id).await? {
            return Err(ApiError::validation("agent_id does not reference a user"));
        }
    }
    if let Some(property_id) = property_id {
        if !repository::row_exists(pool, property::TABLE, property_id).await? {
            return Err(ApiError::validation("property_id does not reference a property"));
        }
    }
    Ok(())
}

pub async fn list(
    Extension(who): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let query = filter::build(&appointment::LIST, &params)?;
    Ok(Json(repo().await?.list(query).await?))
}

pub async fn create(
    Extension(who): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let map = payload::as_object(&body)?;
    let cols = appointment::insert_columns(map)?;

    let agent_id = payload::required_id(map, "agent_id")?;
    let property_id = payload::optional_id(map, "property_id")?;

    let pool = manager::pool().await?;
    check_references(&pool, Some(agent_id), property_id).await?;

    let created = Repository::<Appointment>::new(appointment::TABLE, pool)
        .insert(cols)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    repo()
        .await?
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Appointment not found"))
}

pub async fn update(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Appointment>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    let map = payload::as_object(&body)?;
    let cols = appointment::update_columns(map)?;
    let (agent_id, property_id) = appointment::update_fk_targets(map)?;

    let pool = manager::pool().await?;
    check_references(&pool, agent_id, property_id).await?;

    Repository::<Appointment>::new(appointment::TABLE, pool)
        .update(id, cols)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Appointment not found"))
}

pub async fn delete(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    if !repo().await?.delete(id).await? {
        return Err(ApiError::not_found("Appointment not found"));
    }
    Ok(Json(json!({ "message": format!("Appointment {} deleted", id) })))
}
