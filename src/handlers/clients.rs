use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::{authorize, Action};
use crate::database::models::{
    client::{self, Client},
    client_document, communication_log, property_interest,
};
use crate::database::payload::JsonMap;
use crate::database::{manager, payload, repository, Repository};
use crate::error::ApiError;
use crate::filter::{self, ListParams};
use crate::handlers::parse_id;
use crate::middleware::AuthUser;

async fn repo() -> Result<Repository<Client>, ApiError> {
    Ok(Repository::new(client::TABLE, manager::pool().await?))
}

pub async fn list(
    Extension(who): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Client>>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let query = filter::build(&client::LIST, &params)?;
    Ok(Json(repo().await?.list(query).await?))
}

fn nested_object<'a>(
    map: &'a JsonMap,
    field: &'static str,
) -> Result<Option<&'a JsonMap>, ApiError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(_) => Err(ApiError::validation(format!("{} must be an object", field))),
    }
}

fn with_client_id(nested: &JsonMap, client_id: uuid::Uuid) -> JsonMap {
    let mut owned = nested.clone();
    owned.insert("client_id".into(), json!(client_id.to_string()));
    owned
}

/// POST /api/clients
///
/// Besides the client fields, the body may carry nested `property_interest`,
/// `communication_log` and `document` objects recorded during intake. All
/// rows commit in one transaction; a failure in any nested record rolls the
/// whole creation back.
pub async fn create(
    Extension(who): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let map = payload::as_object(&body)?;
    let cols = client::insert_columns(map)?;

    let interest = nested_object(map, "property_interest")?;
    let log = nested_object(map, "communication_log")?;
    let document = nested_object(map, "document")?;

    let pool = manager::pool().await?;
    let mut tx = pool
        .begin()
        .await
        .map_err(crate::database::DatabaseError::from)?;

    let created: Client = repository::insert_row(&mut *tx, client::TABLE, cols).await?;

    if let Some(nested) = interest {
        let cols = property_interest::insert_columns(&with_client_id(nested, created.id))?;
        repository::insert_row::<property_interest::PropertyInterest, _>(
            &mut *tx,
            property_interest::TABLE,
            cols,
        )
        .await?;
    }

    if let Some(nested) = log {
        let mut owned = with_client_id(nested, created.id);
        // The note is attributed to the creating user unless stated otherwise
        if !owned.contains_key("user_id") {
            owned.insert("user_id".into(), json!(who.id.to_string()));
        }
        let cols = communication_log::insert_columns(&owned)?;
        repository::insert_row::<communication_log::CommunicationLog, _>(
            &mut *tx,
            communication_log::TABLE,
            cols,
        )
        .await?;
    }

    if let Some(nested) = document {
        let cols = client_document::insert_columns(&with_client_id(nested, created.id))?;
        repository::insert_row::<client_document::ClientDocument, _>(
            &mut *tx,
            client_document::TABLE,
            cols,
        )
        .await?;
    }

    tx.commit().await.map_err(crate::database::DatabaseError::from)?;

    tracing::info!("Client {} {} created", created.first_name, created.last_name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Client>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    repo()
        .await?
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Client not found"))
}

pub async fn update(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Client>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    let cols = client::update_columns(payload::as_object(&body)?)?;
    repo()
        .await?
        .update(id, cols)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Client not found"))
}

/// DELETE /api/clients/:id - removes only the client row; interests,
/// appointments, logs and documents keep their client_id and stay behind.
pub async fn delete(
    Extension(who): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(who.role, Action::CrmReadWrite)?;
    let id = parse_id(&id)?;
    if !repo().await?.delete(id).await? {
        return Err(ApiError::not_found("Client not found"));
    }
    Ok(Json(json!({ "message": format!("Client {} deleted", id) })))
}
