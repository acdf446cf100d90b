// Bulk client transfer endpoints: spreadsheet upload and CSV download.

use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};

use crate::auth::{authorize, Action};
use crate::database::models::client::{self, Client};
use crate::database::{manager, Repository};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::transfer;

/// POST /api/clients/import - multipart upload with the workbook in a `file`
/// field. All rows insert in one transaction; any invalid row fails the
/// upload with the offending spreadsheet row number.
pub async fn import(
    Extension(who): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<Client>>), ApiError> {
    authorize(who.role, Action::BulkTransfer)?;

    let mut file_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            file_bytes = Some(bytes.to_vec());
            break;
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::validation("file is required"))?;

    let pool = manager::pool().await?;
    let created = transfer::import_clients(&pool, &bytes).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/clients/export - all clients, oldest first, as an attached CSV.
pub async fn export(
    Extension(who): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(who.role, Action::BulkTransfer)?;

    let repo: Repository<Client> = Repository::new(client::TABLE, manager::pool().await?);
    let clients = repo.all_ordered("created_at").await?;
    let csv = transfer::export_clients_csv(&clients)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"clients.csv\"",
            ),
        ],
        csv,
    ))
}
