use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ExactFilter, FilterKind, ListSpec, SortOrder};

pub const TABLE: &str = "client_documents";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["document_name"],
    sortable: &["uploaded_at", "document_name"],
    default_sort: ("uploaded_at", SortOrder::Desc),
    filters: &[ExactFilter {
        param: "client_id",
        column: "client_id",
        kind: FilterKind::Id,
    }],
};

/// A document attached to a client file. Only the link is stored; the file
/// itself lives wherever `document_url` points.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientDocument {
    pub id: Uuid,
    pub client_id: Uuid,
    pub document_name: String,
    pub document_url: String,
    pub document_type: String,
    pub uploaded_at: DateTime<Utc>,
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let client_id = payload::required_id(map, "client_id")?;
    let document_name = payload::required_text(map, "document_name")?;
    let document_url = payload::required_url(map, "document_url")?;
    let document_type = payload::required_text(map, "document_type")?;

    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("client_id", SqlValue::Uuid(client_id));
    cols.push("document_name", SqlValue::Text(document_name));
    cols.push("document_url", SqlValue::Text(document_url));
    cols.push("document_type", SqlValue::Text(document_type));
    cols.push("uploaded_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "client_id",
        payload::id_update(map, "client_id")?.map(SqlValue::Uuid),
    );
    cols.push_opt(
        "document_name",
        payload::text_update(map, "document_name")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "document_url",
        payload::url_update(map, "document_url")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "document_type",
        payload::text_update(map, "document_type")?.map(SqlValue::Text),
    );
    Ok(cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: serde_json::Value) -> JsonMap {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn url_must_be_well_formed() {
        let m = map(json!({
            "client_id": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11",
            "document_name": "Proof of funds",
            "document_url": "not a url",
            "document_type": "pdf"
        }));
        assert!(matches!(
            insert_columns(&m),
            Err(PayloadError::BadUrl("document_url"))
        ));
    }

    #[test]
    fn url_is_revalidated_on_update() {
        assert!(update_columns(&map(json!({ "document_url": "ftp:" }))).is_err());
        let cols =
            update_columns(&map(json!({ "document_url": "https://files.example.com/1.pdf" })))
                .unwrap();
        assert_eq!(cols.names(), vec!["document_url"]);
    }
}
