use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ListSpec, SortOrder};

pub const TABLE: &str = "clients";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["first_name", "last_name", "email"],
    sortable: &["created_at", "first_name", "last_name", "email", "status"],
    default_sort: ("created_at", SortOrder::Desc),
    filters: &[],
};

/// Field order here defines the JSON shape and the CSV export column order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: String,
    pub additional_details: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let first_name = payload::required_text(map, "first_name")?;
    let last_name = payload::required_text(map, "last_name")?;
    let email = payload::required_text(map, "email")?;
    let phone = payload::required_text(map, "phone")?;
    let address = payload::required_text(map, "address")?;
    let status = payload::required_text(map, "status")?;

    let now = Utc::now();
    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("first_name", SqlValue::Text(first_name));
    cols.push("last_name", SqlValue::Text(last_name));
    cols.push("email", SqlValue::Text(email));
    cols.push("phone", SqlValue::Text(phone));
    cols.push("address", SqlValue::Text(address));
    cols.push("status", SqlValue::Text(status));
    cols.push(
        "additional_details",
        SqlValue::Json(payload::optional_json(map, "additional_details")),
    );
    cols.push("created_at", SqlValue::Timestamp(now));
    cols.push("updated_at", SqlValue::Timestamp(now));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "first_name",
        payload::text_update(map, "first_name")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "last_name",
        payload::text_update(map, "last_name")?.map(SqlValue::Text),
    );
    cols.push_opt("email", payload::text_update(map, "email")?.map(SqlValue::Text));
    cols.push_opt("phone", payload::text_update(map, "phone")?.map(SqlValue::Text));
    cols.push_opt(
        "address",
        payload::text_update(map, "address")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "status",
        payload::text_update(map, "status")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "additional_details",
        payload::json_update(map, "additional_details").map(SqlValue::Json),
    );
    cols.push("updated_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}
