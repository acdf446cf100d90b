use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ListSpec, SortOrder};

pub const TABLE: &str = "properties";

// Properties are the one collection browsed oldest-first by default
pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["address", "property_type"],
    sortable: &["created_at", "address", "price", "status"],
    default_sort: ("created_at", SortOrder::Asc),
    filters: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: Uuid,
    pub address: String,
    pub property_type: String,
    pub price: Decimal,
    pub status: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let address = payload::required_text(map, "address")?;
    let property_type = payload::required_text(map, "property_type")?;
    let price = payload::required_decimal(map, "price")?;
    let status = payload::required_text(map, "status")?;
    let description = payload::optional_text(map, "description")?;

    let now = Utc::now();
    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("address", SqlValue::Text(address));
    cols.push("property_type", SqlValue::Text(property_type));
    cols.push("price", SqlValue::Decimal(price));
    cols.push("status", SqlValue::Text(status));
    cols.push("description", SqlValue::NullableText(description));
    cols.push("created_at", SqlValue::Timestamp(now));
    cols.push("updated_at", SqlValue::Timestamp(now));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "address",
        payload::text_update(map, "address")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "property_type",
        payload::text_update(map, "property_type")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "price",
        payload::decimal_update(map, "price")?.map(SqlValue::Decimal),
    );
    cols.push_opt(
        "status",
        payload::text_update(map, "status")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "description",
        payload::nullable_text_update(map, "description")?.map(SqlValue::NullableText),
    );
    cols.push("updated_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}
