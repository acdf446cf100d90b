use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ExactFilter, FilterKind, ListSpec, SortOrder};

pub const TABLE: &str = "property_interests";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["preferred_location", "property_type"],
    sortable: &["created_at", "preferred_location"],
    default_sort: ("created_at", SortOrder::Desc),
    filters: &[ExactFilter {
        param: "client_id",
        column: "client_id",
        kind: FilterKind::Id,
    }],
};

/// A client's standing search brief: what they are looking for and in what
/// price band.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PropertyInterest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub property_type: String,
    pub preferred_location: String,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub additional_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn check_price_band(
    min: &Option<Decimal>,
    max: &Option<Decimal>,
) -> Result<(), PayloadError> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(PayloadError::PriceRange);
        }
    }
    Ok(())
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let client_id = payload::required_id(map, "client_id")?;
    let property_type = payload::required_text(map, "property_type")?;
    let preferred_location = payload::required_text(map, "preferred_location")?;
    let price_min = payload::optional_decimal(map, "price_min")?;
    let price_max = payload::optional_decimal(map, "price_max")?;
    check_price_band(&price_min, &price_max)?;
    let additional_notes = payload::optional_text(map, "additional_notes")?;

    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("client_id", SqlValue::Uuid(client_id));
    cols.push("property_type", SqlValue::Text(property_type));
    cols.push("preferred_location", SqlValue::Text(preferred_location));
    cols.push("price_min", SqlValue::NullableDecimal(price_min));
    cols.push("price_max", SqlValue::NullableDecimal(price_max));
    cols.push("additional_notes", SqlValue::NullableText(additional_notes));
    cols.push("created_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let price_min = payload::nullable_decimal_update(map, "price_min")?;
    let price_max = payload::nullable_decimal_update(map, "price_max")?;
    // The band invariant is only checkable payload-side when both ends are
    // supplied together
    if let (Some(min), Some(max)) = (&price_min, &price_max) {
        check_price_band(min, max)?;
    }

    let mut cols = ColumnSet::new();
    cols.push_opt(
        "client_id",
        payload::id_update(map, "client_id")?.map(SqlValue::Uuid),
    );
    cols.push_opt(
        "property_type",
        payload::text_update(map, "property_type")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "preferred_location",
        payload::text_update(map, "preferred_location")?.map(SqlValue::Text),
    );
    cols.push_opt("price_min", price_min.map(SqlValue::NullableDecimal));
    cols.push_opt("price_max", price_max.map(SqlValue::NullableDecimal));
    cols.push_opt(
        "additional_notes",
        payload::nullable_text_update(map, "additional_notes")?.map(SqlValue::NullableText),
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
    fn inverted_price_band_is_rejected() {
        let m = map(json!({
            "client_id": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11",
            "property_type": "flat",
            "preferred_location": "Leith",
            "price_min": 300000,
            "price_max": 150000
        }));
        assert!(matches!(insert_columns(&m), Err(PayloadError::PriceRange)));
    }

    #[test]
    fn open_ended_band_is_fine() {
        let m = map(json!({
            "client_id": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11",
            "property_type": "flat",
            "preferred_location": "Leith",
            "price_min": 150000
        }));
        assert!(insert_columns(&m).is_ok());
    }

    #[test]
    fn update_checks_band_when_both_ends_present() {
        let m = map(json!({ "price_min": 500, "price_max": 100 }));
        assert!(matches!(update_columns(&m), Err(PayloadError::PriceRange)));

        let m = map(json!({ "price_min": 500 }));
        assert!(update_columns(&m).is_ok());
    }

    #[test]
    fn no_updated_at_column_on_this_entity() {
        let cols = update_columns(&map(json!({ "property_type": "house" }))).unwrap();
        assert_eq!(cols.names(), vec!["property_type"]);
    }
}
