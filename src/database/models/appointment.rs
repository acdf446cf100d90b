use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ExactFilter, FilterKind, ListSpec, SortOrder};

pub const TABLE: &str = "appointments";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["notes"],
    sortable: &["appointment_date", "created_at"],
    default_sort: ("appointment_date", SortOrder::Desc),
    filters: &[
        ExactFilter {
            param: "client_id",
            column: "client_id",
            kind: FilterKind::Id,
        },
        ExactFilter {
            param: "agent_id",
            column: "agent_id",
            kind: FilterKind::Id,
        },
        ExactFilter {
            param: "date",
            column: "appointment_date",
            kind: FilterKind::Date,
        },
    ],
};

/// A viewing or meeting. `agent_id` must resolve to a user and
/// `property_id`, when set, to a property; the handlers enforce both since
/// storage carries no FK constraints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub property_id: Option<Uuid>,
    pub agent_id: Uuid,
    pub appointment_date: NaiveDate,
    /// Free-text HH:MM, kept verbatim
    pub appointment_time: String,
    pub notes: Option<String>,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let client_id = payload::required_id(map, "client_id")?;
    let property_id = payload::optional_id(map, "property_id")?;
    let agent_id = payload::required_id(map, "agent_id")?;
    let appointment_date = payload::required_date(map, "appointment_date")?;
    let appointment_time = payload::required_text(map, "appointment_time")?;
    let notes = payload::optional_text(map, "notes")?;
    let is_confirmed = payload::bool_or(map, "is_confirmed", false)?;

    let now = Utc::now();
    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("client_id", SqlValue::Uuid(client_id));
    cols.push("property_id", SqlValue::NullableUuid(property_id));
    cols.push("agent_id", SqlValue::Uuid(agent_id));
    cols.push("appointment_date", SqlValue::Date(appointment_date));
    cols.push("appointment_time", SqlValue::Text(appointment_time));
    cols.push("notes", SqlValue::NullableText(notes));
    cols.push("is_confirmed", SqlValue::Bool(is_confirmed));
    cols.push("created_at", SqlValue::Timestamp(now));
    cols.push("updated_at", SqlValue::Timestamp(now));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "client_id",
        payload::id_update(map, "client_id")?.map(SqlValue::Uuid),
    );
    cols.push_opt(
        "property_id",
        payload::nullable_id_update(map, "property_id")?.map(SqlValue::NullableUuid),
    );
    cols.push_opt(
        "agent_id",
        payload::id_update(map, "agent_id")?.map(SqlValue::Uuid),
    );
    cols.push_opt(
        "appointment_date",
        payload::date_update(map, "appointment_date")?.map(SqlValue::Date),
    );
    cols.push_opt(
        "appointment_time",
        payload::text_update(map, "appointment_time")?.map(SqlValue::Text),
    );
    cols.push_opt(
        "notes",
        payload::nullable_text_update(map, "notes")?.map(SqlValue::NullableText),
    );
    cols.push_opt(
        "is_confirmed",
        payload::bool_update(map, "is_confirmed")?.map(SqlValue::Bool),
    );
    cols.push("updated_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}

/// FK targets referenced from an update payload, for the handler to verify.
pub fn update_fk_targets(map: &JsonMap) -> Result<(Option<Uuid>, Option<Uuid>), PayloadError> {
    let agent = payload::id_update(map, "agent_id")?;
    let property = payload::nullable_id_update(map, "property_id")?.flatten();
    Ok((agent, property))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: serde_json::Value) -> JsonMap {
        v.as_object().unwrap().clone()
    }

    fn full_payload() -> JsonMap {
        map(json!({
            "client_id": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11",
            "agent_id": "3b7f3f9e-2f4d-4a61-bb3f-6a7f1a2b3c4d",
            "appointment_date": "2026-09-01",
            "appointment_time": "14:30"
        }))
    }

    #[test]
    fn is_confirmed_defaults_false() {
        let cols = insert_columns(&full_payload()).unwrap();
        assert!(cols.names().contains(&"is_confirmed"));
    }

    #[test]
    fn date_format_is_validated() {
        let mut m = full_payload();
        m.insert("appointment_date".into(), json!("01/09/2026"));
        assert!(matches!(
            insert_columns(&m),
            Err(PayloadError::BadDate("appointment_date"))
        ));
    }

    #[test]
    fn property_id_clears_on_null() {
        let cols = update_columns(&map(json!({ "property_id": null }))).unwrap();
        assert_eq!(cols.names(), vec!["property_id", "updated_at"]);
    }

    #[test]
    fn update_fk_targets_skips_cleared_property() {
        let (agent, property) = update_fk_targets(&map(json!({
            "agent_id": "3b7f3f9e-2f4d-4a61-bb3f-6a7f1a2b3c4d",
            "property_id": null
        })))
        .unwrap();
        assert!(agent.is_some());
        assert!(property.is_none());
    }
}
