use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ExactFilter, FilterKind, ListSpec, SortOrder};

pub const TABLE: &str = "user_settings";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &[],
    sortable: &["updated_at"],
    default_sort: ("updated_at", SortOrder::Desc),
    filters: &[ExactFilter {
        param: "user_id",
        column: "user_id",
        kind: FilterKind::Id,
    }],
};

/// Per-user UI preference blobs, one row per user. The handler checks first
/// for a clean message; a UNIQUE constraint on user_id backstops concurrent
/// creates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dashboard_preferences: Option<Value>,
    pub notification_settings: Option<Value>,
    pub configuration: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let user_id = payload::required_id(map, "user_id")?;

    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("user_id", SqlValue::Uuid(user_id));
    cols.push(
        "dashboard_preferences",
        SqlValue::Json(payload::optional_json(map, "dashboard_preferences")),
    );
    cols.push(
        "notification_settings",
        SqlValue::Json(payload::optional_json(map, "notification_settings")),
    );
    cols.push(
        "configuration",
        SqlValue::Json(payload::optional_json(map, "configuration")),
    );
    cols.push("updated_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "dashboard_preferences",
        payload::json_update(map, "dashboard_preferences").map(SqlValue::Json),
    );
    cols.push_opt(
        "notification_settings",
        payload::json_update(map, "notification_settings").map(SqlValue::Json),
    );
    cols.push_opt(
        "configuration",
        payload::json_update(map, "configuration").map(SqlValue::Json),
    );
    cols.push("updated_at", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}
