use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ExactFilter, FilterKind, ListSpec, SortOrder};

pub const TABLE: &str = "communication_logs";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["note"],
    sortable: &["timestamp"],
    default_sort: ("timestamp", SortOrder::Desc),
    filters: &[
        ExactFilter {
            param: "client_id",
            column: "client_id",
            kind: FilterKind::Id,
        },
        ExactFilter {
            param: "communication_type",
            column: "communication_type",
            kind: FilterKind::Text,
        },
    ],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommunicationLog {
    pub id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub communication_type: String,
    pub note: String,
    pub follow_up_flag: bool,
    pub timestamp: DateTime<Utc>,
}

pub fn insert_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let client_id = payload::required_id(map, "client_id")?;
    let user_id = payload::required_id(map, "user_id")?;
    let communication_type = payload::required_text(map, "communication_type")?;
    let note = payload::required_text(map, "note")?;
    let follow_up_flag = payload::bool_or(map, "follow_up_flag", false)?;

    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("client_id", SqlValue::Uuid(client_id));
    cols.push("user_id", SqlValue::Uuid(user_id));
    cols.push("communication_type", SqlValue::Text(communication_type));
    cols.push("note", SqlValue::Text(note));
    cols.push("follow_up_flag", SqlValue::Bool(follow_up_flag));
    cols.push("timestamp", SqlValue::Timestamp(Utc::now()));
    Ok(cols)
}

pub fn update_columns(map: &JsonMap) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "client_id",
        payload::id_update(map, "client_id")?.map(SqlValue::Uuid),
    );
    cols.push_opt(
        "user_id",
        payload::id_update(map, "user_id")?.map(SqlValue::Uuid),
    );
    cols.push_opt(
        "communication_type",
        payload::text_update(map, "communication_type")?.map(SqlValue::Text),
    );
    cols.push_opt("note", payload::text_update(map, "note")?.map(SqlValue::Text));
    cols.push_opt(
        "follow_up_flag",
        payload::bool_update(map, "follow_up_flag")?.map(SqlValue::Bool),
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
    fn note_is_required() {
        let m = map(json!({
            "client_id": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11",
            "user_id": "3b7f3f9e-2f4d-4a61-bb3f-6a7f1a2b3c4d",
            "communication_type": "call"
        }));
        assert!(matches!(insert_columns(&m), Err(PayloadError::Missing("note"))));
    }

    #[test]
    fn follow_up_flag_defaults_false_and_rejects_non_bool() {
        let base = json!({
            "client_id": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11",
            "user_id": "3b7f3f9e-2f4d-4a61-bb3f-6a7f1a2b3c4d",
            "communication_type": "call",
            "note": "left voicemail"
        });
        assert!(insert_columns(&map(base.clone())).is_ok());

        let mut m = map(base);
        m.insert("follow_up_flag".into(), json!("yes"));
        assert!(matches!(
            insert_columns(&m),
            Err(PayloadError::NotBool("follow_up_flag"))
        ));
    }

    #[test]
    fn timestamp_is_never_client_controlled() {
        let cols = update_columns(&map(json!({ "note": "updated" }))).unwrap();
        assert_eq!(cols.names(), vec!["note"]);
    }
}
