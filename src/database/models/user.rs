use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::payload::{self, JsonMap, PayloadError};
use crate::database::value::{ColumnSet, SqlValue};
use crate::filter::{ListSpec, SortOrder};

pub const TABLE: &str = "users";

pub const LIST: ListSpec = ListSpec {
    table: TABLE,
    searchable: &["username", "email"],
    sortable: &["created_at", "username", "email", "role"],
    default_sort: ("created_at", SortOrder::Desc),
    filters: &[],
};

/// Agent/staff account. The stored hash is serialized in API responses for
/// contract parity with the reference implementation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_role(raw: &str) -> Result<Role, PayloadError> {
    raw.parse::<Role>()
        .map_err(|_| PayloadError::Invalid(format!("Unknown role: {}", raw)))
}

/// The plaintext password is validated by the caller and arrives here
/// already hashed.
pub fn insert_columns(map: &JsonMap, password_hash: String) -> Result<ColumnSet, PayloadError> {
    let username = payload::required_text(map, "username")?;
    let email = payload::required_text(map, "email")?;
    let role = parse_role(&payload::required_text(map, "role")?)?;

    let now = Utc::now();
    let mut cols = ColumnSet::new();
    cols.push("id", SqlValue::Uuid(Uuid::new_v4()));
    cols.push("username", SqlValue::Text(username));
    cols.push("email", SqlValue::Text(email));
    cols.push("password_hash", SqlValue::Text(password_hash));
    cols.push("role", SqlValue::Text(role.as_str().to_string()));
    cols.push("created_at", SqlValue::Timestamp(now));
    cols.push("updated_at", SqlValue::Timestamp(now));
    Ok(cols)
}

/// `password_hash` carries the new hash when the body supplied a non-empty
/// password.
pub fn update_columns(
    map: &JsonMap,
    password_hash: Option<String>,
) -> Result<ColumnSet, PayloadError> {
    let mut cols = ColumnSet::new();
    cols.push_opt(
        "username",
        payload::text_update(map, "username")?.map(SqlValue::Text),
    );
    cols.push_opt("email", payload::text_update(map, "email")?.map(SqlValue::Text));
    if let Some(raw) = payload::text_update(map, "role")? {
        let role = parse_role(&raw)?;
        cols.push("role", SqlValue::Text(role.as_str().to_string()));
    }
    cols.push_opt("password_hash", password_hash.map(SqlValue::Text));
    cols.push("updated_at", SqlValue::Timestamp(Utc::now()));
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
    fn create_requires_all_fields() {
        let m = map(json!({ "username": "jo", "email": "jo@x.co" }));
        assert!(matches!(
            insert_columns(&m, "hash".into()),
            Err(PayloadError::Missing("role"))
        ));
    }

    #[test]
    fn create_rejects_unknown_role() {
        let m = map(json!({ "username": "jo", "email": "jo@x.co", "role": "owner" }));
        assert!(insert_columns(&m, "hash".into()).is_err());
    }

    #[test]
    fn create_mints_id_and_timestamps() {
        let m = map(json!({ "username": "jo", "email": "jo@x.co", "role": "agent" }));
        let cols = insert_columns(&m, "hash".into()).unwrap();
        assert_eq!(
            cols.names(),
            vec!["id", "username", "email", "password_hash", "role", "created_at", "updated_at"]
        );
    }

    #[test]
    fn update_only_touches_present_fields() {
        let m = map(json!({ "email": "new@x.co" }));
        let cols = update_columns(&m, None).unwrap();
        assert_eq!(cols.names(), vec!["email", "updated_at"]);
    }
}
