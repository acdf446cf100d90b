//! List-endpoint query assembly.
//!
//! Every collection endpoint funnels through [`build`]: free-text search
//! OR-ed over an entity's searchable columns, exact-match foreign-key
//! filters AND-ed on top, an enumerated sort allow-list, and uniform
//! limit/offset pagination. Column names come from the per-entity
//! [`ListSpec`] constants, never from the request.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::value::SqlValue;

pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("limit must be a positive integer, got '{0}'")]
    InvalidLimit(String),

    #[error("offset must be a non-negative integer, got '{0}'")]
    InvalidOffset(String),

    #[error("cannot sort by '{0}'")]
    UnknownSortField(String),

    #[error("sort_order must be 'asc' or 'desc', got '{0}'")]
    InvalidSortOrder(String),

    #[error("{0} must be a valid id")]
    InvalidId(&'static str),

    #[error("{0} must be a date in YYYY-MM-DD form")]
    InvalidDate(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query-string parameters shared by all list endpoints. Numeric fields
/// arrive as strings so that malformed values produce our validation error
/// rather than a framework rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub query: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    // Entity-specific exact-match filters; ignored where the entity's
    // ListSpec does not declare them
    pub client_id: Option<String>,
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
    pub date: Option<String>,
    pub communication_type: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum FilterKind {
    Id,
    Text,
    Date,
}

/// One exact-match filter: query-string parameter, target column, value type.
#[derive(Debug, Clone, Copy)]
pub struct ExactFilter {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

/// Per-entity list contract: table, searchable and sortable columns,
/// default ordering, and the exact-match filters the entity accepts.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    pub table: &'static str,
    pub searchable: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub default_sort: (&'static str, SortOrder),
    pub filters: &'static [ExactFilter],
}

/// An assembled SELECT with its positional bind values.
#[derive(Debug)]
pub struct ListQuery {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

impl ExactFilter {
    fn raw<'a>(&self, params: &'a ListParams) -> Option<&'a str> {
        let v = match self.param {
            "client_id" => params.client_id.as_deref(),
            "agent_id" => params.agent_id.as_deref(),
            "user_id" => params.user_id.as_deref(),
            "date" => params.date.as_deref(),
            "communication_type" => params.communication_type.as_deref(),
            _ => None,
        };
        v.map(str::trim).filter(|s| !s.is_empty())
    }

    fn parse(&self, raw: &str) -> Result<SqlValue, FilterError> {
        match self.kind {
            FilterKind::Id => Uuid::parse_str(raw)
                .map(SqlValue::Uuid)
                .map_err(|_| FilterError::InvalidId(self.param)),
            FilterKind::Text => Ok(SqlValue::Text(raw.to_string())),
            FilterKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(SqlValue::Date)
                .map_err(|_| FilterError::InvalidDate(self.param)),
        }
    }
}

fn parse_limit(params: &ListParams) -> Result<i64, FilterError> {
    match params.limit.as_deref().map(str::trim) {
        None | Some("") => Ok(DEFAULT_LIMIT),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(FilterError::InvalidLimit(raw.to_string())),
        },
    }
}

fn parse_offset(params: &ListParams) -> Result<i64, FilterError> {
    match params.offset.as_deref().map(str::trim) {
        None | Some("") => Ok(0),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err(FilterError::InvalidOffset(raw.to_string())),
        },
    }
}

fn parse_sort(spec: &ListSpec, params: &ListParams) -> Result<(&'static str, SortOrder), FilterError> {
    let column = match params.sort_by.as_deref().map(str::trim) {
        None | Some("") => spec.default_sort.0,
        Some(raw) => spec
            .sortable
            .iter()
            .copied()
            .find(|c| *c == raw)
            .ok_or_else(|| FilterError::UnknownSortField(raw.to_string()))?,
    };

    let order = match params.sort_order.as_deref().map(str::trim) {
        None | Some("") => spec.default_sort.1,
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Err(FilterError::InvalidSortOrder(raw.to_string())),
        },
    };

    Ok((column, order))
}

/// Assemble the list SELECT for an entity from validated parameters.
pub fn build(spec: &ListSpec, params: &ListParams) -> Result<ListQuery, FilterError> {
    let limit = parse_limit(params)?;
    let offset = parse_offset(params)?;
    let (sort_column, sort_order) = parse_sort(spec, params)?;

    let mut conditions: Vec<String> = Vec::new();
    let mut binds: Vec<SqlValue> = Vec::new();

    if let Some(q) = params.query.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if !spec.searchable.is_empty() {
            binds.push(SqlValue::Text(format!("%{}%", q)));
            let placeholder = binds.len();
            let ors: Vec<String> = spec
                .searchable
                .iter()
                .map(|col| format!("\"{}\" ILIKE ${}", col, placeholder))
                .collect();
            conditions.push(format!("({})", ors.join(" OR ")));
        }
    }

    for filter in spec.filters {
        if let Some(raw) = filter.raw(params) {
            binds.push(filter.parse(raw)?);
            conditions.push(format!("\"{}\" = ${}", filter.column, binds.len()));
        }
    }

    let mut sql = format!("SELECT * FROM \"{}\"", spec.table);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&format!(
        " ORDER BY \"{}\" {} LIMIT {} OFFSET {}",
        sort_column,
        sort_order.to_sql(),
        limit,
        offset
    ));

    Ok(ListQuery { sql, binds })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ListSpec = ListSpec {
        table: "clients",
        searchable: &["first_name", "last_name", "email"],
        sortable: &["created_at", "first_name", "last_name", "email", "status"],
        default_sort: ("created_at", SortOrder::Desc),
        filters: &[ExactFilter {
            param: "client_id",
            column: "client_id",
            kind: FilterKind::Id,
        }],
    };

    #[test]
    fn defaults_apply() {
        let q = build(&SPEC, &ListParams::default()).unwrap();
        assert_eq!(
            q.sql,
            "SELECT * FROM \"clients\" ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 0"
        );
        assert!(q.binds.is_empty());
    }

    #[test]
    fn search_ors_over_columns_with_one_bind() {
        let params = ListParams {
            query: Some("smith".into()),
            ..Default::default()
        };
        let q = build(&SPEC, &params).unwrap();
        assert!(q.sql.contains(
            "(\"first_name\" ILIKE $1 OR \"last_name\" ILIKE $1 OR \"email\" ILIKE $1)"
        ));
        assert_eq!(q.binds.len(), 1);
        match &q.binds[0] {
            SqlValue::Text(s) => assert_eq!(s, "%smith%"),
            other => panic!("unexpected bind: {:?}", other),
        }
    }

    #[test]
    fn exact_filter_is_anded_after_search() {
        let params = ListParams {
            query: Some("beach".into()),
            client_id: Some("8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11".into()),
            ..Default::default()
        };
        let q = build(&SPEC, &params).unwrap();
        assert!(q.sql.contains(" AND \"client_id\" = $2"));
        assert_eq!(q.binds.len(), 2);
    }

    #[test]
    fn malformed_limit_and_offset_are_rejected() {
        let params = ListParams {
            limit: Some("abc".into()),
            ..Default::default()
        };
        assert!(matches!(build(&SPEC, &params), Err(FilterError::InvalidLimit(_))));

        let params = ListParams {
            limit: Some("0".into()),
            ..Default::default()
        };
        assert!(matches!(build(&SPEC, &params), Err(FilterError::InvalidLimit(_))));

        let params = ListParams {
            offset: Some("-1".into()),
            ..Default::default()
        };
        assert!(matches!(build(&SPEC, &params), Err(FilterError::InvalidOffset(_))));
    }

    #[test]
    fn sort_field_is_allow_listed() {
        let params = ListParams {
            sort_by: Some("password_hash".into()),
            ..Default::default()
        };
        assert!(matches!(
            build(&SPEC, &params),
            Err(FilterError::UnknownSortField(_))
        ));

        let params = ListParams {
            sort_by: Some("email".into()),
            sort_order: Some("ASC".into()),
            ..Default::default()
        };
        let q = build(&SPEC, &params).unwrap();
        assert!(q.sql.contains("ORDER BY \"email\" ASC"));
    }

    #[test]
    fn bad_sort_order_is_rejected() {
        let params = ListParams {
            sort_order: Some("sideways".into()),
            ..Default::default()
        };
        assert!(matches!(
            build(&SPEC, &params),
            Err(FilterError::InvalidSortOrder(_))
        ));
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        // "sort" is not a list parameter; only "sort_by" reaches the
        // allow-list, so a stray "sort" leaves the default ordering intact
        let params: ListParams =
            serde_json::from_value(serde_json::json!({ "sort": "password_hash" })).unwrap();
        assert!(params.sort_by.is_none());

        let q = build(&SPEC, &params).unwrap();
        assert!(q.sql.contains("ORDER BY \"created_at\" DESC"));
    }

    #[test]
    fn bad_filter_id_is_rejected() {
        let params = ListParams {
            client_id: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert!(matches!(build(&SPEC, &params), Err(FilterError::InvalidId(_))));
    }

    #[test]
    fn pagination_is_contiguous() {
        let first = build(
            &SPEC,
            &ListParams {
                limit: Some("2".into()),
                offset: Some("0".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let second = build(
            &SPEC,
            &ListParams {
                limit: Some("2".into()),
                offset: Some("2".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(first.sql.ends_with("LIMIT 2 OFFSET 0"));
        assert!(second.sql.ends_with("LIMIT 2 OFFSET 2"));
    }
}
