use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use uuid::Uuid;

/// A typed value bound into a dynamically assembled statement.
#[derive(Debug, Clone)]
pub enum SqlValue {
    Uuid(Uuid),
    NullableUuid(Option<Uuid>),
    Text(String),
    NullableText(Option<String>),
    Bool(bool),
    Decimal(Decimal),
    NullableDecimal(Option<Decimal>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    /// JSONB column; None binds SQL NULL
    Json(Option<Value>),
}

/// Ordered (column, value) pairs feeding an INSERT column list or an
/// UPDATE SET clause. Column names are compile-time literals supplied by the
/// entity modules, never user input.
#[derive(Debug, Default)]
pub struct ColumnSet {
    cols: Vec<(&'static str, SqlValue)>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &'static str, value: SqlValue) {
        self.cols.push((column, value));
    }

    pub fn push_opt(&mut self, column: &'static str, value: Option<SqlValue>) {
        if let Some(v) = value {
            self.cols.push((column, v));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.cols.iter().map(|(n, _)| *n).collect()
    }

    pub fn into_parts(self) -> (Vec<&'static str>, Vec<SqlValue>) {
        self.cols.into_iter().unzip()
    }
}

pub fn bind_value<'q, T>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, T, PgArguments>,
    v: SqlValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, T, PgArguments> {
    match v {
        SqlValue::Uuid(u) => q.bind(u),
        SqlValue::NullableUuid(u) => q.bind(u),
        SqlValue::Text(s) => q.bind(s),
        SqlValue::NullableText(s) => q.bind(s),
        SqlValue::Bool(b) => q.bind(b),
        SqlValue::Decimal(d) => q.bind(d),
        SqlValue::NullableDecimal(d) => q.bind(d),
        SqlValue::Date(d) => q.bind(d),
        SqlValue::Timestamp(t) => q.bind(t),
        SqlValue::Json(j) => q.bind(j),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_set_preserves_order() {
        let mut cols = ColumnSet::new();
        cols.push("first_name", SqlValue::Text("Alice".into()));
        cols.push("status", SqlValue::Text("active".into()));
        cols.push_opt("phone", None);
        cols.push_opt("email", Some(SqlValue::Text("a@b.co".into())));

        assert_eq!(cols.names(), vec!["first_name", "status", "email"]);
        assert_eq!(cols.len(), 3);
    }
}
