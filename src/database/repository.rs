use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::value::{bind_value, ColumnSet};
use crate::filter::ListQuery;

/// Generic single-table data access. Entity modules supply the table name,
/// the typed row, and the validated [`ColumnSet`]s; this layer only assembles
/// and executes the statements.
pub struct Repository<T> {
    table: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    pub fn new(table: &'static str, pool: PgPool) -> Self {
        Self {
            table,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn insert(&self, cols: ColumnSet) -> Result<T, DatabaseError> {
        insert_row(&self.pool, self.table, cols).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        fetch_row(&self.pool, self.table, id).await
    }

    /// Applies the column set to the row, returning the merged record.
    /// `Ok(None)` means no row with this id exists. An empty column set
    /// degenerates to a plain fetch.
    pub async fn update(&self, id: Uuid, cols: ColumnSet) -> Result<Option<T>, DatabaseError> {
        if cols.is_empty() {
            return self.get(id).await;
        }
        update_row(&self.pool, self.table, id, cols).await
    }

    /// Returns true if a row was removed. No cascade: dependent rows keep
    /// their now-dangling foreign keys.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1 RETURNING \"id\"", self.table);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }

    /// Run a list query assembled by [`crate::filter::build`]; callers
    /// validate parameters before a pool is ever acquired.
    pub async fn list(&self, query: ListQuery) -> Result<Vec<T>, DatabaseError> {
        let mut q = sqlx::query_as::<_, T>(&query.sql);
        for v in query.binds {
            q = bind_value(q, v);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Full-table scan ordered by one column ascending, used by CSV export.
    pub async fn all_ordered(&self, order_column: &'static str) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM \"{}\" ORDER BY \"{}\" ASC",
            self.table, order_column
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    /// Exact-match single-row lookup on one column, e.g. user_settings by
    /// user_id.
    pub async fn find_by(
        &self,
        column: &'static str,
        value: crate::database::value::SqlValue,
    ) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"{}\" = $1", self.table, column);
        let q = bind_value(sqlx::query_as::<_, T>(&sql), value);
        Ok(q.fetch_optional(&self.pool).await?)
    }
}

/// INSERT executable inside a caller-managed transaction.
pub async fn insert_row<'e, T, E>(
    executor: E,
    table: &str,
    cols: ColumnSet,
) -> Result<T, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'e>,
{
    let (names, values) = cols.into_parts();
    let columns: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${}", i)).collect();
    let sql = format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut q = sqlx::query_as::<_, T>(&sql);
    for v in values {
        q = bind_value(q, v);
    }
    Ok(q.fetch_one(executor).await?)
}

pub async fn fetch_row<'e, T, E>(executor: E, table: &str, id: Uuid) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", table);
    Ok(sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn update_row<'e, T, E>(
    executor: E,
    table: &str,
    id: Uuid,
    cols: ColumnSet,
) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'e>,
{
    let (names, values) = cols.into_parts();
    let assignments: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, n)| format!("\"{}\" = ${}", n, i + 1))
        .collect();
    let sql = format!(
        "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING *",
        table,
        assignments.join(", "),
        names.len() + 1
    );

    let mut q = sqlx::query_as::<_, T>(&sql);
    for v in values {
        q = bind_value(q, v);
    }
    Ok(q.bind(id).fetch_optional(executor).await?)
}

/// Existence probe usable inside a transaction (appointment FK checks).
pub async fn row_exists<'e, E>(executor: E, table: &str, id: Uuid) -> Result<bool, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT \"id\" FROM \"{}\" WHERE \"id\" = $1", table);
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    Ok(row.is_some())
}
