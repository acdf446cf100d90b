use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

/// Bootstrap DDL for all eight entity tables, applied by `realty schema init`.
///
/// Deliberately no FOREIGN KEY constraints: deletes must not cascade, and
/// dependents of a removed row keep their dangling references. Referential
/// checks that matter (appointment agent/property) happen at the API layer.
const TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "users" (
        "id" UUID PRIMARY KEY,
        "username" TEXT NOT NULL UNIQUE,
        "email" TEXT NOT NULL UNIQUE,
        "password_hash" TEXT NOT NULL,
        "role" TEXT NOT NULL,
        "created_at" TIMESTAMPTZ NOT NULL,
        "updated_at" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "clients" (
        "id" UUID PRIMARY KEY,
        "first_name" TEXT NOT NULL,
        "last_name" TEXT NOT NULL,
        "email" TEXT NOT NULL,
        "phone" TEXT NOT NULL,
        "address" TEXT NOT NULL,
        "status" TEXT NOT NULL,
        "additional_details" JSONB,
        "created_at" TIMESTAMPTZ NOT NULL,
        "updated_at" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "property_interests" (
        "id" UUID PRIMARY KEY,
        "client_id" UUID NOT NULL,
        "property_type" TEXT NOT NULL,
        "preferred_location" TEXT NOT NULL,
        "price_min" NUMERIC,
        "price_max" NUMERIC,
        "additional_notes" TEXT,
        "created_at" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "properties" (
        "id" UUID PRIMARY KEY,
        "address" TEXT NOT NULL,
        "property_type" TEXT NOT NULL,
        "price" NUMERIC NOT NULL,
        "status" TEXT NOT NULL,
        "description" TEXT,
        "created_at" TIMESTAMPTZ NOT NULL,
        "updated_at" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "appointments" (
        "id" UUID PRIMARY KEY,
        "client_id" UUID NOT NULL,
        "property_id" UUID,
        "agent_id" UUID NOT NULL,
        "appointment_date" DATE NOT NULL,
        "appointment_time" TEXT NOT NULL,
        "notes" TEXT,
        "is_confirmed" BOOLEAN NOT NULL DEFAULT FALSE,
        "created_at" TIMESTAMPTZ NOT NULL,
        "updated_at" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "communication_logs" (
        "id" UUID PRIMARY KEY,
        "client_id" UUID NOT NULL,
        "user_id" UUID NOT NULL,
        "communication_type" TEXT NOT NULL,
        "note" TEXT NOT NULL,
        "follow_up_flag" BOOLEAN NOT NULL DEFAULT FALSE,
        "timestamp" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "client_documents" (
        "id" UUID PRIMARY KEY,
        "client_id" UUID NOT NULL,
        "document_name" TEXT NOT NULL,
        "document_url" TEXT NOT NULL,
        "document_type" TEXT NOT NULL,
        "uploaded_at" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "user_settings" (
        "id" UUID PRIMARY KEY,
        "user_id" UUID NOT NULL UNIQUE,
        "dashboard_preferences" JSONB,
        "notification_settings" JSONB,
        "configuration" JSONB,
        "updated_at" TIMESTAMPTZ NOT NULL
    )"#,
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("Schema ensured ({} tables)", TABLES.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_rows_are_unique_per_user() {
        // The handler's lookup gives the friendly error; this constraint
        // closes the race between two concurrent creates
        let ddl = TABLES
            .iter()
            .find(|d| d.contains("\"user_settings\""))
            .unwrap();
        assert!(ddl.contains("\"user_id\" UUID NOT NULL UNIQUE"));
    }

    #[test]
    fn no_foreign_keys_anywhere() {
        assert!(!TABLES.iter().any(|d| d.contains("REFERENCES")));
    }
}
