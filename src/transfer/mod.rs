//! Bulk client transfer: one-shot spreadsheet import and CSV export.
//!
//! Import parses the first sheet of an uploaded workbook (header row first),
//! validates every row against the client create contract, and inserts all
//! rows in a single transaction; any bad row fails the whole upload. Export
//! writes all clients as RFC 4180 CSV with the same column order as the JSON
//! list endpoint.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;
use std::io::Cursor;
use thiserror::Error;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::client::{self, Client};
use crate::database::payload::{JsonMap, PayloadError};
use crate::database::repository;
use crate::error::ApiError;

/// CSV column order; must match the `Client` struct's JSON field order.
pub const CSV_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "address",
    "status",
    "additional_details",
    "created_at",
    "updated_at",
];

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Uploaded file is not a readable spreadsheet: {0}")]
    UnreadableWorkbook(String),

    #[error("Spreadsheet has no sheets")]
    NoSheet,

    #[error("Spreadsheet has no header row")]
    NoHeader,

    #[error("Row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: PayloadError,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse workbook bytes into one JSON object per data row, keyed by the
/// header row.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<JsonMap>, TransferError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| TransferError::UnreadableWorkbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(TransferError::NoSheet)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TransferError::UnreadableWorkbook(e.to_string()))?;

    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect::<Vec<String>>()
    });

    let headers = rows.next().ok_or(TransferError::NoHeader)?;
    Ok(rows_to_objects(&headers, rows))
}

/// Zip each data row with the header, dropping cells beyond the header
/// width. Empty cells are omitted so required-field validation sees them as
/// missing.
pub fn rows_to_objects(
    headers: &[String],
    rows: impl Iterator<Item = Vec<String>>,
) -> Vec<JsonMap> {
    rows.map(|cells| {
        let mut object = JsonMap::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = cells.get(i).cloned().unwrap_or_default();
            if !cell.is_empty() {
                object.insert(header.clone(), Value::String(cell));
            }
        }
        object
    })
    .collect()
}

/// Validate and insert all parsed rows atomically. The row number in error
/// messages is 1-based counting the header, matching what the uploader sees
/// in their spreadsheet.
pub async fn import_clients(
    pool: &sqlx::PgPool,
    bytes: &[u8],
) -> Result<Vec<Client>, ApiError> {
    let objects = parse_workbook(bytes)?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| ApiError::from(DatabaseError::from(e)))?;

    let mut created = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        let cols = client::insert_columns(object).map_err(|source| {
            ApiError::from(TransferError::InvalidRow { row: i + 2, source })
        })?;
        let row: Client = repository::insert_row(&mut *tx, client::TABLE, cols)
            .await
            .map_err(ApiError::from)?;
        created.push(row);
    }

    tx.commit()
        .await
        .map_err(|e| ApiError::from(DatabaseError::from(e)))?;

    info!("Imported {} clients from spreadsheet", created.len());
    Ok(created)
}

fn json_cell(v: &Option<Value>) -> String {
    match v {
        None => String::new(),
        Some(v) => v.to_string(),
    }
}

/// Serialize clients as CSV. The `csv` crate applies RFC 4180 quoting, so
/// embedded commas, quotes and newlines survive a round trip.
pub fn export_clients_csv(clients: &[Client]) -> Result<Vec<u8>, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;

    for c in clients {
        writer.write_record([
            c.id.to_string(),
            c.first_name.clone(),
            c.last_name.clone(),
            c.email.clone(),
            c.phone.clone(),
            c.address.clone(),
            c.status.clone(),
            json_cell(&c.additional_details),
            c.created_at.to_rfc3339(),
            c.updated_at.to_rfc3339(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| TransferError::UnreadableWorkbook(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_become_header_keyed_objects() {
        let headers = strings(&["first_name", "last_name", "email"]);
        let rows = vec![
            strings(&["Alice", "Wonderland", "alice@x.co.uk"]),
            strings(&["Bob", "", "bob@x.co.uk"]),
        ];
        let objects = rows_to_objects(&headers, rows.into_iter());

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0]["first_name"], json!("Alice"));
        // Empty cells are absent, so create validation treats them as missing
        assert!(!objects[1].contains_key("last_name"));
    }

    #[test]
    fn short_rows_and_blank_headers_are_tolerated() {
        let headers = strings(&["a", "", "c"]);
        let rows = vec![strings(&["1"])];
        let objects = rows_to_objects(&headers, rows.into_iter());
        assert_eq!(objects[0].len(), 1);
        assert_eq!(objects[0]["a"], json!("1"));
    }

    fn sample_client(address: &str) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            first_name: "Alice".into(),
            last_name: "Wonderland".into(),
            email: "alice@x.co.uk".into(),
            phone: "0712345".into(),
            address: address.into(),
            status: "active".into(),
            additional_details: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn export_header_matches_json_field_order() {
        let bytes = export_clients_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.trim_end(), CSV_COLUMNS.join(","));
    }

    #[test]
    fn embedded_commas_survive_a_round_trip() {
        let client = sample_client("1 Harbour View, Flat 2, Leith");
        let bytes = export_clients_csv(&[client.clone()]).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[5], "1 Harbour View, Flat 2, Leith");
        assert_eq!(record.len(), CSV_COLUMNS.len());
        assert_eq!(&record[1], &client.first_name);
    }

    #[test]
    fn export_is_plain_utf8_text() {
        let bytes = export_clients_csv(&[sample_client("1 A St")]).unwrap();
        // The CLI streams these bytes to stdout or a file as-is
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(matches!(
            parse_workbook(b"definitely not a spreadsheet"),
            Err(TransferError::UnreadableWorkbook(_))
        ));
    }
}
