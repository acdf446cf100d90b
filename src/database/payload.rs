//! Field-level validation over JSON request bodies.
//!
//! Create helpers enforce the required-field lists and stop at the first
//! violated constraint. Update helpers implement the partial-merge contract:
//! a field participates only when it is present in the body. Required string
//! fields are additionally tested for truthiness, so an update that sets one
//! to empty string or null is silently ignored rather than rejected; nullable
//! fields are presence-tested, so an explicit null clears them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub type JsonMap = Map<String, Value>;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a string")]
    NotText(&'static str),

    #[error("{0} must be a valid id")]
    BadId(&'static str),

    #[error("{0} must be a number")]
    NotNumber(&'static str),

    #[error("{0} must be a boolean")]
    NotBool(&'static str),

    #[error("{0} must be a date in YYYY-MM-DD form")]
    BadDate(&'static str),

    #[error("{0} must be a well-formed URL")]
    BadUrl(&'static str),

    #[error("price_min must not exceed price_max")]
    PriceRange,

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("{0}")]
    Invalid(String),
}

pub fn as_object(body: &Value) -> Result<&JsonMap, PayloadError> {
    body.as_object().ok_or(PayloadError::NotAnObject)
}

fn parse_decimal(field: &'static str, v: &Value) -> Result<Decimal, PayloadError> {
    match v {
        // serde_json renders numbers losslessly, so parse via the string form
        Value::Number(n) => {
            Decimal::from_str(&n.to_string()).map_err(|_| PayloadError::NotNumber(field))
        }
        Value::String(s) => {
            Decimal::from_str(s.trim()).map_err(|_| PayloadError::NotNumber(field))
        }
        _ => Err(PayloadError::NotNumber(field)),
    }
}

fn parse_date(field: &'static str, v: &Value) -> Result<NaiveDate, PayloadError> {
    let s = v.as_str().ok_or(PayloadError::BadDate(field))?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| PayloadError::BadDate(field))
}

fn parse_uuid(field: &'static str, v: &Value) -> Result<Uuid, PayloadError> {
    let s = v.as_str().ok_or(PayloadError::BadId(field))?;
    Uuid::parse_str(s).map_err(|_| PayloadError::BadId(field))
}

// ---------------------------------------------------------------------------
// Create-side helpers: required fields must be present and non-empty.
// ---------------------------------------------------------------------------

pub fn required_text(map: &JsonMap, field: &'static str) -> Result<String, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(PayloadError::Missing(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(PayloadError::Missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(PayloadError::NotText(field)),
    }
}

pub fn optional_text(map: &JsonMap, field: &'static str) -> Result<Option<String>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PayloadError::NotText(field)),
    }
}

pub fn required_id(map: &JsonMap, field: &'static str) -> Result<Uuid, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(PayloadError::Missing(field)),
        Some(v) => parse_uuid(field, v),
    }
}

pub fn optional_id(map: &JsonMap, field: &'static str) -> Result<Option<Uuid>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_uuid(field, v).map(Some),
    }
}

pub fn required_decimal(map: &JsonMap, field: &'static str) -> Result<Decimal, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(PayloadError::Missing(field)),
        Some(v) => parse_decimal(field, v),
    }
}

pub fn optional_decimal(
    map: &JsonMap,
    field: &'static str,
) -> Result<Option<Decimal>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_decimal(field, v).map(Some),
    }
}

pub fn required_date(map: &JsonMap, field: &'static str) -> Result<NaiveDate, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(PayloadError::Missing(field)),
        Some(v) => parse_date(field, v),
    }
}

pub fn bool_or(map: &JsonMap, field: &'static str, default: bool) -> Result<bool, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(PayloadError::NotBool(field)),
    }
}

pub fn optional_json(map: &JsonMap, field: &'static str) -> Option<Value> {
    match map.get(field) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}

pub fn required_url(map: &JsonMap, field: &'static str) -> Result<String, PayloadError> {
    let s = required_text(map, field)?;
    url::Url::parse(&s).map_err(|_| PayloadError::BadUrl(field))?;
    Ok(s)
}

// ---------------------------------------------------------------------------
// Update-side helpers: Ok(None) means "leave the stored value untouched",
// Ok(Some(..)) means "overwrite".
// ---------------------------------------------------------------------------

pub fn text_update(map: &JsonMap, field: &'static str) -> Result<Option<String>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        // Truthiness test: empty string on a required field is ignored
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PayloadError::NotText(field)),
    }
}

pub fn nullable_text_update(
    map: &JsonMap,
    field: &'static str,
) -> Result<Option<Option<String>>, PayloadError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(PayloadError::NotText(field)),
    }
}

pub fn id_update(map: &JsonMap, field: &'static str) -> Result<Option<Uuid>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_uuid(field, v).map(Some),
    }
}

pub fn nullable_id_update(
    map: &JsonMap,
    field: &'static str,
) -> Result<Option<Option<Uuid>>, PayloadError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => parse_uuid(field, v).map(|u| Some(Some(u))),
    }
}

pub fn decimal_update(map: &JsonMap, field: &'static str) -> Result<Option<Decimal>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_decimal(field, v).map(Some),
    }
}

pub fn nullable_decimal_update(
    map: &JsonMap,
    field: &'static str,
) -> Result<Option<Option<Decimal>>, PayloadError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => parse_decimal(field, v).map(|d| Some(Some(d))),
    }
}

pub fn date_update(map: &JsonMap, field: &'static str) -> Result<Option<NaiveDate>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_date(field, v).map(Some),
    }
}

pub fn bool_update(map: &JsonMap, field: &'static str) -> Result<Option<bool>, PayloadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(PayloadError::NotBool(field)),
    }
}

pub fn json_update(map: &JsonMap, field: &'static str) -> Option<Option<Value>> {
    match map.get(field) {
        None => None,
        Some(Value::Null) => Some(None),
        Some(v) => Some(Some(v.clone())),
    }
}

pub fn url_update(map: &JsonMap, field: &'static str) -> Result<Option<String>, PayloadError> {
    match text_update(map, field)? {
        None => Ok(None),
        Some(s) => {
            url::Url::parse(&s).map_err(|_| PayloadError::BadUrl(field))?;
            Ok(Some(s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> JsonMap {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn required_text_rejects_missing_null_and_empty() {
        let m = map(json!({ "a": "", "b": null, "c": "  " }));
        assert!(matches!(required_text(&m, "a"), Err(PayloadError::Missing(_))));
        assert!(matches!(required_text(&m, "b"), Err(PayloadError::Missing(_))));
        assert!(matches!(required_text(&m, "c"), Err(PayloadError::Missing(_))));
        assert!(matches!(required_text(&m, "d"), Err(PayloadError::Missing(_))));
    }

    #[test]
    fn text_update_ignores_empty_and_null() {
        let m = map(json!({ "a": "", "b": null, "c": "kept" }));
        assert_eq!(text_update(&m, "a").unwrap(), None);
        assert_eq!(text_update(&m, "b").unwrap(), None);
        assert_eq!(text_update(&m, "c").unwrap(), Some("kept".to_string()));
        assert_eq!(text_update(&m, "absent").unwrap(), None);
        assert!(text_update(&map(json!({ "a": 7 })), "a").is_err());
    }

    #[test]
    fn nullable_text_update_distinguishes_null_from_absent() {
        let m = map(json!({ "cleared": null, "set": "x" }));
        assert_eq!(nullable_text_update(&m, "cleared").unwrap(), Some(None));
        assert_eq!(
            nullable_text_update(&m, "set").unwrap(),
            Some(Some("x".to_string()))
        );
        assert_eq!(nullable_text_update(&m, "absent").unwrap(), None);
    }

    #[test]
    fn decimals_accept_numbers_and_numeric_strings() {
        let m = map(json!({ "a": 125000.50, "b": "99.95", "c": "not a price" }));
        assert_eq!(required_decimal(&m, "a").unwrap().to_string(), "125000.5");
        assert_eq!(required_decimal(&m, "b").unwrap().to_string(), "99.95");
        assert!(matches!(
            required_decimal(&m, "c"),
            Err(PayloadError::NotNumber(_))
        ));
    }

    #[test]
    fn dates_must_be_iso() {
        let m = map(json!({ "ok": "2026-03-14", "bad": "14/03/2026" }));
        assert!(required_date(&m, "ok").is_ok());
        assert!(matches!(required_date(&m, "bad"), Err(PayloadError::BadDate(_))));
    }

    #[test]
    fn urls_are_checked() {
        let m = map(json!({ "ok": "https://docs.example.com/a.pdf", "bad": "not a url" }));
        assert!(required_url(&m, "ok").is_ok());
        assert!(matches!(required_url(&m, "bad"), Err(PayloadError::BadUrl(_))));
    }

    #[test]
    fn ids_parse_as_uuids() {
        let m = map(json!({ "ok": "8f3c8a04-9d6b-4c8e-9f59-0a1d9b6f3a11", "bad": "42" }));
        assert!(required_id(&m, "ok").is_ok());
        assert!(matches!(required_id(&m, "bad"), Err(PayloadError::BadId(_))));
    }

    #[test]
    fn json_update_clears_on_null() {
        let m = map(json!({ "cleared": null, "set": { "k": 1 } }));
        assert_eq!(json_update(&m, "cleared"), Some(None));
        assert_eq!(json_update(&m, "set"), Some(Some(json!({ "k": 1 }))));
        assert_eq!(json_update(&m, "absent"), None);
    }
}
