pub mod appointments;
pub mod auth;
pub mod client_documents;
pub mod clients;
pub mod communication_logs;
pub mod properties;
pub mod property_interests;
pub mod transfer;
pub mod user_settings;
pub mod users;

use uuid::Uuid;

use crate::error::ApiError;

/// Item-endpoint ids arrive as opaque strings; anything that is not a UUID
/// we minted is a bad request.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid id"))
}
