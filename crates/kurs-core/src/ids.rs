use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path identifier, failing with a 400 carrying `message` when the
/// value is not a well-formed id.
pub fn parse_id(raw: &str, message: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request(message))
}
