pub mod driver;
pub mod truck;

use crate::error::AppError;

/// Parses a path or query identifier, reporting failures as `<context>: <reason>`.
pub(crate) fn parse_id(raw: &str, context: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|e| AppError::bad_request(format!("{context}: {e}")))
}
