//! Mealwise tools module
//!
//! Tool implementations behind the MCP server. Every function validates its
//! raw string arguments and reports failures as a [`ToolError`] that keeps
//! caller mistakes apart from server faults.

pub mod analytics;
pub mod meals;
pub mod status;
pub mod users;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::analytics::EngineError;
use crate::db::DbError;
use crate::models::MealSlot;

/// Tool error types
#[derive(Debug, Error)]
pub enum ToolError {
    /// The caller's arguments were rejected
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Internal(String),
}

/// Result type for tool functions
pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    /// Classify a database failure, prefixing the message with `context`
    pub fn database(context: &str, err: DbError) -> Self {
        let message = format!("{}: {}", context, err);
        match err {
            DbError::Validation(_) | DbError::NotFound { .. } => ToolError::InvalidInput(message),
            DbError::Connection(_) | DbError::Sqlite(_) => ToolError::Internal(message),
        }
    }

    /// Classify an engine failure, prefixing the message with `context`
    pub fn engine(context: &str, err: EngineError) -> Self {
        let message = format!("{}: {}", context, err);
        match err {
            EngineError::UserNotFound(_)
            | EngineError::InvalidDateRange { .. }
            | EngineError::InvalidInput(_) => ToolError::InvalidInput(message),
            EngineError::Store(_) => ToolError::Internal(message),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ToolError::InvalidInput(_))
    }
}

/// Argument parse failures
impl From<String> for ToolError {
    fn from(message: String) -> Self {
        ToolError::InvalidInput(message)
    }
}

impl From<EngineError> for ToolError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(_) => ToolError::Internal(err.to_string()),
            _ => ToolError::InvalidInput(err.to_string()),
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", raw))
}

/// Parse a consumption timestamp. Accepts `YYYY-MM-DD HH:MM[:SS[.fff]]`, the
/// same with a `T` separator, or a bare date (taken as noon).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .ok_or_else(|| format!("Invalid timestamp '{}': expected YYYY-MM-DD HH:MM[:SS]", raw))
}

pub fn parse_slot(raw: &str) -> Result<MealSlot, String> {
    raw.parse::<MealSlot>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2026-03-09").unwrap(), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert!(parse_date("03/09/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap().and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-09 08:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2026-03-09T08:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2026-03-09 08:30:00.000").unwrap(), expected);
        assert_eq!(parse_timestamp("2026-03-09").unwrap().time().to_string(), "12:00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_error_classification() {
        let validation = ToolError::database("Failed to log meal", DbError::Validation("calories too high".to_string()));
        assert!(validation.is_invalid_input());
        assert_eq!(validation.to_string(), "Failed to log meal: Invalid data: calories too high");

        let sqlite = ToolError::database("Failed to log meal", DbError::Sqlite(rusqlite::Error::InvalidQuery));
        assert!(!sqlite.is_invalid_input());

        let start = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(ToolError::engine("Failed to build trend", EngineError::InvalidDateRange { start, end }).is_invalid_input());
        assert!(ToolError::from(EngineError::UserNotFound(7)).is_invalid_input());
        assert!(ToolError::from(parse_date("soon").unwrap_err()).is_invalid_input());
    }

    #[test]
    fn test_parse_slot_rejects_unknown() {
        assert_eq!(parse_slot("Dinner").unwrap(), MealSlot::Dinner);
        assert!(parse_slot("brunch").is_err());
    }
}
