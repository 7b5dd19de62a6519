//! Engine error types

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DbError;

/// Failures of the collaborator stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store database error: {0}")]
    Database(#[from] DbError),

    #[error("Store task failed: {0}")]
    Task(String),
}

/// Errors surfaced by [`crate::analytics::NutritionEngine`].
///
/// The analytic computations themselves are total; every variant here
/// originates at the boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
pub type StoreResult<T> = Result<T, StoreError>;
