//! Collaborator interfaces
//!
//! The engine reads meal records and user profiles through these traits and
//! never writes through them.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{MealRecord, UserProfile};
use super::error::StoreResult;

#[async_trait]
pub trait MealRecordStore: Send + Sync {
    /// Records of `user_id` consumed on any day in `[start, end]` (inclusive,
    /// whole days), oldest first
    async fn fetch_records(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<MealRecord>>;

    /// Up to `limit` most recent records, newest first
    async fn fetch_recent(&self, user_id: i64, limit: usize) -> StoreResult<Vec<MealRecord>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn fetch_user(&self, user_id: i64) -> StoreResult<Option<UserProfile>>;
}
