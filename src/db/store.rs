//! SQLite-backed collaborator stores
//!
//! rusqlite is blocking, so every query runs on tokio's blocking pool.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::analytics::summary::day_bounds;
use crate::analytics::{MealRecordStore, StoreError, StoreResult, UserStore};
use crate::models::{MealRecord, UserProfile};
use super::connection::{Database, DbResult};

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn run<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?;
        Ok(result?)
    }
}

#[async_trait]
impl MealRecordStore for SqliteStore {
    async fn fetch_records(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<MealRecord>> {
        let (from, _) = day_bounds(start);
        let (_, to) = day_bounds(end);
        self.run(move |conn| MealRecord::list_in_range(conn, user_id, &from, &to))
            .await
    }

    async fn fetch_recent(&self, user_id: i64, limit: usize) -> StoreResult<Vec<MealRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run(move |conn| MealRecord::list_recent(conn, user_id, limit))
            .await
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn fetch_user(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
        self.run(move |conn| UserProfile::get_by_id(conn, user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{DailyTargets, DietType, Goal, MealRecordCreate, MealSlot, Nutrition, UserCreate};
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.3f").unwrap()
    }

    fn seeded_store() -> (SqliteStore, i64) {
        let db = Database::in_memory().unwrap();
        let user_id = db
            .with_conn(|conn| {
                run_migrations(conn)?;
                let user = UserProfile::create(
                    conn,
                    &UserCreate {
                        name: "Test".to_string(),
                        daily_targets: DailyTargets::default(),
                        goal: Goal::Maintain,
                        diet_type: DietType::Vegetarian,
                        allergies: vec!["peanuts".to_string()],
                        body: None,
                        activity_level: None,
                    },
                )?;
                for (ts, slot, calories) in [
                    ("2026-03-08 23:59:59.999", MealSlot::Snack, 150.0),
                    ("2026-03-09 00:00:00.000", MealSlot::Breakfast, 400.0),
                    ("2026-03-09 23:59:59.999", MealSlot::Snack, 200.0),
                    ("2026-03-10 00:00:00.000", MealSlot::Breakfast, 350.0),
                ] {
                    MealRecord::create(
                        conn,
                        &MealRecordCreate {
                            user_id: user.id,
                            name: format!("{} item", slot),
                            meal_slot: slot,
                            nutrition: Nutrition {
                                calories,
                                ..Nutrition::zero()
                            },
                            consumed_at: at(ts),
                            is_favorite: false,
                            notes: None,
                        },
                    )?;
                }
                Ok(user.id)
            })
            .unwrap();
        (SqliteStore::new(db), user_id)
    }

    #[tokio::test]
    async fn test_fetch_records_respects_day_bounds() {
        let (store, user_id) = seeded_store();
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();

        let records = store.fetch_records(user_id, day, day).await.unwrap();
        let calories: Vec<f64> = records.iter().map(|r| r.nutrition.calories).collect();
        assert_eq!(calories, vec![400.0, 200.0]);

        let other_user = store.fetch_records(user_id + 1, day, day).await.unwrap();
        assert!(other_user.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_recent_newest_first() {
        let (store, user_id) = seeded_store();
        let recent = store.fetch_recent(user_id, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].nutrition.calories, 350.0);
        assert_eq!(recent[1].nutrition.calories, 200.0);
    }

    #[tokio::test]
    async fn test_fetch_user() {
        let (store, user_id) = seeded_store();
        let user = store.fetch_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.diet_type, DietType::Vegetarian);
        assert_eq!(user.allergies, vec!["peanuts".to_string()]);
        assert!(store.fetch_user(999).await.unwrap().is_none());
    }
}
