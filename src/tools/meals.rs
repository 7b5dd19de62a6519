//! Meal record tools
//!
//! Logging, lookup, listing, editing and deleting meal records.

use chrono::Local;
use serde::Serialize;

use crate::analytics::summary::day_bounds;
use crate::db::Database;
use crate::models::{MealRecord, MealRecordCreate, MealRecordUpdate, Nutrition, UserProfile};
use super::{parse_date, parse_slot, parse_timestamp, ToolError, ToolResult};

/// Response for list_meal_records
#[derive(Debug, Serialize)]
pub struct ListMealRecordsResponse {
    pub user_id: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub records: Vec<MealRecord>,
    pub total_calories: f64,
}

/// Partial nutrient edit; unset fields keep their stored value
#[derive(Debug, Clone, Copy, Default)]
pub struct NutritionPatch {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl NutritionPatch {
    pub fn is_empty(&self) -> bool {
        [
            self.calories,
            self.protein,
            self.carbs,
            self.fat,
            self.fiber,
            self.sugar,
            self.sodium,
        ]
        .iter()
        .all(Option::is_none)
    }

    pub fn apply(&self, base: Nutrition) -> Nutrition {
        Nutrition {
            calories: self.calories.unwrap_or(base.calories),
            protein: self.protein.unwrap_or(base.protein),
            carbs: self.carbs.unwrap_or(base.carbs),
            fat: self.fat.unwrap_or(base.fat),
            fiber: self.fiber.unwrap_or(base.fiber),
            sugar: self.sugar.unwrap_or(base.sugar),
            sodium: self.sodium.unwrap_or(base.sodium),
        }
    }
}

/// Log a meal. `consumed_at` defaults to the current local time.
#[allow(clippy::too_many_arguments)]
pub fn log_meal(
    db: &Database,
    user_id: i64,
    name: &str,
    meal_slot: &str,
    nutrition: Nutrition,
    consumed_at: Option<&str>,
    is_favorite: bool,
    notes: Option<String>,
) -> ToolResult<MealRecord> {
    let meal_slot = parse_slot(meal_slot)?;
    let consumed_at = match consumed_at {
        Some(raw) => parse_timestamp(raw)?,
        None => Local::now().naive_local(),
    };

    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    if UserProfile::get_by_id(&conn, user_id)
        .map_err(|e| ToolError::database("Database error checking user", e))?
        .is_none()
    {
        return Err(ToolError::InvalidInput(format!("User not found with id: {}", user_id)));
    }

    let data = MealRecordCreate {
        user_id,
        name: name.to_string(),
        meal_slot,
        nutrition,
        consumed_at,
        is_favorite,
        notes,
    };

    let record = MealRecord::create(&conn, &data).map_err(|e| ToolError::database("Failed to log meal", e))?;
    tracing::info!(user_id, record_id = record.id, slot = %record.meal_slot, "logged meal");
    Ok(record)
}

pub fn get_meal_record(db: &Database, id: i64) -> ToolResult<Option<MealRecord>> {
    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    MealRecord::get_by_id(&conn, id).map_err(|e| ToolError::database("Failed to get meal record", e))
}

/// List a user's records for a date range, or the most recent ones when no
/// range is given. A lone start date lists that single day.
pub fn list_meal_records(
    db: &Database,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
) -> ToolResult<ListMealRecordsResponse> {
    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    let (records, start_date, end_date) = match (start_date, end_date) {
        (None, None) => {
            let records = MealRecord::list_recent(&conn, user_id, limit)
                .map_err(|e| ToolError::database("Failed to list meal records", e))?;
            (records, None, None)
        }
        (None, Some(_)) => return Err(ToolError::InvalidInput("end_date requires start_date".to_string())),
        (Some(start_raw), end_raw) => {
            let start = parse_date(start_raw)?;
            let end = match end_raw {
                Some(raw) => parse_date(raw)?,
                None => start,
            };
            if start > end {
                return Err(ToolError::InvalidInput(format!("start_date {} is after end_date {}", start, end)));
            }
            let (from, _) = day_bounds(start);
            let (_, to) = day_bounds(end);
            let records = MealRecord::list_in_range(&conn, user_id, &from, &to)
                .map_err(|e| ToolError::database("Failed to list meal records", e))?;
            (records, Some(start.to_string()), Some(end.to_string()))
        }
    };

    let total_calories = records.iter().map(|r| r.nutrition.calories).sum();

    Ok(ListMealRecordsResponse {
        user_id,
        start_date,
        end_date,
        records,
        total_calories,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn update_meal_record(
    db: &Database,
    id: i64,
    name: Option<String>,
    meal_slot: Option<&str>,
    nutrition: &NutritionPatch,
    consumed_at: Option<&str>,
    is_favorite: Option<bool>,
    notes: Option<String>,
) -> ToolResult<Option<MealRecord>> {
    let meal_slot = meal_slot.map(parse_slot).transpose()?;
    let consumed_at = consumed_at.map(parse_timestamp).transpose()?;

    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    let nutrition = if nutrition.is_empty() {
        None
    } else {
        match MealRecord::get_by_id(&conn, id).map_err(|e| ToolError::database("Failed to get meal record", e))? {
            Some(existing) => Some(nutrition.apply(existing.nutrition)),
            None => return Ok(None),
        }
    };

    let data = MealRecordUpdate {
        name,
        meal_slot,
        nutrition,
        consumed_at,
        is_favorite,
        notes,
    };

    MealRecord::update(&conn, id, &data).map_err(|e| ToolError::database("Failed to update meal record", e))
}

pub fn delete_meal_record(db: &Database, id: i64) -> ToolResult<bool> {
    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    MealRecord::delete(&conn, id).map_err(|e| ToolError::database("Failed to delete meal record", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{DailyTargets, DietType, Goal, MealSlot, UserCreate};

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user_id = db
            .with_conn(|conn| {
                run_migrations(conn)?;
                let user = UserProfile::create(
                    conn,
                    &UserCreate {
                        name: "Sam".to_string(),
                        daily_targets: DailyTargets::default(),
                        goal: Goal::Maintain,
                        diet_type: DietType::Standard,
                        allergies: Vec::new(),
                        body: None,
                        activity_level: None,
                    },
                )?;
                Ok(user.id)
            })
            .unwrap();
        (db, user_id)
    }

    fn oats() -> Nutrition {
        Nutrition {
            calories: 380.0,
            protein: 12.0,
            carbs: 62.0,
            fat: 9.0,
            ..Nutrition::zero()
        }
    }

    #[test]
    fn test_log_and_list_by_day() {
        let (db, user_id) = setup();
        log_meal(&db, user_id, "Oats", "breakfast", oats(), Some("2026-03-09 08:00"), false, None).unwrap();
        log_meal(&db, user_id, "Oats", "snack", oats(), Some("2026-03-10 08:00"), true, None).unwrap();

        let day = list_meal_records(&db, user_id, Some("2026-03-09"), None, 50).unwrap();
        assert_eq!(day.records.len(), 1);
        assert_eq!(day.records[0].meal_slot, MealSlot::Breakfast);
        assert_eq!(day.total_calories, 380.0);

        let recent = list_meal_records(&db, user_id, None, None, 50).unwrap();
        assert_eq!(recent.records.len(), 2);
        assert!(recent.records[0].is_favorite);
    }

    #[test]
    fn test_log_rejects_bad_input() {
        let (db, user_id) = setup();
        assert!(log_meal(&db, user_id, "Oats", "brunch", oats(), None, false, None).is_err());
        assert!(log_meal(&db, user_id, "Oats", "lunch", oats(), Some("noon"), false, None).is_err());
        assert!(log_meal(&db, user_id + 1, "Oats", "lunch", oats(), None, false, None)
            .unwrap_err()
            .to_string()
            .contains("User not found"));

        let mut huge = oats();
        huge.calories = 12_000.0;
        let err = log_meal(&db, user_id, "Feast", "dinner", huge, None, false, None).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("calories"));
    }

    #[test]
    fn test_update_and_delete() {
        let (db, user_id) = setup();
        let record = log_meal(&db, user_id, "Oats", "breakfast", oats(), Some("2026-03-09 08:00"), false, None).unwrap();

        let patch = NutritionPatch {
            protein: Some(15.0),
            ..NutritionPatch::default()
        };
        let updated = update_meal_record(&db, record.id, None, Some("lunch"), &patch, None, Some(true), None)
            .unwrap()
            .unwrap();
        assert_eq!(updated.meal_slot, MealSlot::Lunch);
        assert!(updated.is_favorite);
        assert_eq!(updated.nutrition.protein, 15.0);
        assert_eq!(updated.nutrition.calories, 380.0);

        let none = NutritionPatch::default();
        assert!(update_meal_record(&db, record.id, None, Some("tea"), &none, None, None, None).is_err());
        assert!(update_meal_record(&db, 999, None, None, &patch, None, None, None).unwrap().is_none());

        assert!(delete_meal_record(&db, record.id).unwrap());
        assert!(get_meal_record(&db, record.id).unwrap().is_none());
        assert!(!delete_meal_record(&db, record.id).unwrap());
    }

    #[test]
    fn test_list_rejects_inverted_range() {
        let (db, user_id) = setup();
        assert!(list_meal_records(&db, user_id, Some("2026-03-10"), Some("2026-03-09"), 50).is_err());
        assert!(list_meal_records(&db, user_id, None, Some("2026-03-09"), 50).is_err());
    }
}
