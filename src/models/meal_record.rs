//! Meal Record model
//!
//! One logged consumption event. Records are written by the CRUD tools and
//! read (never modified) by the analytics engine.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Nutrition;

/// Storage format for `consumed_at`; fixed width so text order matches time order
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Meal slot a record (or meal template) belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    /// Unknown slots are rejected rather than defaulted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snack" => Ok(MealSlot::Snack),
            other => Err(format!(
                "Invalid meal slot '{}': expected breakfast, lunch, dinner, or snack",
                other
            )),
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub meal_slot: MealSlot,
    pub nutrition: Nutrition,
    pub consumed_at: NaiveDateTime,
    pub is_favorite: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecordCreate {
    pub user_id: i64,
    pub name: String,
    pub meal_slot: MealSlot,
    pub nutrition: Nutrition,
    pub consumed_at: NaiveDateTime,
    pub is_favorite: bool,
    pub notes: Option<String>,
}

/// Data for updating a meal record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealRecordUpdate {
    pub name: Option<String>,
    pub meal_slot: Option<MealSlot>,
    pub nutrition: Option<Nutrition>,
    pub consumed_at: Option<NaiveDateTime>,
    pub is_favorite: Option<bool>,
    pub notes: Option<String>,
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl MealRecord {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let slot_str: String = row.get("meal_slot")?;
        let slot_idx = row.as_ref().column_index("meal_slot")?;
        let meal_slot = slot_str.parse::<MealSlot>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(slot_idx, Type::Text, e.into())
        })?;
        let consumed_raw: String = row.get("consumed_at")?;
        let consumed_idx = row.as_ref().column_index("consumed_at")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            meal_slot,
            nutrition: Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
                fiber: row.get("fiber")?,
                sugar: row.get("sugar")?,
                sodium: row.get("sodium")?,
            },
            consumed_at: parse_timestamp(consumed_idx, &consumed_raw)?,
            is_favorite: row.get("is_favorite")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Log a new meal record
    pub fn create(conn: &Connection, data: &MealRecordCreate) -> DbResult<Self> {
        data.nutrition.validate().map_err(DbError::Validation)?;
        if data.name.trim().is_empty() {
            return Err(DbError::Validation("name must not be empty".to_string()));
        }

        conn.execute(
            r#"
            INSERT INTO meal_records (
                user_id, name, meal_slot,
                calories, protein, carbs, fat, fiber, sugar, sodium,
                consumed_at, is_favorite, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                data.user_id,
                data.name.trim(),
                data.meal_slot.as_str(),
                data.nutrition.calories,
                data.nutrition.protein,
                data.nutrition.carbs,
                data.nutrition.fat,
                data.nutrition.fiber,
                data.nutrition.sugar,
                data.nutrition.sodium,
                format_timestamp(&data.consumed_at),
                data.is_favorite,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Meal record", id })
    }

    /// Get a meal record by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_records WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All records of a user with `start <= consumed_at <= end`, oldest first
    pub fn list_in_range(
        conn: &Connection,
        user_id: i64,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_records
             WHERE user_id = ?1 AND consumed_at >= ?2 AND consumed_at <= ?3
             ORDER BY consumed_at, id",
        )?;

        let records = stmt
            .query_map(
                params![user_id, format_timestamp(start), format_timestamp(end)],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Most recent records of a user, newest first
    pub fn list_recent(conn: &Connection, user_id: i64, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_records
             WHERE user_id = ?1
             ORDER BY consumed_at DESC, id DESC
             LIMIT ?2",
        )?;

        let records = stmt
            .query_map(params![user_id, limit.clamp(1, 200)], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Update a meal record
    pub fn update(conn: &Connection, id: i64, data: &MealRecordUpdate) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(DbError::Validation("name must not be empty".to_string()));
            }
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.trim().to_string()));
        }
        if let Some(slot) = data.meal_slot {
            updates.push(format!("meal_slot = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(slot.as_str()));
        }
        if let Some(nutrition) = data.nutrition {
            nutrition.validate().map_err(DbError::Validation)?;
            let columns = [
                ("calories", nutrition.calories),
                ("protein", nutrition.protein),
                ("carbs", nutrition.carbs),
                ("fat", nutrition.fat),
                ("fiber", nutrition.fiber),
                ("sugar", nutrition.sugar),
                ("sodium", nutrition.sodium),
            ];
            for (column, value) in columns {
                updates.push(format!("{} = ?{}", column, params_vec.len() + 1));
                params_vec.push(Box::new(value));
            }
        }
        if let Some(ref consumed_at) = data.consumed_at {
            updates.push(format!("consumed_at = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(format_timestamp(consumed_at)));
        }
        if let Some(is_favorite) = data.is_favorite {
            updates.push(format!("is_favorite = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(is_favorite));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Ok(Some(existing));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE meal_records SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a meal record
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meal_records WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_slot_parsing() {
        assert_eq!("Breakfast".parse::<MealSlot>().unwrap(), MealSlot::Breakfast);
        assert_eq!(" snack ".parse::<MealSlot>().unwrap(), MealSlot::Snack);
        assert!("brunch".parse::<MealSlot>().is_err());
        assert!("".parse::<MealSlot>().is_err());
    }

    #[test]
    fn test_timestamp_format_round_trips_millis() {
        let ts = NaiveDateTime::parse_from_str("2026-03-09 23:59:59.999", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(format_timestamp(&ts), "2026-03-09 23:59:59.999");
        let morning = NaiveDateTime::parse_from_str("2026-03-09 08:05:00.000", TIMESTAMP_FORMAT).unwrap();
        assert!(format_timestamp(&morning) < format_timestamp(&ts));
    }
}
