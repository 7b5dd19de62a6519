//! User model
//!
//! Profile, goal, dietary preference and daily targets.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Per-day nutrition goals configured by (or calculated for) the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
    pub fiber: f64,   // grams
    pub water: f64,   // milliliters
}

impl DailyTargets {
    /// Every target must be a positive, finite number
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
            ("water", self.water),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("target {} must be positive, got {}", name, value));
            }
        }
        Ok(())
    }
}

impl Default for DailyTargets {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 50.0,
            carbs: 250.0,
            fat: 65.0,
            fiber: 25.0,
            water: 2000.0,
        }
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        concat!("Invalid ", stringify!($name), " '{}': expected one of {}"),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

string_enum!(
    /// What the user is trying to achieve
    Goal {
        LoseWeight => "lose_weight",
        Maintain => "maintain",
        GainWeight => "gain_weight",
        BuildMuscle => "build_muscle",
    }
);

string_enum!(
    /// Declared dietary preference
    DietType {
        Standard => "standard",
        Vegetarian => "vegetarian",
        Vegan => "vegan",
        Keto => "keto",
        Paleo => "paleo",
        Mediterranean => "mediterranean",
    }
);

string_enum!(
    Sex {
        Male => "male",
        Female => "female",
    }
);

string_enum!(
    /// Habitual activity level, used for the TDEE multiplier
    ActivityLevel {
        Sedentary => "sedentary",
        Light => "light",
        Moderate => "moderate",
        Active => "active",
        VeryActive => "very_active",
    }
);

/// Body measurements used to calculate targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyStats {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
}

/// A user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub daily_targets: DailyTargets,
    pub goal: Goal,
    pub diet_type: DietType,
    /// Stored for the user's reference; not used to filter suggestions
    pub allergies: Vec<String>,
    pub body: Option<BodyStats>,
    pub activity_level: Option<ActivityLevel>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub daily_targets: DailyTargets,
    pub goal: Goal,
    pub diet_type: DietType,
    pub allergies: Vec<String>,
    pub body: Option<BodyStats>,
    pub activity_level: Option<ActivityLevel>,
}

/// Data for updating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub daily_targets: Option<DailyTargets>,
    pub goal: Option<Goal>,
    pub diet_type: Option<DietType>,
    pub allergies: Option<Vec<String>>,
    pub body: Option<BodyStats>,
    pub activity_level: Option<ActivityLevel>,
}

fn parse_column<T: FromStr<Err = String>>(row: &Row, column: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    raw.parse::<T>().map_err(|e| {
        let idx = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

fn parse_optional_column<T: FromStr<Err = String>>(
    row: &Row,
    column: &str,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        s.parse::<T>().map_err(|e| {
            let idx = row.as_ref().column_index(column).unwrap_or(0);
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
        })
    })
    .transpose()
}

impl UserProfile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let allergies_raw: String = row.get("allergies")?;
        let allergies: Vec<String> = serde_json::from_str(&allergies_raw).map_err(|e| {
            let idx = row.as_ref().column_index("allergies").unwrap_or(0);
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        })?;

        let weight_kg: Option<f64> = row.get("weight_kg")?;
        let height_cm: Option<f64> = row.get("height_cm")?;
        let age: Option<u32> = row.get("age")?;
        let sex: Option<Sex> = parse_optional_column(row, "sex")?;
        let body = match (weight_kg, height_cm, age, sex) {
            (Some(weight_kg), Some(height_cm), Some(age), Some(sex)) => Some(BodyStats {
                weight_kg,
                height_cm,
                age,
                sex,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            daily_targets: DailyTargets {
                calories: row.get("target_calories")?,
                protein: row.get("target_protein")?,
                carbs: row.get("target_carbs")?,
                fat: row.get("target_fat")?,
                fiber: row.get("target_fiber")?,
                water: row.get("target_water")?,
            },
            goal: parse_column(row, "goal")?,
            diet_type: parse_column(row, "diet_type")?,
            allergies,
            body,
            activity_level: parse_optional_column(row, "activity_level")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new user
    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Self> {
        data.daily_targets.validate().map_err(DbError::Validation)?;
        if data.name.trim().is_empty() {
            return Err(DbError::Validation("name must not be empty".to_string()));
        }
        let allergies = serde_json::to_string(&data.allergies)
            .map_err(|e| DbError::Validation(e.to_string()))?;
        let t = &data.daily_targets;

        conn.execute(
            r#"
            INSERT INTO users (
                name, target_calories, target_protein, target_carbs, target_fat,
                target_fiber, target_water, goal, diet_type, allergies,
                weight_kg, height_cm, age, sex, activity_level
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                data.name.trim(),
                t.calories,
                t.protein,
                t.carbs,
                t.fat,
                t.fiber,
                t.water,
                data.goal.as_str(),
                data.diet_type.as_str(),
                allergies,
                data.body.map(|b| b.weight_kg),
                data.body.map(|b| b.height_cm),
                data.body.map(|b| b.age),
                data.body.map(|b| b.sex.as_str()),
                data.activity_level.map(|a| a.as_str()),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "User", id })
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update a user
    pub fn update(conn: &Connection, id: i64, data: &UserUpdate) -> DbResult<Option<Self>> {
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
        if let Some(targets) = data.daily_targets {
            targets.validate().map_err(DbError::Validation)?;
            let columns = [
                ("target_calories", targets.calories),
                ("target_protein", targets.protein),
                ("target_carbs", targets.carbs),
                ("target_fat", targets.fat),
                ("target_fiber", targets.fiber),
                ("target_water", targets.water),
            ];
            for (column, value) in columns {
                updates.push(format!("{} = ?{}", column, params_vec.len() + 1));
                params_vec.push(Box::new(value));
            }
        }
        if let Some(goal) = data.goal {
            updates.push(format!("goal = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(goal.as_str()));
        }
        if let Some(diet_type) = data.diet_type {
            updates.push(format!("diet_type = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(diet_type.as_str()));
        }
        if let Some(ref allergies) = data.allergies {
            let json = serde_json::to_string(allergies)
                .map_err(|e| DbError::Validation(e.to_string()))?;
            updates.push(format!("allergies = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(json));
        }
        if let Some(body) = data.body {
            updates.push(format!("weight_kg = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(body.weight_kg));
            updates.push(format!("height_cm = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(body.height_cm));
            updates.push(format!("age = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(body.age));
            updates.push(format!("sex = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(body.sex.as_str()));
        }
        if let Some(activity_level) = data.activity_level {
            updates.push(format!("activity_level = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(activity_level.as_str()));
        }

        if updates.is_empty() {
            return Ok(Some(existing));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE users SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }
}
