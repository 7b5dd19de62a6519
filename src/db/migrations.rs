//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Highest applied schema version (0 for a fresh database)
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Whether the schema is at the version this build expects
pub fn is_current(conn: &Connection) -> DbResult<bool> {
    Ok(get_schema_version(conn)? == SCHEMA_VERSION)
}

/// Migration v1: users and meal records
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Profile, goal and daily nutrition targets
        -- ============================================
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,

            -- Daily targets (all positive)
            target_calories REAL NOT NULL,
            target_protein REAL NOT NULL,        -- grams
            target_carbs REAL NOT NULL,          -- grams
            target_fat REAL NOT NULL,            -- grams
            target_fiber REAL NOT NULL,          -- grams
            target_water REAL NOT NULL,          -- milliliters

            goal TEXT NOT NULL DEFAULT 'maintain'
                CHECK(goal IN ('lose_weight', 'maintain', 'gain_weight', 'build_muscle')),
            diet_type TEXT NOT NULL DEFAULT 'standard'
                CHECK(diet_type IN ('standard', 'vegetarian', 'vegan', 'keto', 'paleo', 'mediterranean')),
            allergies TEXT NOT NULL DEFAULT '[]', -- JSON array of strings

            -- Optional body stats for target calculation
            weight_kg REAL,
            height_cm REAL,
            age INTEGER,
            sex TEXT CHECK(sex IN ('male', 'female')),
            activity_level TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEAL RECORDS
        -- Append-only consumption log, one row per logged meal
        -- ============================================
        CREATE TABLE meal_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            meal_slot TEXT NOT NULL
                CHECK(meal_slot IN ('breakfast', 'lunch', 'dinner', 'snack')),

            calories REAL NOT NULL DEFAULT 0 CHECK(calories >= 0 AND calories <= 10000),
            protein REAL NOT NULL DEFAULT 0 CHECK(protein >= 0),
            carbs REAL NOT NULL DEFAULT 0 CHECK(carbs >= 0),
            fat REAL NOT NULL DEFAULT 0 CHECK(fat >= 0),
            fiber REAL NOT NULL DEFAULT 0 CHECK(fiber >= 0),
            sugar REAL NOT NULL DEFAULT 0 CHECK(sugar >= 0),
            sodium REAL NOT NULL DEFAULT 0 CHECK(sodium >= 0), -- milligrams

            -- Naive local time, "YYYY-MM-DD HH:MM:SS.fff" so text order == time order
            consumed_at TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            notes TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_records_user_time ON meal_records(user_id, consumed_at);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(is_current(&conn).unwrap());
    }
}
