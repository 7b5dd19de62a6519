//! Mealwise status tool
//!
//! Runtime status of the service, plus the usage guide served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::analytics::Now;
use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};

/// How to use the analytics tools, for AI assistants
pub const ANALYTICS_INSTRUCTIONS: &str = r#"
# Mealwise Usage Guide

Mealwise stores meal records per user and turns them into summaries, trends,
macro breakdowns, recommendations and meal suggestions.

---

## Setting Up a User

**Tool:** `create_user`
- `name` is required
- `goal`: lose_weight, maintain (default), gain_weight, build_muscle
- `diet_type`: standard (default), vegetarian, vegan, keto, paleo, mediterranean
- Body stats (`weight_kg`, `height_cm`, `age`, `sex`) plus `activity_level`
  let Mealwise calculate daily targets. Give all four body stats or none.
- Explicit `daily_targets` always win over calculated ones.

**Tool:** `calculate_targets`
- Recalculates targets from stored body stats
- `apply: true` saves them; otherwise it is a preview

---

## Logging Meals

**Tool:** `log_meal`
- `meal_slot`: breakfast, lunch, dinner or snack. Anything else is rejected.
- `consumed_at`: `YYYY-MM-DD HH:MM` (server local time). Defaults to now.
- Nutrition values must be non-negative; calories at most 10000 per record.
- Sodium is in milligrams, everything else in grams.

---

## Reading the Analytics

| Tool | What it returns |
|------|-----------------|
| `daily_summary` | Totals and meal count for one day (zeros when nothing was logged) |
| `weekly_summary` | Seven daily summaries ending on `end_date`, with averages over tracked days |
| `nutrition_trend` | One point per day in the window, no gaps, ascending |
| `macro_analysis` | Protein/carbs/fat share of macro-derived calories |
| `recommendations` | Prioritized guidance for today, highest priority first |
| `meal_suggestions` | Up to 5 catalog meals ranked against today's remaining budget |
| `dashboard` | Today, macros, the week, recent meals and recommendations in one call |

### Notes

- Averages only count days that have at least one meal.
- Macro percentages are derived from grams (4/4/9 kcal per gram) and can
  differ from the logged calories; both are reported.
- Recommendations depend on the server's current hour. Re-request them later
  in the day rather than caching them.
- Only vegetarian and vegan diets filter meal suggestions. Other diet types
  and allergies are stored but not applied.
- Dates use ISO format: YYYY-MM-DD
"#;

/// Runtime status of the Mealwise service
#[derive(Debug, Clone, Serialize)]
pub struct MealwiseStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub profile: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,

    /// Engine clock
    pub now: Now,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self, db: &Database, now: Now) -> MealwiseStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let schema_version = match db.with_conn(|conn| migrations::get_schema_version(conn)) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!(error = %e, "could not read schema version");
                None
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MealwiseStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            profile: build_info.profile,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            now,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_reports_schema_version() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| migrations::run_migrations(conn)).unwrap();

        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/mealwise.db"));
        let now = Now::new(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(), 10);
        let status = tracker.get_status(&db, now);

        assert_eq!(status.schema_version, Some(1));
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.now, now);
        assert_eq!(status.process_id, std::process::id());
    }
}
