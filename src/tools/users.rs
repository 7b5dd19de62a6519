//! User profile tools
//!
//! Creating, reading and updating profiles, and deriving daily targets from
//! body stats.

use serde::Serialize;

use crate::analytics::{calculate_targets as derive_targets, EngineConfig};
use crate::db::Database;
use crate::models::{
    ActivityLevel, BodyStats, DailyTargets, DietType, Goal, Sex, UserCreate, UserProfile, UserUpdate,
};
use super::{ToolError, ToolResult};

/// Raw profile fields as they arrive from a tool call
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub diet_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub daily_targets: Option<DailyTargets>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub activity_level: Option<String>,
}

/// The same fields, parsed
#[derive(Debug, Default)]
struct ParsedFields {
    goal: Option<Goal>,
    diet_type: Option<DietType>,
    body: Option<BodyStats>,
    activity_level: Option<ActivityLevel>,
}

impl ProfileFields {
    fn parse(&self) -> ToolResult<ParsedFields> {
        let body = match (self.weight_kg, self.height_cm, self.age, self.sex.as_deref()) {
            (None, None, None, None) => None,
            (Some(weight_kg), Some(height_cm), Some(age), Some(sex)) => Some(BodyStats {
                weight_kg,
                height_cm,
                age,
                sex: sex.parse::<Sex>()?,
            }),
            _ => {
                return Err(ToolError::InvalidInput(
                    "Body stats need all of weight_kg, height_cm, age and sex".to_string(),
                ))
            }
        };

        Ok(ParsedFields {
            goal: self.goal.as_deref().map(str::parse::<Goal>).transpose()?,
            diet_type: self.diet_type.as_deref().map(str::parse::<DietType>).transpose()?,
            body,
            activity_level: self
                .activity_level
                .as_deref()
                .map(str::parse::<ActivityLevel>)
                .transpose()?,
        })
    }
}

/// Response for calculate_targets
#[derive(Debug, Serialize)]
pub struct CalculateTargetsResponse {
    pub user_id: i64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    pub body: BodyStats,
    pub targets: DailyTargets,
    pub applied: bool,
}

fn compute_targets(
    body: &BodyStats,
    activity: ActivityLevel,
    goal: Goal,
    config: &EngineConfig,
) -> ToolResult<DailyTargets> {
    derive_targets(body, activity, goal, &config.targets, &config.macro_factors)
        .map_err(|e| ToolError::engine("Failed to calculate targets", e))
}

/// Create a user. Without explicit targets, targets are calculated from body
/// stats and activity level when both are given, otherwise defaults apply.
pub fn create_user(db: &Database, fields: &ProfileFields, config: &EngineConfig) -> ToolResult<UserProfile> {
    let name = fields
        .name
        .clone()
        .ok_or_else(|| ToolError::InvalidInput("name is required".to_string()))?;
    let parsed = fields.parse()?;
    let goal = parsed.goal.unwrap_or(Goal::Maintain);

    let daily_targets = match (fields.daily_targets, parsed.body, parsed.activity_level) {
        (Some(targets), _, _) => targets,
        (None, Some(body), Some(activity)) => compute_targets(&body, activity, goal, config)?,
        _ => DailyTargets::default(),
    };

    let data = UserCreate {
        name,
        daily_targets,
        goal,
        diet_type: parsed.diet_type.unwrap_or(DietType::Standard),
        allergies: fields.allergies.clone().unwrap_or_default(),
        body: parsed.body,
        activity_level: parsed.activity_level,
    };

    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;
    let user = UserProfile::create(&conn, &data).map_err(|e| ToolError::database("Failed to create user", e))?;
    tracing::info!(user_id = user.id, goal = %user.goal, "created user");
    Ok(user)
}

pub fn get_user(db: &Database, id: i64) -> ToolResult<Option<UserProfile>> {
    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    UserProfile::get_by_id(&conn, id).map_err(|e| ToolError::database("Failed to get user", e))
}

pub fn update_user(db: &Database, id: i64, fields: &ProfileFields) -> ToolResult<Option<UserProfile>> {
    let parsed = fields.parse()?;
    let data = UserUpdate {
        name: fields.name.clone(),
        daily_targets: fields.daily_targets,
        goal: parsed.goal,
        diet_type: parsed.diet_type,
        allergies: fields.allergies.clone(),
        body: parsed.body,
        activity_level: parsed.activity_level,
    };

    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    UserProfile::update(&conn, id, &data).map_err(|e| ToolError::database("Failed to update user", e))
}

/// Calculate targets from the user's stored body stats, optionally saving them
pub fn calculate_targets(
    db: &Database,
    user_id: i64,
    apply: bool,
    config: &EngineConfig,
) -> ToolResult<CalculateTargetsResponse> {
    let conn = db.get_conn().map_err(|e| ToolError::database("Database error", e))?;

    let user = UserProfile::get_by_id(&conn, user_id)
        .map_err(|e| ToolError::database("Failed to get user", e))?
        .ok_or_else(|| ToolError::InvalidInput(format!("User not found with id: {}", user_id)))?;
    let body = user
        .body
        .ok_or_else(|| {
            ToolError::InvalidInput(format!(
                "User {} has no body stats; set weight, height, age and sex first",
                user_id
            ))
        })?;
    let activity = user
        .activity_level
        .ok_or_else(|| ToolError::InvalidInput(format!("User {} has no activity level set", user_id)))?;

    let targets = compute_targets(&body, activity, user.goal, config)?;

    if apply {
        let update = UserUpdate {
            daily_targets: Some(targets),
            ..UserUpdate::default()
        };
        UserProfile::update(&conn, user_id, &update).map_err(|e| ToolError::database("Failed to save targets", e))?;
        tracing::info!(user_id, calories = targets.calories, "applied calculated targets");
    }

    Ok(CalculateTargetsResponse {
        user_id,
        goal: user.goal,
        activity_level: activity,
        body,
        targets,
        applied: apply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn athlete() -> ProfileFields {
        ProfileFields {
            name: Some("Alex".to_string()),
            goal: Some("build-muscle".to_string()),
            diet_type: Some("vegan".to_string()),
            weight_kg: Some(80.0),
            height_cm: Some(180.0),
            age: Some(30),
            sex: Some("male".to_string()),
            activity_level: Some("moderate".to_string()),
            ..ProfileFields::default()
        }
    }

    #[test]
    fn test_create_calculates_targets_from_body() {
        let db = setup();
        let user = create_user(&db, &athlete(), &EngineConfig::default()).unwrap();
        assert_eq!(user.goal, Goal::BuildMuscle);
        assert_eq!(user.diet_type, DietType::Vegan);
        // 1780 × 1.55 + 300
        assert_eq!(user.daily_targets.calories, 3059.0);
        assert_eq!(user.daily_targets.water, 2800.0);
    }

    #[test]
    fn test_create_defaults() {
        let db = setup();
        let fields = ProfileFields {
            name: Some("Kim".to_string()),
            ..ProfileFields::default()
        };
        let user = create_user(&db, &fields, &EngineConfig::default()).unwrap();
        assert_eq!(user.goal, Goal::Maintain);
        assert_eq!(user.diet_type, DietType::Standard);
        assert_eq!(user.daily_targets, DailyTargets::default());
        assert!(user.body.is_none());
    }

    #[test]
    fn test_rejects_bad_fields() {
        let db = setup();
        let config = EngineConfig::default();
        let bad_goal = ProfileFields {
            goal: Some("bulk".to_string()),
            ..athlete()
        };
        assert!(create_user(&db, &bad_goal, &config).is_err());

        let partial_body = ProfileFields {
            age: None,
            ..athlete()
        };
        assert!(create_user(&db, &partial_body, &config).unwrap_err().to_string().contains("Body stats"));

        assert!(create_user(&db, &ProfileFields::default(), &config).is_err());
    }

    #[test]
    fn test_update_then_calculate_and_apply() {
        let db = setup();
        let config = EngineConfig::default();
        let fields = ProfileFields {
            name: Some("Jo".to_string()),
            ..ProfileFields::default()
        };
        let user = create_user(&db, &fields, &config).unwrap();
        assert!(calculate_targets(&db, user.id, false, &config).is_err());

        let body = ProfileFields {
            goal: Some("maintain".to_string()),
            diet_type: None,
            name: None,
            ..athlete()
        };
        update_user(&db, user.id, &body).unwrap().unwrap();

        let preview = calculate_targets(&db, user.id, false, &config).unwrap();
        assert_eq!(preview.targets.calories, 2759.0);
        assert!(!preview.applied);
        assert_eq!(get_user(&db, user.id).unwrap().unwrap().daily_targets, DailyTargets::default());

        calculate_targets(&db, user.id, true, &config).unwrap();
        assert_eq!(get_user(&db, user.id).unwrap().unwrap().daily_targets.calories, 2759.0);
    }
}
