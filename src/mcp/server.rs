//! Mealwise MCP Server Implementation
//!
//! Exposes profile, meal-record and analytics tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::analytics::{EngineConfig, NutritionEngine};
use crate::db::Database;
use crate::models::{DailyTargets, Nutrition};
use crate::tools::analytics;
use crate::tools::meals::{self, NutritionPatch};
use crate::tools::status::StatusTracker;
use crate::tools::users::{self, ProfileFields};
use crate::tools::ToolError;

/// Mealwise MCP Service
#[derive(Clone)]
pub struct MealwiseService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    engine: Arc<NutritionEngine>,
    config: EngineConfig,
    tool_router: ToolRouter<MealwiseService>,
}

impl MealwiseService {
    pub fn new(database_path: PathBuf, database: Database, engine: Arc<NutritionEngine>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            config: *engine.config(),
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

/// Pretty JSON tool result
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn tool_error(err: ToolError) -> McpError {
    match err {
        ToolError::InvalidInput(message) => McpError::invalid_params(message, None),
        ToolError::Internal(message) => McpError::internal_error(message, None),
    }
}

fn not_found(entity: &str, id: i64) -> Result<CallToolResult, McpError> {
    let json = format!(r#"{{"error": "{} not found", "id": {}}}"#, entity, id);
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
pub struct DailyTargetsParams {
    pub calories: f64,
    /// grams
    pub protein: f64,
    /// grams
    pub carbs: f64,
    /// grams
    pub fat: f64,
    /// grams
    pub fiber: f64,
    /// milliliters
    pub water: f64,
}

impl From<DailyTargetsParams> for DailyTargets {
    fn from(p: DailyTargetsParams) -> Self {
        DailyTargets {
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            fiber: p.fiber,
            water: p.water,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    pub name: String,
    /// lose_weight, maintain, gain_weight or build_muscle
    pub goal: Option<String>,
    /// standard, vegetarian, vegan, keto, paleo or mediterranean
    pub diet_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub daily_targets: Option<DailyTargetsParams>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    /// male or female
    pub sex: Option<String>,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUserParams {
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateUserParams {
    pub user_id: i64,
    pub name: Option<String>,
    pub goal: Option<String>,
    pub diet_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub daily_targets: Option<DailyTargetsParams>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculateTargetsParams {
    pub user_id: i64,
    /// Save the calculated targets to the profile
    #[serde(default)]
    pub apply: bool,
}

// ============================================================================
// Meal Record Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub user_id: i64,
    pub name: String,
    /// breakfast, lunch, dinner or snack
    pub meal_slot: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    /// milligrams
    #[serde(default)]
    pub sodium: f64,
    /// YYYY-MM-DD HH:MM, server local time; defaults to now
    pub consumed_at: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetMealRecordParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealRecordsParams {
    pub user_id: i64,
    /// YYYY-MM-DD; omit both dates for the most recent records
    pub start_date: Option<String>,
    /// YYYY-MM-DD; defaults to start_date
    pub end_date: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealRecordParams {
    pub id: i64,
    pub name: Option<String>,
    pub meal_slot: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub consumed_at: Option<String>,
    pub is_favorite: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteMealRecordParams {
    pub id: i64,
}

// ============================================================================
// Analytics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserDateParams {
    pub user_id: i64,
    /// YYYY-MM-DD; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeeklySummaryParams {
    pub user_id: i64,
    /// Last day of the 7-day window, YYYY-MM-DD; defaults to today
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NutritionTrendParams {
    pub user_id: i64,
    /// YYYY-MM-DD; defaults to 29 days before end_date
    pub start_date: Option<String>,
    /// YYYY-MM-DD; defaults to today
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MealSuggestionsParams {
    pub user_id: i64,
    /// breakfast, lunch, dinner or snack
    pub meal_slot: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MealwiseService {
    // --- Status ---

    #[tool(description = "Get the current status of the Mealwise service including build info, database status, and process information")]
    async fn mealwise_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database, self.engine.now());
        json_result(&status)
    }

    #[tool(description = "Get instructions for using the Mealwise tools. Call this when starting a session or when unsure how the analytics behave.")]
    fn analytics_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ANALYTICS_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ANALYTICS_INSTRUCTIONS)]))
    }

    // --- Users ---

    #[tool(description = "Create a user profile. Daily targets are calculated from body stats and activity level when not given explicitly.")]
    fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let fields = ProfileFields {
            name: Some(p.name), goal: p.goal, diet_type: p.diet_type, allergies: p.allergies,
            daily_targets: p.daily_targets.map(DailyTargets::from),
            weight_kg: p.weight_kg, height_cm: p.height_cm, age: p.age, sex: p.sex,
            activity_level: p.activity_level,
        };
        let result = users::create_user(&self.database, &fields, &self.config).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a user profile with goal, diet type and daily targets")]
    fn get_user(&self, Parameters(p): Parameters<GetUserParams>) -> Result<CallToolResult, McpError> {
        match users::get_user(&self.database, p.user_id).map_err(tool_error)? {
            Some(user) => json_result(&user),
            None => not_found("User", p.user_id),
        }
    }

    #[tool(description = "Update a user profile. Body stats must be given together (weight_kg, height_cm, age, sex).")]
    fn update_user(&self, Parameters(p): Parameters<UpdateUserParams>) -> Result<CallToolResult, McpError> {
        let fields = ProfileFields {
            name: p.name, goal: p.goal, diet_type: p.diet_type, allergies: p.allergies,
            daily_targets: p.daily_targets.map(DailyTargets::from),
            weight_kg: p.weight_kg, height_cm: p.height_cm, age: p.age, sex: p.sex,
            activity_level: p.activity_level,
        };
        match users::update_user(&self.database, p.user_id, &fields).map_err(tool_error)? {
            Some(user) => json_result(&user),
            None => not_found("User", p.user_id),
        }
    }

    #[tool(description = "Calculate daily targets (Mifflin-St Jeor) from the user's stored body stats, activity level and goal. Set apply=true to save them.")]
    fn calculate_targets(&self, Parameters(p): Parameters<CalculateTargetsParams>) -> Result<CallToolResult, McpError> {
        let result = users::calculate_targets(&self.database, p.user_id, p.apply, &self.config).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Meal Records ---

    #[tool(description = "Log a meal record with its nutrition for a meal slot (breakfast, lunch, dinner, snack)")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let nutrition = Nutrition {
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat,
            fiber: p.fiber, sugar: p.sugar, sodium: p.sodium,
        };
        let result = meals::log_meal(
            &self.database, p.user_id, &p.name, &p.meal_slot, nutrition,
            p.consumed_at.as_deref(), p.is_favorite, p.notes,
        ).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a meal record by ID")]
    fn get_meal_record(&self, Parameters(p): Parameters<GetMealRecordParams>) -> Result<CallToolResult, McpError> {
        match meals::get_meal_record(&self.database, p.id).map_err(tool_error)? {
            Some(record) => json_result(&record),
            None => not_found("Meal record", p.id),
        }
    }

    #[tool(description = "List a user's meal records for a date range, or the most recent records when no dates are given")]
    fn list_meal_records(&self, Parameters(p): Parameters<ListMealRecordsParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meal_records(
            &self.database, p.user_id, p.start_date.as_deref(), p.end_date.as_deref(), p.limit,
        ).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Update a meal record. Only the given fields change; nutrient fields are merged with the stored values.")]
    fn update_meal_record(&self, Parameters(p): Parameters<UpdateMealRecordParams>) -> Result<CallToolResult, McpError> {
        let patch = NutritionPatch {
            calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat,
            fiber: p.fiber, sugar: p.sugar, sodium: p.sodium,
        };
        let result = meals::update_meal_record(
            &self.database, p.id, p.name, p.meal_slot.as_deref(), &patch,
            p.consumed_at.as_deref(), p.is_favorite, p.notes,
        ).map_err(tool_error)?;
        match result {
            Some(record) => json_result(&record),
            None => not_found("Meal record", p.id),
        }
    }

    #[tool(description = "Delete a meal record")]
    fn delete_meal_record(&self, Parameters(p): Parameters<DeleteMealRecordParams>) -> Result<CallToolResult, McpError> {
        let deleted = meals::delete_meal_record(&self.database, p.id).map_err(tool_error)?;
        json_result(&serde_json::json!({ "id": p.id, "deleted": deleted }))
    }

    // --- Analytics ---

    #[tool(description = "Nutrient totals and meal count for one day (default today). Days without meals report zeros.")]
    async fn daily_summary(&self, Parameters(p): Parameters<UserDateParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::daily_summary(&self.engine, p.user_id, p.date.as_deref()).await.map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Seven daily summaries ending on end_date (default today), with totals, averages over tracked days and macro split")]
    async fn weekly_summary(&self, Parameters(p): Parameters<WeeklySummaryParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::weekly_summary(&self.engine, p.user_id, p.end_date.as_deref()).await.map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Gap-filled daily nutrition trend: one point per day in the window, ascending, plus statistics")]
    async fn nutrition_trend(&self, Parameters(p): Parameters<NutritionTrendParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::nutrition_trend(
            &self.engine, p.user_id, p.start_date.as_deref(), p.end_date.as_deref(),
        ).await.map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Protein/carbs/fat percentage of macro-derived calories for one day (default today)")]
    async fn macro_analysis(&self, Parameters(p): Parameters<UserDateParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::macro_analysis(&self.engine, p.user_id, p.date.as_deref()).await.map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Prioritized nutrition recommendations for today, highest priority first")]
    async fn recommendations(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::recommendations(&self.engine, p.user_id).await.map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Up to 5 meal suggestions for a slot, scored against today's remaining nutrition budget")]
    async fn meal_suggestions(&self, Parameters(p): Parameters<MealSuggestionsParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::meal_suggestions(&self.engine, p.user_id, &p.meal_slot).await.map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Combined view: today's summary and macros, the last 7 days, recent meals and recommendations")]
    async fn dashboard(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::dashboard(&self.engine, p.user_id).await.map_err(tool_error)?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for MealwiseService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealwise".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Mealwise Nutrition Analytics".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Mealwise - meal logging with nutrition analytics and recommendations. \
                 IMPORTANT: Call analytics_instructions first. \
                 Users: create_user/get_user/update_user, calculate_targets. \
                 Meals: log_meal/get_meal_record/list_meal_records/update_meal_record/delete_meal_record. \
                 Analytics: daily_summary, weekly_summary, nutrition_trend, macro_analysis, \
                 recommendations, meal_suggestions, dashboard. \
                 Status: mealwise_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rmcp::model::ErrorCode;

    use super::*;
    use crate::analytics::engine::test_support::{profile, MemoryStore};
    use crate::analytics::summary::test_support::date;
    use crate::analytics::{FixedClock, Now};
    use crate::db::migrations::run_migrations;
    use crate::models::{DietType, Goal};

    fn engine() -> NutritionEngine {
        let mut store = MemoryStore::default();
        store.users.insert(1, profile(1, Goal::Maintain, DietType::Standard));
        let store = Arc::new(store);
        NutritionEngine::new(store.clone(), store, Arc::new(FixedClock(Now::new(date("2026-03-09"), 9))))
    }

    #[tokio::test]
    async fn test_inverted_trend_window_is_invalid_params() {
        let err = analytics::nutrition_trend(&engine(), 1, Some("2026-03-09"), Some("2026-03-01"))
            .await
            .unwrap_err();
        assert_eq!(tool_error(err).code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_oversized_trend_window_is_invalid_params() {
        let err = analytics::nutrition_trend(&engine(), 1, Some("2025-01-01"), Some("2026-03-09"))
            .await
            .unwrap_err();
        assert_eq!(tool_error(err).code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_params() {
        let err = analytics::dashboard(&engine(), 42).await.unwrap_err();
        assert_eq!(tool_error(err).code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_out_of_range_calories_is_invalid_params() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        let fields = ProfileFields {
            name: Some("Sam".to_string()),
            ..ProfileFields::default()
        };
        let user = users::create_user(&db, &fields, &EngineConfig::default()).unwrap();

        let feast = Nutrition {
            calories: 20_000.0,
            ..Nutrition::zero()
        };
        let err = meals::log_meal(&db, user.id, "Feast", "dinner", feast, None, false, None).unwrap_err();
        let mcp = tool_error(err);
        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.contains("calories"));
    }

    #[test]
    fn test_internal_failures_stay_internal() {
        let err = ToolError::Internal("Database error: pool timed out".to_string());
        assert_eq!(tool_error(err).code, ErrorCode::INTERNAL_ERROR);
    }
}
