//! Analytics tools
//!
//! Thin async wrappers around [`NutritionEngine`]: parse arguments, make sure
//! the user exists, run the computation.

use chrono::Duration;
use serde::Serialize;

use crate::analytics::{
    Dashboard, DailySummary, MacroAnalysis, MealSuggestions, NutritionEngine, NutritionTrend, Now,
    Recommendation, WeeklySummary,
};
use super::{parse_date, parse_slot, ToolError, ToolResult};

/// Longest window accepted by nutrition_trend
pub const MAX_TREND_DAYS: i64 = 366;

#[derive(Debug, Serialize)]
pub struct MacroAnalysisResponse {
    pub user_id: i64,
    pub date: String,
    #[serde(flatten)]
    pub analysis: MacroAnalysis,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub user_id: i64,
    pub evaluated_at: Now,
    pub count: usize,
    pub recommendations: Vec<Recommendation>,
}

/// Today's summary, or the given day's
pub async fn daily_summary(engine: &NutritionEngine, user_id: i64, date: Option<&str>) -> ToolResult<DailySummary> {
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => engine.now().date,
    };
    engine.ensure_user(user_id).await?;

    engine
        .summarize(user_id, date)
        .await
        .map_err(|e| ToolError::engine("Failed to summarize day", e))
}

pub async fn weekly_summary(
    engine: &NutritionEngine,
    user_id: i64,
    end_date: Option<&str>,
) -> ToolResult<WeeklySummary> {
    let end_date = end_date.map(parse_date).transpose()?;
    engine.ensure_user(user_id).await?;

    engine
        .weekly_summary(user_id, end_date)
        .await
        .map_err(|e| ToolError::engine("Failed to build weekly summary", e))
}

/// Gap-filled trend. Without a start date the window is the 30 days ending
/// on `end_date` (today by default).
pub async fn nutrition_trend(
    engine: &NutritionEngine,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> ToolResult<NutritionTrend> {
    let end = match end_date {
        Some(raw) => parse_date(raw)?,
        None => engine.now().date,
    };
    let start = match start_date {
        Some(raw) => parse_date(raw)?,
        None => end - Duration::days(29),
    };
    if (end - start).num_days() >= MAX_TREND_DAYS {
        return Err(ToolError::InvalidInput(format!(
            "Trend window is limited to {} days",
            MAX_TREND_DAYS
        )));
    }
    engine.ensure_user(user_id).await?;

    engine
        .build_trend(user_id, start, end)
        .await
        .map_err(|e| ToolError::engine("Failed to build trend", e))
}

pub async fn macro_analysis(
    engine: &NutritionEngine,
    user_id: i64,
    date: Option<&str>,
) -> ToolResult<MacroAnalysisResponse> {
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => engine.now().date,
    };
    engine.ensure_user(user_id).await?;

    let analysis = engine
        .analyze_macros_for_day(user_id, date)
        .await
        .map_err(|e| ToolError::engine("Failed to analyze macros", e))?;

    Ok(MacroAnalysisResponse {
        user_id,
        date: date.to_string(),
        analysis,
    })
}

pub async fn recommendations(engine: &NutritionEngine, user_id: i64) -> ToolResult<RecommendationsResponse> {
    let recommendations = engine
        .generate_recommendations(user_id)
        .await
        .map_err(|e| ToolError::engine("Failed to generate recommendations", e))?;

    Ok(RecommendationsResponse {
        user_id,
        evaluated_at: engine.now(),
        count: recommendations.len(),
        recommendations,
    })
}

pub async fn meal_suggestions(
    engine: &NutritionEngine,
    user_id: i64,
    meal_slot: &str,
) -> ToolResult<MealSuggestions> {
    let slot = parse_slot(meal_slot)?;

    engine
        .suggest(user_id, slot)
        .await
        .map_err(|e| ToolError::engine("Failed to suggest meals", e))
}

pub async fn dashboard(engine: &NutritionEngine, user_id: i64) -> ToolResult<Dashboard> {
    engine
        .dashboard(user_id)
        .await
        .map_err(|e| ToolError::engine("Failed to build dashboard", e))
}
