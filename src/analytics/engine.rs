//! The analytics facade
//!
//! [`NutritionEngine`] reads through the collaborator traits, takes "now" from
//! the injected clock and hands the data to the pure analytic functions.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{MealRecord, MealSlot, UserProfile};
use super::clock::{Clock, Now};
use super::config::EngineConfig;
use super::error::{EngineError, EngineResult};
use super::macros::{analyze_macros, MacroAnalysis};
use super::recommendations::{Recommendation, RecommendationEngine, RuleContext};
use super::store::{MealRecordStore, UserStore};
use super::suggestions::{remaining_budget, suggest_meals, MealSuggestions};
use super::summary::{summarize_records, summarize_week, week_start, DailySummary, WeeklySummary};
use super::trend::{nutrition_trend, NutritionTrend};

/// Everything the dashboard view shows, computed in one call
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub now: Now,
    pub today: DailySummary,
    pub macros: MacroAnalysis,
    pub weekly: WeeklySummary,
    pub recent_meals: Vec<MealRecord>,
    pub recommendations: Vec<Recommendation>,
}

pub struct NutritionEngine {
    records: Arc<dyn MealRecordStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    recommender: RecommendationEngine,
}

impl NutritionEngine {
    pub fn new(records: Arc<dyn MealRecordStore>, users: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records,
            users,
            clock,
            config: EngineConfig::default(),
            recommender: RecommendationEngine::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_recommender(mut self, recommender: RecommendationEngine) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Now {
        self.clock.now()
    }

    async fn load_user(&self, user_id: i64) -> EngineResult<UserProfile> {
        self.users
            .fetch_user(user_id)
            .await?
            .ok_or(EngineError::UserNotFound(user_id))
    }

    /// Fail with [`EngineError::UserNotFound`] unless the user exists
    pub async fn ensure_user(&self, user_id: i64) -> EngineResult<()> {
        self.load_user(user_id).await.map(|_| ())
    }

    async fn load_records(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> EngineResult<Vec<MealRecord>> {
        Ok(self.records.fetch_records(user_id, start, end).await?)
    }

    async fn load_recent(&self, user_id: i64) -> EngineResult<Vec<MealRecord>> {
        Ok(self
            .records
            .fetch_recent(user_id, self.config.recent_meals_limit)
            .await?)
    }

    /// Totals for one calendar day; all zero when nothing was logged
    pub async fn summarize(&self, user_id: i64, date: NaiveDate) -> EngineResult<DailySummary> {
        let records = self.load_records(user_id, date, date).await?;
        let summary = summarize_records(date, &records);
        tracing::debug!(user_id, %date, meals = summary.meal_count, "summarized day");
        Ok(summary)
    }

    /// The 7 days ending on `end_date`, or on today when none is given
    pub async fn weekly_summary(&self, user_id: i64, end_date: Option<NaiveDate>) -> EngineResult<WeeklySummary> {
        let end = end_date.unwrap_or_else(|| self.now().date);
        let records = self.load_records(user_id, week_start(end), end).await?;
        Ok(summarize_week(end, &records, &self.config.macro_factors))
    }

    pub async fn build_trend(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> EngineResult<NutritionTrend> {
        if start > end {
            return Err(EngineError::InvalidDateRange { start, end });
        }
        let records = self.load_records(user_id, start, end).await?;
        let trend = nutrition_trend(&records, start, end);
        tracing::debug!(
            user_id,
            %start,
            %end,
            days_with_meals = trend.statistics.days_with_meals,
            "built trend"
        );
        Ok(trend)
    }

    pub async fn analyze_macros_for_day(&self, user_id: i64, date: NaiveDate) -> EngineResult<MacroAnalysis> {
        let summary = self.summarize(user_id, date).await?;
        Ok(analyze_macros(&summary.totals(), &self.config.macro_factors))
    }

    fn recommend(&self, user: &UserProfile, now: Now, today: &DailySummary, week: &[MealRecord]) -> Vec<Recommendation> {
        let ctx = RuleContext {
            today,
            week,
            targets: &user.daily_targets,
            goal: user.goal,
            now,
            thresholds: &self.config.thresholds,
        };
        self.recommender.generate(&ctx)
    }

    /// Prioritized recommendations for today, highest priority first
    pub async fn generate_recommendations(&self, user_id: i64) -> EngineResult<Vec<Recommendation>> {
        let now = self.now();
        let (user, week) = tokio::try_join!(
            self.load_user(user_id),
            self.load_records(user_id, week_start(now.date), now.date),
        )?;

        let today = summarize_records(now.date, &week);
        let recommendations = self.recommend(&user, now, &today, &week);
        tracing::debug!(user_id, count = recommendations.len(), "generated recommendations");
        Ok(recommendations)
    }

    /// Ranked meal ideas for `slot` sized to what is left of today's budget
    pub async fn suggest(&self, user_id: i64, slot: MealSlot) -> EngineResult<MealSuggestions> {
        let date = self.now().date;
        let (user, records) = tokio::try_join!(
            self.load_user(user_id),
            self.load_records(user_id, date, date),
        )?;

        let today = summarize_records(date, &records);
        let remaining = remaining_budget(&user.daily_targets, &today);
        Ok(suggest_meals(slot, remaining, user.goal, user.diet_type, &self.config.scoring))
    }

    pub async fn dashboard(&self, user_id: i64) -> EngineResult<Dashboard> {
        let now = self.now();
        let (user, week, recent_meals) = tokio::try_join!(
            self.load_user(user_id),
            self.load_records(user_id, week_start(now.date), now.date),
            self.load_recent(user_id),
        )?;

        let today = summarize_records(now.date, &week);
        let macros = analyze_macros(&today.totals(), &self.config.macro_factors);
        let weekly = summarize_week(now.date, &week, &self.config.macro_factors);
        let recommendations = self.recommend(&user, now, &today, &week);

        Ok(Dashboard {
            now,
            today,
            macros,
            weekly,
            recent_meals,
            recommendations,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::analytics::error::StoreResult;
    use crate::analytics::store::{MealRecordStore, UserStore};
    use crate::models::{DailyTargets, DietType, Goal, MealRecord, UserProfile};

    #[derive(Default)]
    pub struct MemoryStore {
        pub records: Vec<MealRecord>,
        pub users: HashMap<i64, UserProfile>,
    }

    pub fn profile(id: i64, goal: Goal, diet_type: DietType) -> UserProfile {
        UserProfile {
            id,
            name: format!("user {}", id),
            daily_targets: DailyTargets::default(),
            goal,
            diet_type,
            allergies: Vec::new(),
            body: None,
            activity_level: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[async_trait]
    impl MealRecordStore for MemoryStore {
        async fn fetch_records(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<MealRecord>> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.user_id == user_id && (start..=end).contains(&r.consumed_at.date()))
                .cloned()
                .collect())
        }

        async fn fetch_recent(&self, user_id: i64, limit: usize) -> StoreResult<Vec<MealRecord>> {
            let mut mine: Vec<MealRecord> = self.records.iter().filter(|r| r.user_id == user_id).cloned().collect();
            mine.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
            mine.truncate(limit);
            Ok(mine)
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn fetch_user(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
            Ok(self.users.get(&user_id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::analytics::clock::FixedClock;
    use crate::analytics::recommendations::{Category, Priority};
    use crate::analytics::summary::test_support::{at, date, macros, record};
    use crate::models::{DietType, Goal};

    fn engine(store: MemoryStore, date_str: &str, hour: u32) -> NutritionEngine {
        let store = Arc::new(store);
        NutritionEngine::new(
            store.clone(),
            store,
            Arc::new(FixedClock(Now::new(date(date_str), hour))),
        )
    }

    fn store_with(goal: Goal, diet: DietType, records: Vec<MealRecord>) -> MemoryStore {
        let mut store = MemoryStore {
            records,
            ..MemoryStore::default()
        };
        store.users.insert(1, profile(1, goal, diet));
        store
    }

    #[tokio::test]
    async fn test_summarize_empty_day() {
        let engine = engine(store_with(Goal::Maintain, DietType::Standard, vec![]), "2026-03-09", 12);
        let summary = engine.summarize(1, date("2026-03-09")).await.unwrap();
        assert_eq!(summary.meal_count, 0);
        assert_eq!(summary.total_calories, 0.0);
    }

    #[tokio::test]
    async fn test_trend_gap_fill_through_engine() {
        let records = vec![record("2026-03-02 12:00", MealSlot::Lunch, macros(600.0, 30.0, 70.0, 20.0))];
        let engine = engine(store_with(Goal::Maintain, DietType::Standard, records), "2026-03-09", 12);

        let trend = engine.build_trend(1, date("2026-03-01"), date("2026-03-03")).await.unwrap();
        assert_eq!(trend.points.len(), 3);
        assert_eq!(trend.points[0].meal_count, 0);
        assert_eq!(trend.points[1].nutrition.calories, 600.0);
        assert_eq!(trend.statistics.days_with_meals, 1);
        assert_eq!(trend.statistics.total_days, 3);
    }

    #[tokio::test]
    async fn test_inverted_trend_window_is_rejected() {
        let engine = engine(store_with(Goal::Maintain, DietType::Standard, vec![]), "2026-03-09", 12);
        let err = engine.build_trend(1, date("2026-03-05"), date("2026-03-01")).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let engine = engine(MemoryStore::default(), "2026-03-09", 12);
        assert!(matches!(
            engine.generate_recommendations(7).await,
            Err(EngineError::UserNotFound(7))
        ));
        assert!(matches!(engine.dashboard(7).await, Err(EngineError::UserNotFound(7))));
    }

    #[tokio::test]
    async fn test_recommendations_use_injected_clock() {
        let engine = engine(store_with(Goal::Maintain, DietType::Standard, vec![]), "2026-03-09", 11);
        let recs = engine.generate_recommendations(1).await.unwrap();

        assert_eq!(recs[0].category, Category::Calories);
        assert_eq!(recs[0].priority, Priority::High);
        assert!(recs[0].title.contains("haven't logged any meals"));
    }

    #[tokio::test]
    async fn test_suggestions_use_remaining_budget() {
        let records = vec![
            record("2026-03-09 08:00", MealSlot::Breakfast, macros(900.0, 30.0, 120.0, 30.0)),
            record("2026-03-09 10:30", MealSlot::Snack, macros(800.0, 10.0, 100.0, 35.0)),
            record("2026-03-08 19:00", MealSlot::Dinner, macros(900.0, 40.0, 90.0, 35.0)),
        ];
        let engine = engine(store_with(Goal::Maintain, DietType::Vegetarian, records), "2026-03-09", 12);

        let result = engine.suggest(1, MealSlot::Lunch).await.unwrap();
        assert_eq!(result.remaining_nutrition.calories, 300.0);
        assert_eq!(result.remaining_nutrition.protein, 10.0);
        assert!(result.suggestions.iter().all(|s| s.tags.iter().any(|t| t == "vegetarian")));
        assert!(result.suggestions.len() <= 5);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let records = vec![
            record("2026-03-03 08:00", MealSlot::Breakfast, macros(400.0, 20.0, 50.0, 12.0)),
            record("2026-03-09 08:00", MealSlot::Breakfast, macros(500.0, 25.0, 60.0, 15.0)),
            record("2026-03-09 13:00", MealSlot::Lunch, macros(700.0, 35.0, 80.0, 22.0)),
            record("2026-02-20 13:00", MealSlot::Lunch, macros(650.0, 30.0, 75.0, 20.0)),
        ];
        let engine = engine(store_with(Goal::Maintain, DietType::Standard, records), "2026-03-09", 15);

        let dashboard = engine.dashboard(1).await.unwrap();
        assert_eq!(dashboard.today.meal_count, 2);
        assert_eq!(dashboard.today.total_calories, 1200.0);
        assert_eq!(dashboard.weekly.days.len(), 7);
        assert_eq!(dashboard.weekly.meal_count, 3);
        assert_eq!(dashboard.recent_meals.len(), 4);
        assert_eq!(dashboard.recent_meals[0].consumed_at, at("2026-03-09 13:00"));
        assert!(dashboard.macros.distribution.protein > 0);
        assert!(dashboard
            .recommendations
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority));
    }
}
