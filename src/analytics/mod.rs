//! Nutrition analytics and recommendations
//!
//! Pure computations over meal records: daily and weekly summaries,
//! gap-filled trends, macro distribution, rule-based recommendations and
//! slot-based meal suggestions. Data comes in through the [`store`] traits and
//! time through the [`clock`]; nothing here writes.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod macros;
pub mod recommendations;
pub mod store;
pub mod suggestions;
pub mod summary;
pub mod targets;
pub mod trend;

pub use clock::{Clock, FixedClock, Now, SystemClock};
pub use config::{EngineConfig, MacroCalorieFactors, RuleThresholds, ScoringWeights, TargetFactors};
pub use engine::{Dashboard, NutritionEngine};
pub use error::{EngineError, EngineResult, StoreError, StoreResult};
pub use macros::{analyze_macros, MacroAnalysis, MacroDistribution};
pub use recommendations::{Category, Priority, Recommendation, RecommendationEngine, RecommendationRule, RuleContext};
pub use store::{MealRecordStore, UserStore};
pub use suggestions::{MealSuggestion, MealSuggestions, RemainingNutrition};
pub use summary::{DailySummary, WeeklySummary};
pub use targets::calculate_targets;
pub use trend::{build_trend, NutritionTrend, TrendPoint, TrendStatistics};
