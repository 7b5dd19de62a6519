//! Rule-based recommendations
//!
//! An ordered battery of independent rules is evaluated against a shared
//! [`RuleContext`]. Each rule yields at most one recommendation; the results
//! are flattened and stable-sorted by priority, so equal priorities keep the
//! order the rules were evaluated in.

mod rules;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{DailyTargets, Goal, MealRecord, MealSlot};
use super::clock::Now;
use super::config::RuleThresholds;
use super::summary::DailySummary;

pub use rules::{
    BreakfastRule, CalorieRule, CarbBalanceRule, FatBalanceRule, GoalRule, HydrationRule,
    ProteinRule, SnackingRule, CALORIE_DENSE_FOODS, FIBER_FOODS, HIGH_PROTEIN_FOODS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Calories,
    Protein,
    MacroBalance,
    MealTiming,
    Goal,
    Hydration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: Category,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub action: Option<String>,
    /// Food names, best first
    pub suggestions: Vec<String>,
    /// Figures behind the recommendation, e.g. `percentage` or `over_by`
    pub data: BTreeMap<String, f64>,
}

impl Recommendation {
    pub fn new(category: Category, priority: Priority, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            priority,
            title: title.into(),
            message: message.into(),
            action: None,
            suggestions: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_suggestions(mut self, foods: &[&str]) -> Self {
        self.suggestions = foods.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_data(mut self, key: &str, value: f64) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }
}

/// consumed / target × 100, or 0 when there is no target
pub fn percentage(consumed: f64, target: f64) -> f64 {
    if target > 0.0 {
        consumed / target * 100.0
    } else {
        0.0
    }
}

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub today: &'a DailySummary,
    /// Records of the 7-day window ending today
    pub week: &'a [MealRecord],
    pub targets: &'a DailyTargets,
    pub goal: Goal,
    pub now: Now,
    pub thresholds: &'a RuleThresholds,
}

impl RuleContext<'_> {
    pub fn calorie_pct(&self) -> f64 {
        percentage(self.today.total_calories, self.targets.calories)
    }

    pub fn protein_pct(&self) -> f64 {
        percentage(self.today.total_protein, self.targets.protein)
    }

    pub fn fiber_pct(&self) -> f64 {
        percentage(self.today.total_fiber, self.targets.fiber)
    }

    /// protein + carbs + fat in grams
    pub fn macro_grams(&self) -> f64 {
        self.today.total_protein + self.today.total_carbs + self.today.total_fat
    }

    pub fn weekly_slot_count(&self, slot: MealSlot) -> usize {
        self.week.iter().filter(|r| r.meal_slot == slot).count()
    }
}

pub trait RecommendationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation>;
}

pub struct RecommendationEngine {
    rules: Vec<Box<dyn RecommendationRule>>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// The standard rule battery, in evaluation order
pub fn default_rules() -> Vec<Box<dyn RecommendationRule>> {
    vec![
        Box::new(CalorieRule),
        Box::new(ProteinRule),
        Box::new(CarbBalanceRule),
        Box::new(FatBalanceRule),
        Box::new(BreakfastRule),
        Box::new(SnackingRule),
        Box::new(GoalRule),
        Box::new(HydrationRule),
    ]
}

impl RecommendationEngine {
    pub fn new(rules: Vec<Box<dyn RecommendationRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn generate(&self, ctx: &RuleContext<'_>) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let fired = rule.evaluate(ctx);
                if fired.is_some() {
                    tracing::debug!(rule = rule.name(), "recommendation rule fired");
                }
                fired
            })
            .collect();

        // sort_by is stable
        recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
        recommendations
    }
}
