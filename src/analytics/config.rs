//! Engine configuration
//!
//! Typed constant tables for every threshold, factor and weight the analytics
//! use. All tables are immutable and come with `Default` values; the engine
//! receives them through [`EngineConfig`].

use serde::Serialize;

use crate::models::{ActivityLevel, Goal};

/// Energy per gram of each macro-nutrient (kcal/g)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroCalorieFactors {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for MacroCalorieFactors {
    fn default() -> Self {
        Self {
            protein: 4.0,
            carbs: 4.0,
            fat: 9.0,
        }
    }
}

/// Trigger thresholds for the recommendation rules.
///
/// Percentages are consumed/target × 100; hours are 0-23 local server time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleThresholds {
    pub first_meal_hour: u32,
    pub low_calorie_pct: f64,
    pub low_calorie_hour: u32,
    pub on_track_calorie_pct: f64,
    pub low_protein_pct: f64,
    pub low_protein_hour: u32,
    pub muscle_protein_pct: f64,
    pub muscle_protein_hour: u32,
    pub carb_ratio_max: f64,
    pub fat_ratio_max: f64,
    pub min_weekly_breakfasts: usize,
    pub max_weekly_snacks: usize,
    pub low_fiber_pct: f64,
    pub surplus_calorie_pct: f64,
    pub surplus_hour: u32,
    pub maintain_tolerance_pct: f64,
    pub hydration_start_hour: u32,
    pub hydration_end_hour: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            first_meal_hour: 10,
            low_calorie_pct: 30.0,
            low_calorie_hour: 14,
            on_track_calorie_pct: 80.0,
            low_protein_pct: 50.0,
            low_protein_hour: 18,
            muscle_protein_pct: 80.0,
            muscle_protein_hour: 15,
            carb_ratio_max: 0.70,
            fat_ratio_max: 0.50,
            min_weekly_breakfasts: 3,
            max_weekly_snacks: 10,
            low_fiber_pct: 50.0,
            surplus_calorie_pct: 90.0,
            surplus_hour: 20,
            maintain_tolerance_pct: 10.0,
            hydration_start_hour: 12,
            hydration_end_hour: 18,
        }
    }
}

/// Score adjustments applied to meal-template candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub base_score: f64,
    pub over_budget_factor: f64,
    pub over_budget_penalty: f64,
    pub protein_gap_min: f64,
    pub protein_candidate_min: f64,
    pub protein_gap_bonus: f64,
    pub light_meal_factor: f64,
    pub light_meal_bonus: f64,
    pub muscle_protein_min: f64,
    pub muscle_protein_bonus: f64,
    pub max_suggestions: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base_score: 100.0,
            over_budget_factor: 1.2,
            over_budget_penalty: 30.0,
            protein_gap_min: 20.0,
            protein_candidate_min: 15.0,
            protein_gap_bonus: 20.0,
            light_meal_factor: 0.4,
            light_meal_bonus: 15.0,
            muscle_protein_min: 20.0,
            muscle_protein_bonus: 20.0,
            max_suggestions: 5,
        }
    }
}

/// Macro split as fractions of total calories
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Factors for deriving daily targets from body stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetFactors {
    pub msj_weight_coef: f64,
    pub msj_height_coef: f64,
    pub msj_age_coef: f64,
    pub msj_male_constant: f64,
    pub msj_female_constant: f64,
    pub min_calories: f64,
    pub fiber_per_1000_kcal: f64,
    pub water_ml_per_kg: f64,
}

impl Default for TargetFactors {
    fn default() -> Self {
        Self {
            msj_weight_coef: 10.0,
            msj_height_coef: 6.25,
            msj_age_coef: -5.0,
            msj_male_constant: 5.0,
            msj_female_constant: -161.0,
            min_calories: 1200.0,
            fiber_per_1000_kcal: 14.0,
            water_ml_per_kg: 35.0,
        }
    }
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl Goal {
    /// Daily kcal added to (or removed from) maintenance energy
    pub fn calorie_adjustment(&self) -> f64 {
        match self {
            Goal::LoseWeight => -500.0,
            Goal::Maintain => 0.0,
            Goal::GainWeight => 500.0,
            Goal::BuildMuscle => 300.0,
        }
    }

    /// Share of calories per macro for this goal
    pub fn macro_split(&self) -> MacroSplit {
        match self {
            Goal::LoseWeight => MacroSplit { protein: 0.30, carbs: 0.40, fat: 0.30 },
            Goal::Maintain => MacroSplit { protein: 0.20, carbs: 0.50, fat: 0.30 },
            Goal::GainWeight => MacroSplit { protein: 0.20, carbs: 0.55, fat: 0.25 },
            Goal::BuildMuscle => MacroSplit { protein: 0.30, carbs: 0.45, fat: 0.25 },
        }
    }
}

/// Complete immutable configuration for one engine instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineConfig {
    pub macro_factors: MacroCalorieFactors,
    pub thresholds: RuleThresholds,
    pub scoring: ScoringWeights,
    pub targets: TargetFactors,
    /// Number of records returned by the dashboard's recent-meals list
    pub recent_meals_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            macro_factors: MacroCalorieFactors::default(),
            thresholds: RuleThresholds::default(),
            scoring: ScoringWeights::default(),
            targets: TargetFactors::default(),
            recent_meals_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_splits_sum_to_one() {
        for goal in [Goal::LoseWeight, Goal::Maintain, Goal::GainWeight, Goal::BuildMuscle] {
            let split = goal.macro_split();
            assert!((split.protein + split.carbs + split.fat - 1.0).abs() < 1e-9, "{:?}", goal);
        }
    }

    #[test]
    fn test_activity_multipliers_increase() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0].multiplier() < pair[1].multiplier());
        }
    }
}
