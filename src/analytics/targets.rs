//! Daily targets from body stats
//!
//! Mifflin-St Jeor BMR, scaled by activity, shifted by goal, then split into
//! macro grams with the goal's split table.

use crate::models::{ActivityLevel, BodyStats, DailyTargets, Goal, Sex};
use super::config::{MacroCalorieFactors, TargetFactors};
use super::error::{EngineError, EngineResult};

fn validate_body(body: &BodyStats) -> EngineResult<()> {
    if !(body.weight_kg > 0.0 && body.weight_kg <= 300.0) {
        return Err(EngineError::InvalidInput(format!(
            "Weight must be between 0 and 300 kg, got {}",
            body.weight_kg
        )));
    }
    if !(body.height_cm > 0.0 && body.height_cm <= 300.0) {
        return Err(EngineError::InvalidInput(format!(
            "Height must be between 0 and 300 cm, got {}",
            body.height_cm
        )));
    }
    if !(10..=120).contains(&body.age) {
        return Err(EngineError::InvalidInput(format!(
            "Age must be between 10 and 120 years, got {}",
            body.age
        )));
    }
    Ok(())
}

/// Basal metabolic rate in kcal/day
pub fn basal_metabolic_rate(body: &BodyStats, factors: &TargetFactors) -> EngineResult<f64> {
    validate_body(body)?;

    let sex_constant = match body.sex {
        Sex::Male => factors.msj_male_constant,
        Sex::Female => factors.msj_female_constant,
    };
    Ok(factors.msj_weight_coef * body.weight_kg
        + factors.msj_height_coef * body.height_cm
        + factors.msj_age_coef * f64::from(body.age)
        + sex_constant)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn calculate_targets(
    body: &BodyStats,
    activity: ActivityLevel,
    goal: Goal,
    factors: &TargetFactors,
    macro_factors: &MacroCalorieFactors,
) -> EngineResult<DailyTargets> {
    let bmr = basal_metabolic_rate(body, factors)?;
    let tdee = bmr * activity.multiplier();
    let calories = (tdee + goal.calorie_adjustment()).max(factors.min_calories).round();
    let split = goal.macro_split();

    let targets = DailyTargets {
        calories,
        protein: round1(calories * split.protein / macro_factors.protein),
        carbs: round1(calories * split.carbs / macro_factors.carbs),
        fat: round1(calories * split.fat / macro_factors.fat),
        fiber: round1(calories / 1000.0 * factors.fiber_per_1000_kcal),
        water: (body.weight_kg * factors.water_ml_per_kg).round(),
    };

    tracing::debug!(bmr, tdee, calories, goal = %goal, "calculated daily targets");
    Ok(targets)
}
