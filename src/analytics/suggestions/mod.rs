//! Slot-based meal suggestions
//!
//! Candidates from the static catalog are filtered by diet and scored
//! against what is left of the user's daily budget.

pub mod catalog;

use serde::Serialize;

use crate::models::{DailyTargets, DietType, Goal, MealSlot, Nutrition};
use super::config::ScoringWeights;
use super::summary::DailySummary;
use self::catalog::MealTemplate;

/// Target minus consumed, floored at zero, per nutrient
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RemainingNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

pub fn remaining_budget(targets: &DailyTargets, today: &DailySummary) -> RemainingNutrition {
    let left = |target: f64, consumed: f64| (target - consumed).max(0.0);
    RemainingNutrition {
        calories: left(targets.calories, today.total_calories),
        protein: left(targets.protein, today.total_protein),
        carbs: left(targets.carbs, today.total_carbs),
        fat: left(targets.fat, today.total_fat),
        fiber: left(targets.fiber, today.total_fiber),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSuggestion {
    pub name: String,
    pub nutrition: Nutrition,
    pub tags: Vec<String>,
    pub match_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealSuggestions {
    pub meal_slot: MealSlot,
    pub remaining_nutrition: RemainingNutrition,
    pub suggestions: Vec<MealSuggestion>,
}

/// Keep the templates compatible with `diet`.
///
/// Only vegetarian and vegan restrict the pool; every other diet type passes
/// all templates through.
pub fn filter_by_diet<'a, I>(templates: I, diet: DietType) -> Vec<&'a MealTemplate>
where
    I: IntoIterator<Item = &'a MealTemplate>,
{
    let required = match diet {
        DietType::Vegetarian => Some("vegetarian"),
        DietType::Vegan => Some("vegan"),
        other => {
            tracing::debug!(diet = %other, "diet type not applied to suggestions");
            None
        }
    };

    templates
        .into_iter()
        .filter(|t| required.map_or(true, |tag| t.has_tag(tag)))
        .collect()
}

/// Fit of one candidate against the remaining budget
pub fn score_candidate(
    candidate: &Nutrition,
    remaining: &RemainingNutrition,
    goal: Goal,
    weights: &ScoringWeights,
) -> f64 {
    let mut score = weights.base_score;

    if candidate.calories > remaining.calories * weights.over_budget_factor {
        score -= weights.over_budget_penalty;
    }
    if remaining.protein > weights.protein_gap_min && candidate.protein >= weights.protein_candidate_min {
        score += weights.protein_gap_bonus;
    }
    if goal == Goal::LoseWeight && candidate.calories <= remaining.calories * weights.light_meal_factor {
        score += weights.light_meal_bonus;
    }
    if goal == Goal::BuildMuscle && candidate.protein >= weights.muscle_protein_min {
        score += weights.muscle_protein_bonus;
    }

    score
}

/// Rank the slot's templates, best first, keeping catalog order among equal scores
pub fn suggest_meals(
    slot: MealSlot,
    remaining: RemainingNutrition,
    goal: Goal,
    diet: DietType,
    weights: &ScoringWeights,
) -> MealSuggestions {
    rank_templates(catalog::for_slot(slot), slot, remaining, goal, diet, weights)
}

fn rank_templates<'a, I>(
    templates: I,
    slot: MealSlot,
    remaining: RemainingNutrition,
    goal: Goal,
    diet: DietType,
    weights: &ScoringWeights,
) -> MealSuggestions
where
    I: IntoIterator<Item = &'a MealTemplate>,
{
    let mut suggestions: Vec<MealSuggestion> = filter_by_diet(templates, diet)
        .into_iter()
        .map(|t| MealSuggestion {
            name: t.name.to_string(),
            nutrition: t.nutrition,
            tags: t.tags.iter().map(|tag| tag.to_string()).collect(),
            match_score: score_candidate(&t.nutrition, &remaining, goal, weights),
        })
        .collect();

    suggestions.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    suggestions.truncate(weights.max_suggestions);

    MealSuggestions {
        meal_slot: slot,
        remaining_nutrition: remaining,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::summary::test_support::{date, macros};

    fn remaining(calories: f64, protein: f64) -> RemainingNutrition {
        RemainingNutrition {
            calories,
            protein,
            ..RemainingNutrition::default()
        }
    }

    fn template(name: &'static str, nutrition: Nutrition, tags: &'static [&'static str]) -> MealTemplate {
        MealTemplate {
            name,
            slot: MealSlot::Lunch,
            nutrition,
            tags,
        }
    }

    #[test]
    fn test_remaining_budget_floors_at_zero() {
        let today = DailySummary::from_totals(date("2026-03-09"), &macros(2300.0, 20.0, 100.0, 40.0), 3);
        let left = remaining_budget(&DailyTargets::default(), &today);
        assert_eq!(left.calories, 0.0);
        assert_eq!(left.protein, 30.0);
        assert_eq!(left.carbs, 150.0);
        assert_eq!(left.fat, 25.0);
        assert_eq!(left.fiber, 25.0);
    }

    #[test]
    fn test_over_budget_candidate_loses_thirty() {
        let score = score_candidate(
            &macros(500.0, 10.0, 60.0, 15.0),
            &remaining(300.0, 10.0),
            Goal::Maintain,
            &ScoringWeights::default(),
        );
        assert_eq!(score, 70.0);
    }

    #[test]
    fn test_budget_edge_is_not_penalized() {
        let score = score_candidate(
            &macros(360.0, 10.0, 40.0, 10.0),
            &remaining(300.0, 10.0),
            Goal::Maintain,
            &ScoringWeights::default(),
        );
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_bonuses_stack() {
        let weights = ScoringWeights::default();
        let light_protein = macros(200.0, 25.0, 5.0, 5.0);

        assert_eq!(score_candidate(&light_protein, &remaining(800.0, 40.0), Goal::Maintain, &weights), 120.0);
        assert_eq!(score_candidate(&light_protein, &remaining(800.0, 40.0), Goal::LoseWeight, &weights), 135.0);
        assert_eq!(score_candidate(&light_protein, &remaining(800.0, 40.0), Goal::BuildMuscle, &weights), 140.0);
        // no protein gap left
        assert_eq!(score_candidate(&light_protein, &remaining(800.0, 20.0), Goal::Maintain, &weights), 100.0);
    }

    #[test]
    fn test_diet_filters() {
        let pool = [
            template("steak", macros(600.0, 50.0, 0.0, 40.0), &["high_protein"]),
            template("omelette", macros(300.0, 20.0, 2.0, 20.0), &["vegetarian"]),
            template("dal", macros(400.0, 18.0, 60.0, 8.0), &["vegetarian", "vegan"]),
        ];

        let names = |diet: DietType| -> Vec<&'static str> { filter_by_diet(&pool, diet).iter().map(|t| t.name).collect() };
        assert_eq!(names(DietType::Vegetarian), vec!["omelette", "dal"]);
        assert_eq!(names(DietType::Vegan), vec!["dal"]);
        assert_eq!(names(DietType::Keto), vec!["steak", "omelette", "dal"]);
        assert_eq!(names(DietType::Standard).len(), 3);
    }

    #[test]
    fn test_ranking_is_stable_and_capped() {
        let pool: Vec<MealTemplate> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|name| template(name, macros(300.0, 5.0, 40.0, 10.0), &[]))
            .chain(std::iter::once(template("big", macros(900.0, 5.0, 100.0, 30.0), &[])))
            .chain(std::iter::once(template("protein", macros(300.0, 30.0, 10.0, 10.0), &[])))
            .collect();

        let result = rank_templates(
            &pool,
            MealSlot::Lunch,
            remaining(600.0, 40.0),
            Goal::Maintain,
            DietType::Standard,
            &ScoringWeights::default(),
        );

        let names: Vec<&str> = result.suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["protein", "a", "b", "c", "d"]);
        assert_eq!(result.suggestions[0].match_score, 120.0);
    }

    #[test]
    fn test_catalog_lunch_suggestions() {
        let result = suggest_meals(
            MealSlot::Lunch,
            remaining(300.0, 10.0),
            Goal::Maintain,
            DietType::Vegan,
            &ScoringWeights::default(),
        );

        assert_eq!(result.meal_slot, MealSlot::Lunch);
        assert!(!result.suggestions.is_empty() && result.suggestions.len() <= 5);
        assert!(result.suggestions.iter().all(|s| s.tags.iter().any(|t| t == "vegan")));
        assert!(result.suggestions.windows(2).all(|w| w[0].match_score >= w[1].match_score));
        // 560 kcal falafel is over 1.2 × 300
        let falafel = result.suggestions.iter().find(|s| s.name == "Chickpea falafel pita").unwrap();
        assert_eq!(falafel.match_score, 70.0);
    }
}
