//! Macro-nutrient distribution
//!
//! Percentages come from calories derived from macro grams, which may differ
//! from the calories the user logged. Both are reported side by side.

use serde::Serialize;

use crate::models::Nutrition;
use super::config::MacroCalorieFactors;

/// Whole-number percentage of macro-derived calories per macro
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroDistribution {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Calories contributed by each macro
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroCalories {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroAnalysis {
    pub distribution: MacroDistribution,
    pub calories_from_macros: MacroCalories,
    /// Calories as logged on the records, independent of the macro grams
    pub logged_calories: f64,
}

fn percent_of(part: f64, total: f64) -> u32 {
    if total <= 0.0 {
        return 0;
    }
    (part / total * 100.0).round() as u32
}

pub fn analyze_macros(totals: &Nutrition, factors: &MacroCalorieFactors) -> MacroAnalysis {
    let protein = totals.protein * factors.protein;
    let carbs = totals.carbs * factors.carbs;
    let fat = totals.fat * factors.fat;
    let total = protein + carbs + fat;

    let distribution = if total > 0.0 {
        MacroDistribution {
            protein: percent_of(protein, total),
            carbs: percent_of(carbs, total),
            fat: percent_of(fat, total),
        }
    } else {
        MacroDistribution::default()
    };

    MacroAnalysis {
        distribution,
        calories_from_macros: MacroCalories {
            protein,
            carbs,
            fat,
            total,
        },
        logged_calories: totals.calories,
    }
}
