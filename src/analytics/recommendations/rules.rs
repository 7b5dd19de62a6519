//! The individual recommendation rules

use crate::models::{Goal, MealSlot};
use super::{Category, Priority, Recommendation, RecommendationRule, RuleContext};

pub const HIGH_PROTEIN_FOODS: &[&str] = &[
    "Greek yogurt",
    "Chicken breast",
    "Eggs",
    "Lentils",
    "Cottage cheese",
    "Tofu",
];

pub const FIBER_FOODS: &[&str] = &[
    "Oatmeal",
    "Black beans",
    "Chia seeds",
    "Raspberries",
    "Broccoli",
    "Whole-grain bread",
];

pub const CALORIE_DENSE_FOODS: &[&str] = &[
    "Nuts and nut butter",
    "Avocado",
    "Whole milk",
    "Granola",
    "Dried fruit",
    "Olive oil",
];

/// Percentage as shown to the user; rule logic uses the raw value
fn display_pct(pct: f64) -> f64 {
    pct.clamp(0.0, 100.0).round()
}

/// Overall calorie intake versus target. At most one outcome per evaluation.
pub struct CalorieRule;

impl RecommendationRule for CalorieRule {
    fn name(&self) -> &'static str {
        "calories"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let t = ctx.thresholds;
        let pct = ctx.calorie_pct();
        let consumed = ctx.today.total_calories;
        let target = ctx.targets.calories;

        let rec = if ctx.today.meal_count == 0 && ctx.now.hour >= t.first_meal_hour {
            Recommendation::new(
                Category::Calories,
                Priority::High,
                "You haven't logged any meals today",
                "Log your first meal so today's guidance reflects what you've actually eaten.",
            )
            .with_action("Log a meal")
        } else if pct < t.low_calorie_pct && ctx.now.hour >= t.low_calorie_hour {
            Recommendation::new(
                Category::Calories,
                Priority::High,
                "Calorie intake is very low",
                format!(
                    "You've eaten {:.0} of {:.0} kcal ({}%) and the afternoon is under way. \
                     Regular meals keep your energy steady.",
                    consumed,
                    target,
                    display_pct(pct)
                ),
            )
            .with_action("Plan your next meal")
            .with_data("remaining", (target - consumed).max(0.0))
        } else if pct > 100.0 {
            let over_by = consumed - target;
            let exceeded = if ctx.goal == Goal::LoseWeight {
                Recommendation::new(
                    Category::Calories,
                    Priority::High,
                    "Calorie target exceeded",
                    format!(
                        "You're {:.0} kcal over your {:.0} kcal target. Keep the rest of the day \
                         light to stay on course for weight loss.",
                        over_by, target
                    ),
                )
            } else {
                Recommendation::new(
                    Category::Calories,
                    Priority::Low,
                    "Calorie target exceeded",
                    format!("You're {:.0} kcal over your {:.0} kcal target today.", over_by, target),
                )
            };
            exceeded.with_data("over_by", over_by)
        } else if pct >= t.on_track_calorie_pct {
            Recommendation::new(
                Category::Calories,
                Priority::Low,
                "Calories on track",
                format!("You've reached {}% of your calorie target. Nicely balanced.", display_pct(pct)),
            )
        } else {
            return None;
        };

        Some(rec.with_data("percentage", pct))
    }
}

pub struct ProteinRule;

impl RecommendationRule for ProteinRule {
    fn name(&self) -> &'static str {
        "protein"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let t = ctx.thresholds;
        let pct = ctx.protein_pct();
        let remaining = (ctx.targets.protein - ctx.today.total_protein).max(0.0);

        let rec = if pct < t.low_protein_pct && ctx.now.hour >= t.low_protein_hour {
            Recommendation::new(
                Category::Protein,
                Priority::High,
                "Protein intake is low",
                format!(
                    "You've had {}% of your protein target. Add about {:.0}g of protein to dinner.",
                    display_pct(pct),
                    remaining
                ),
            )
            .with_suggestions(HIGH_PROTEIN_FOODS)
        } else if ctx.goal == Goal::BuildMuscle
            && pct < t.muscle_protein_pct
            && ctx.now.hour >= t.muscle_protein_hour
        {
            Recommendation::new(
                Category::Protein,
                Priority::Medium,
                "More protein for muscle growth",
                format!(
                    "Muscle building needs steady protein. {:.0}g to go today.",
                    remaining
                ),
            )
            .with_action("Add a protein-rich snack")
        } else {
            return None;
        };

        Some(rec.with_data("percentage", pct).with_data("remaining", remaining))
    }
}

/// Share of carbs in the day's macro grams
pub struct CarbBalanceRule;

impl RecommendationRule for CarbBalanceRule {
    fn name(&self) -> &'static str {
        "carb_balance"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let grams = ctx.macro_grams();
        if grams <= 0.0 {
            return None;
        }
        let ratio = ctx.today.total_carbs / grams;
        (ratio > ctx.thresholds.carb_ratio_max).then(|| {
            Recommendation::new(
                Category::MacroBalance,
                Priority::Medium,
                "Carb-heavy day",
                format!(
                    "Carbohydrates make up {:.0}% of today's macros. Balance them with protein and healthy fats.",
                    ratio * 100.0
                ),
            )
            .with_data("carb_ratio", ratio)
        })
    }
}

/// Share of fat in the day's macro grams
pub struct FatBalanceRule;

impl RecommendationRule for FatBalanceRule {
    fn name(&self) -> &'static str {
        "fat_balance"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let grams = ctx.macro_grams();
        if grams <= 0.0 {
            return None;
        }
        let ratio = ctx.today.total_fat / grams;
        (ratio > ctx.thresholds.fat_ratio_max).then(|| {
            Recommendation::new(
                Category::MacroBalance,
                Priority::Medium,
                "High fat intake",
                format!(
                    "Fat makes up {:.0}% of today's macros. Lean proteins and vegetables can even it out.",
                    ratio * 100.0
                ),
            )
            .with_data("fat_ratio", ratio)
        })
    }
}

pub struct BreakfastRule;

impl RecommendationRule for BreakfastRule {
    fn name(&self) -> &'static str {
        "breakfast_frequency"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let breakfasts = ctx.weekly_slot_count(MealSlot::Breakfast);
        (breakfasts < ctx.thresholds.min_weekly_breakfasts).then(|| {
            Recommendation::new(
                Category::MealTiming,
                Priority::Medium,
                "Breakfast skipping",
                format!(
                    "You logged breakfast {} time(s) in the last 7 days. A morning meal helps regulate appetite.",
                    breakfasts
                ),
            )
            .with_action("Log breakfast tomorrow")
            .with_data("breakfasts", breakfasts as f64)
        })
    }
}

pub struct SnackingRule;

impl RecommendationRule for SnackingRule {
    fn name(&self) -> &'static str {
        "snack_frequency"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let snacks = ctx.weekly_slot_count(MealSlot::Snack);
        (snacks > ctx.thresholds.max_weekly_snacks).then(|| {
            Recommendation::new(
                Category::MealTiming,
                Priority::Low,
                "Frequent snacking",
                format!(
                    "{} snacks in the last 7 days. Fuller main meals may reduce the need to snack.",
                    snacks
                ),
            )
            .with_data("snacks", snacks as f64)
        })
    }
}

/// One branch per goal
pub struct GoalRule;

impl RecommendationRule for GoalRule {
    fn name(&self) -> &'static str {
        "goal"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let t = ctx.thresholds;
        match ctx.goal {
            Goal::LoseWeight => {
                let pct = ctx.fiber_pct();
                (pct < t.low_fiber_pct).then(|| {
                    Recommendation::new(
                        Category::Goal,
                        Priority::Medium,
                        "Add more fiber",
                        "Fiber keeps you full for longer, which makes a calorie deficit easier to hold.",
                    )
                    .with_suggestions(FIBER_FOODS)
                    .with_data("percentage", pct)
                })
            }
            Goal::GainWeight | Goal::BuildMuscle => {
                let pct = ctx.calorie_pct();
                (pct < t.surplus_calorie_pct && ctx.now.hour >= t.surplus_hour).then(|| {
                    let remaining = (ctx.targets.calories - ctx.today.total_calories).max(0.0);
                    Recommendation::new(
                        Category::Goal,
                        Priority::High,
                        "Calorie surplus at risk",
                        format!(
                            "You still need about {:.0} kcal today to support your goal.",
                            remaining
                        ),
                    )
                    .with_suggestions(CALORIE_DENSE_FOODS)
                    .with_data("percentage", pct)
                    .with_data("remaining", remaining)
                })
            }
            Goal::Maintain => {
                let pct = ctx.calorie_pct();
                ((pct - 100.0).abs() <= t.maintain_tolerance_pct).then(|| {
                    Recommendation::new(
                        Category::Goal,
                        Priority::Low,
                        "Maintenance on point",
                        "Your intake is within 10% of your target. Great consistency.",
                    )
                    .with_data("percentage", pct)
                })
            }
        }
    }
}

pub struct HydrationRule;

impl RecommendationRule for HydrationRule {
    fn name(&self) -> &'static str {
        "hydration"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Recommendation> {
        let t = ctx.thresholds;
        (t.hydration_start_hour..=t.hydration_end_hour)
            .contains(&ctx.now.hour)
            .then(|| {
                Recommendation::new(
                    Category::Hydration,
                    Priority::Low,
                    "Stay hydrated",
                    format!(
                        "Keep drinking water through the afternoon. Your daily target is {:.0} ml.",
                        ctx.targets.water
                    ),
                )
                .with_data("water_target", ctx.targets.water)
            })
    }
}
