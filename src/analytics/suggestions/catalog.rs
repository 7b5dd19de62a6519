//! Static meal-template catalog

use crate::models::{MealSlot, Nutrition};

/// A candidate meal offered by the suggestion scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealTemplate {
    pub name: &'static str,
    pub slot: MealSlot,
    pub nutrition: Nutrition,
    pub tags: &'static [&'static str],
}

impl MealTemplate {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }
}

const fn n(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64, sugar: f64, sodium: f64) -> Nutrition {
    Nutrition {
        calories,
        protein,
        carbs,
        fat,
        fiber,
        sugar,
        sodium,
    }
}

const fn meal(
    name: &'static str,
    slot: MealSlot,
    nutrition: Nutrition,
    tags: &'static [&'static str],
) -> MealTemplate {
    MealTemplate {
        name,
        slot,
        nutrition,
        tags,
    }
}

use crate::models::MealSlot::{Breakfast, Dinner, Lunch, Snack};

pub const CATALOG: &[MealTemplate] = &[
    // Breakfast
    meal("Greek yogurt parfait", Breakfast, n(320.0, 22.0, 40.0, 8.0, 4.0, 18.0, 90.0), &["vegetarian", "high_protein"]),
    meal("Overnight oats with berries", Breakfast, n(380.0, 12.0, 62.0, 9.0, 9.0, 14.0, 60.0), &["vegetarian", "vegan", "high_fiber"]),
    meal("Veggie egg scramble", Breakfast, n(290.0, 20.0, 8.0, 19.0, 2.0, 3.0, 420.0), &["vegetarian", "low_carb", "high_protein"]),
    meal("Tofu breakfast burrito", Breakfast, n(420.0, 21.0, 48.0, 15.0, 8.0, 3.0, 610.0), &["vegetarian", "vegan", "high_protein"]),
    meal("Smoked salmon bagel", Breakfast, n(450.0, 24.0, 52.0, 14.0, 3.0, 6.0, 890.0), &["pescatarian"]),
    meal("Peanut butter banana toast", Breakfast, n(360.0, 12.0, 45.0, 15.0, 6.0, 12.0, 310.0), &["vegetarian", "vegan"]),
    // Lunch
    meal("Grilled chicken salad", Lunch, n(420.0, 38.0, 18.0, 22.0, 6.0, 6.0, 540.0), &["high_protein", "low_carb"]),
    meal("Quinoa buddha bowl", Lunch, n(510.0, 18.0, 72.0, 16.0, 12.0, 9.0, 380.0), &["vegetarian", "vegan", "high_fiber"]),
    meal("Turkey and avocado wrap", Lunch, n(480.0, 30.0, 42.0, 20.0, 7.0, 4.0, 820.0), &["high_protein"]),
    meal("Lentil soup with bread", Lunch, n(390.0, 20.0, 58.0, 7.0, 15.0, 6.0, 690.0), &["vegetarian", "vegan", "high_fiber"]),
    meal("Caprese sandwich", Lunch, n(530.0, 22.0, 50.0, 26.0, 3.0, 7.0, 760.0), &["vegetarian"]),
    meal("Tuna nicoise salad", Lunch, n(450.0, 34.0, 20.0, 26.0, 5.0, 5.0, 610.0), &["pescatarian", "high_protein"]),
    meal("Chickpea falafel pita", Lunch, n(560.0, 19.0, 70.0, 22.0, 11.0, 6.0, 880.0), &["vegetarian", "vegan"]),
    // Dinner
    meal("Baked salmon with vegetables", Dinner, n(520.0, 40.0, 22.0, 28.0, 6.0, 6.0, 430.0), &["pescatarian", "high_protein", "low_carb"]),
    meal("Chicken stir-fry with rice", Dinner, n(610.0, 42.0, 68.0, 15.0, 5.0, 9.0, 920.0), &["high_protein"]),
    meal("Vegetable tofu curry", Dinner, n(540.0, 22.0, 60.0, 22.0, 10.0, 11.0, 700.0), &["vegetarian", "vegan"]),
    meal("Lean beef chili", Dinner, n(580.0, 45.0, 40.0, 24.0, 12.0, 8.0, 980.0), &["high_protein", "high_fiber"]),
    meal("Spinach ricotta pasta", Dinner, n(650.0, 26.0, 82.0, 22.0, 7.0, 8.0, 640.0), &["vegetarian"]),
    meal("Black bean tacos", Dinner, n(490.0, 18.0, 66.0, 16.0, 16.0, 4.0, 720.0), &["vegetarian", "vegan", "high_fiber"]),
    // Snack
    meal("Apple with almond butter", Snack, n(200.0, 5.0, 24.0, 10.0, 5.0, 18.0, 5.0), &["vegetarian", "vegan"]),
    meal("Cottage cheese with pineapple", Snack, n(180.0, 16.0, 18.0, 4.0, 1.0, 14.0, 410.0), &["vegetarian", "high_protein"]),
    meal("Hummus and carrots", Snack, n(150.0, 5.0, 16.0, 8.0, 5.0, 5.0, 260.0), &["vegetarian", "vegan", "high_fiber"]),
    meal("Hard-boiled eggs", Snack, n(140.0, 12.0, 1.0, 10.0, 0.0, 1.0, 140.0), &["vegetarian", "low_carb", "high_protein"]),
    meal("Trail mix", Snack, n(290.0, 8.0, 26.0, 18.0, 3.0, 14.0, 90.0), &["vegetarian", "vegan"]),
    meal("Turkey jerky", Snack, n(160.0, 26.0, 6.0, 2.0, 0.0, 5.0, 690.0), &["high_protein", "low_carb"]),
];

/// Templates offered for `slot`, in catalog order
pub fn for_slot(slot: MealSlot) -> impl Iterator<Item = &'static MealTemplate> {
    CATALOG.iter().filter(move |t| t.slot == slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_has_candidates() {
        for slot in MealSlot::ALL {
            assert!(for_slot(slot).count() >= 5, "{}", slot);
        }
    }

    #[test]
    fn test_vegan_templates_are_vegetarian() {
        for template in CATALOG.iter().filter(|t| t.has_tag("vegan")) {
            assert!(template.has_tag("vegetarian"), "{}", template.name);
        }
    }

    #[test]
    fn test_templates_are_valid_nutrition() {
        for template in CATALOG {
            assert!(template.nutrition.validate().is_ok(), "{}", template.name);
        }
    }
}
