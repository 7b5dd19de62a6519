//! Daily and weekly summaries
//!
//! Reduces meal records to per-day nutrient totals. A day with no records is
//! an all-zero summary, never an absent one.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::models::{MealRecord, Nutrition};
use super::config::MacroCalorieFactors;
use super::macros::{analyze_macros, MacroAnalysis};
use super::trend::{build_trend, trend_statistics, TrendStatistics};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Days covered by the weekly window, today included
pub const WEEK_DAYS: i64 = 7;

/// Inclusive timestamp bounds of a calendar day: 00:00:00.000 to 23:59:59.999.
///
/// Store queries use these against millisecond timestamps. In-memory grouping
/// goes by `consumed_at.date()` instead.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = start + Duration::milliseconds(MILLIS_PER_DAY - 1);
    (start, end)
}

/// First day of the 7-day window ending on `today`
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WEEK_DAYS - 1)
}

/// Nutrient totals for one user and one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_fiber: f64,
    pub total_sugar: f64,
    pub total_sodium: f64,
    pub meal_count: usize,
}

impl DailySummary {
    pub fn empty(date: NaiveDate) -> Self {
        Self::from_totals(date, &Nutrition::zero(), 0)
    }

    pub fn from_totals(date: NaiveDate, totals: &Nutrition, meal_count: usize) -> Self {
        Self {
            date,
            total_calories: totals.calories,
            total_protein: totals.protein,
            total_carbs: totals.carbs,
            total_fat: totals.fat,
            total_fiber: totals.fiber,
            total_sugar: totals.sugar,
            total_sodium: totals.sodium,
            meal_count,
        }
    }

    pub fn totals(&self) -> Nutrition {
        Nutrition {
            calories: self.total_calories,
            protein: self.total_protein,
            carbs: self.total_carbs,
            fat: self.total_fat,
            fiber: self.total_fiber,
            sugar: self.total_sugar,
            sodium: self.total_sodium,
        }
    }
}

/// Summarize the records consumed on `date`; records from other days are ignored
pub fn summarize_records(date: NaiveDate, records: &[MealRecord]) -> DailySummary {
    let (totals, count) = records
        .iter()
        .filter(|r| r.consumed_at.date() == date)
        .fold((Nutrition::zero(), 0usize), |(acc, n), r| (acc + r.nutrition, n + 1));

    DailySummary::from_totals(date, &totals, count)
}

/// Seven-day roll-up ending on (and including) `end_date`
#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailySummary>,
    pub statistics: TrendStatistics,
    pub meal_count: usize,
    pub macros: MacroAnalysis,
}

/// Build the weekly summary from the records of the window
pub fn summarize_week(
    end_date: NaiveDate,
    records: &[MealRecord],
    factors: &MacroCalorieFactors,
) -> WeeklySummary {
    let start_date = week_start(end_date);
    let points = build_trend(records, start_date, end_date);
    let statistics = trend_statistics(&points);
    let days = points
        .iter()
        .map(|p| DailySummary::from_totals(p.date, &p.nutrition, p.meal_count))
        .collect::<Vec<_>>();
    let meal_count = days.iter().map(|d| d.meal_count).sum();
    let macros = analyze_macros(&statistics.totals, factors);

    WeeklySummary {
        start_date,
        end_date,
        days,
        statistics,
        meal_count,
        macros,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::models::{MealRecord, MealSlot, Nutrition};

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.3f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .unwrap()
    }

    pub fn macros(calories: f64, protein: f64, carbs: f64, fat: f64) -> Nutrition {
        Nutrition {
            calories,
            protein,
            carbs,
            fat,
            ..Nutrition::zero()
        }
    }

    pub fn record(consumed_at: &str, slot: MealSlot, nutrition: Nutrition) -> MealRecord {
        MealRecord {
            id: 0,
            user_id: 1,
            name: format!("{} meal", slot),
            meal_slot: slot,
            nutrition,
            consumed_at: at(consumed_at),
            is_favorite: false,
            notes: None,
            created_at: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::MealSlot;

    #[test]
    fn test_day_bounds_cover_whole_day() {
        let (start, end) = day_bounds(date("2026-03-09"));
        assert_eq!(start, at("2026-03-09 00:00:00.000"));
        assert_eq!(end, at("2026-03-09 23:59:59.999"));
    }

    #[test]
    fn test_empty_day_is_all_zero() {
        let summary = summarize_records(date("2026-03-09"), &[]);
        assert_eq!(summary, DailySummary::empty(date("2026-03-09")));
        assert_eq!(summary.meal_count, 0);
        assert_eq!(summary.total_calories, 0.0);
        assert_eq!(summary.total_sodium, 0.0);
    }

    #[test]
    fn test_summarize_only_counts_the_requested_day() {
        let records = vec![
            record("2026-03-08 23:59:59.999", MealSlot::Snack, macros(300.0, 5.0, 40.0, 10.0)),
            record("2026-03-09 00:00:00.000", MealSlot::Breakfast, macros(400.0, 20.0, 50.0, 10.0)),
            record("2026-03-09 12:30", MealSlot::Lunch, macros(600.0, 35.0, 60.0, 20.0)),
            record("2026-03-09 23:59:59.999", MealSlot::Snack, macros(150.0, 3.0, 20.0, 5.0)),
            record("2026-03-10 00:00:00.000", MealSlot::Breakfast, macros(999.0, 1.0, 1.0, 1.0)),
        ];

        let summary = summarize_records(date("2026-03-09"), &records);
        assert_eq!(summary.meal_count, 3);
        assert!((summary.total_calories - 1150.0).abs() < 1e-9);
        assert!((summary.total_protein - 58.0).abs() < 1e-9);
        assert!((summary.total_fat - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_sub_millisecond_record_agrees_with_trend() {
        let mut late = record("2026-03-09 12:00", MealSlot::Snack, macros(200.0, 5.0, 30.0, 6.0));
        late.consumed_at = date("2026-03-09").and_hms_micro_opt(23, 59, 59, 999_500).unwrap();
        let records = vec![late];

        let summary = summarize_records(date("2026-03-09"), &records);
        let points = build_trend(&records, date("2026-03-09"), date("2026-03-09"));
        assert_eq!(summary.meal_count, 1);
        assert_eq!(points[0].meal_count, summary.meal_count);
        assert_eq!(points[0].nutrition.calories, summary.total_calories);
    }

    #[test]
    fn test_weekly_summary_window() {
        let records = vec![
            record("2026-03-03 08:00", MealSlot::Breakfast, macros(500.0, 25.0, 60.0, 15.0)),
            record("2026-03-09 19:00", MealSlot::Dinner, macros(700.0, 40.0, 70.0, 25.0)),
        ];
        let week = summarize_week(date("2026-03-09"), &records, &MacroCalorieFactors::default());

        assert_eq!(week.start_date, date("2026-03-03"));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.meal_count, 2);
        assert_eq!(week.statistics.days_with_meals, 2);
        assert!((week.statistics.averages.calories - 600.0).abs() < 1e-9);
    }
}
