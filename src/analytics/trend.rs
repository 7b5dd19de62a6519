//! Gap-filled daily trends
//!
//! Every calendar day of the requested window gets exactly one point, in
//! ascending order, whether or not anything was logged that day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{MealRecord, Nutrition};

/// One day of a trend series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    pub meal_count: usize,
}

impl TrendPoint {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            nutrition: Nutrition::zero(),
            meal_count: 0,
        }
    }
}

/// Window statistics. Averages are taken over tracked days only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendStatistics {
    pub total_days: usize,
    pub days_with_meals: usize,
    pub totals: Nutrition,
    pub averages: Nutrition,
}

/// A trend series together with its statistics
#[derive(Debug, Clone, Serialize)]
pub struct NutritionTrend {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: Vec<TrendPoint>,
    pub statistics: TrendStatistics,
}

/// Build one point per day in `[start, end]`.
///
/// Records outside the window are ignored. An inverted window yields no points.
pub fn build_trend(records: &[MealRecord], start: NaiveDate, end: NaiveDate) -> Vec<TrendPoint> {
    if start > end {
        return Vec::new();
    }

    let mut by_day: BTreeMap<NaiveDate, TrendPoint> = BTreeMap::new();
    for record in records {
        let day = record.consumed_at.date();
        if day < start || day > end {
            continue;
        }
        let point = by_day.entry(day).or_insert_with(|| TrendPoint::empty(day));
        point.nutrition = point.nutrition + record.nutrition;
        point.meal_count += 1;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| by_day.remove(&day).unwrap_or_else(|| TrendPoint::empty(day)))
        .collect()
}

pub fn trend_statistics(points: &[TrendPoint]) -> TrendStatistics {
    let tracked: Vec<&TrendPoint> = points.iter().filter(|p| p.meal_count > 0).collect();
    let totals: Nutrition = tracked.iter().map(|p| p.nutrition).sum();

    TrendStatistics {
        total_days: points.len(),
        days_with_meals: tracked.len(),
        totals,
        averages: totals.average_over(tracked.len()),
    }
}

pub fn nutrition_trend(records: &[MealRecord], start: NaiveDate, end: NaiveDate) -> NutritionTrend {
    let points = build_trend(records, start, end);
    let statistics = trend_statistics(&points);
    NutritionTrend {
        start_date: start,
        end_date: end,
        points,
        statistics,
    }
}
