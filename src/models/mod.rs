//! Data models
//!
//! Rust structs representing database entities.

mod meal_record;
mod nutrition;
mod user;

pub use meal_record::{
    format_timestamp, MealRecord, MealRecordCreate, MealRecordUpdate, MealSlot, TIMESTAMP_FORMAT,
};
pub use nutrition::{Nutrition, MAX_RECORD_CALORIES};
pub use user::{
    ActivityLevel, BodyStats, DailyTargets, DietType, Goal, Sex, UserCreate, UserProfile,
    UserUpdate,
};
