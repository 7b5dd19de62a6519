//! Mealwise Library
//!
//! Meal logging with nutrition analytics: summaries, trends, macro analysis,
//! recommendations and meal suggestions.

pub mod analytics;
pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
