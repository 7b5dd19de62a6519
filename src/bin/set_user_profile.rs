//! Utility to create or update a user profile from the command line
//!
//! ```text
//! set_user_profile --name "Sam" --goal lose_weight --diet vegetarian \
//!     --weight 72 --height 170 --age 41 --sex female --activity light
//! set_user_profile --user-id 1 --goal maintain
//! ```
//!
//! When body stats and an activity level are on record, daily targets are
//! recalculated and saved.

use mealwise::analytics::EngineConfig;
use mealwise::config::AppConfig;
use mealwise::tools::users::{self, ProfileFields};

const USAGE: &str = "usage: set_user_profile [--user-id ID] [--name NAME] [--goal GOAL] [--diet DIET] \
[--weight KG --height CM --age YEARS --sex SEX] [--activity LEVEL] [--allergies a,b,c]";

fn parse_args(args: &[String]) -> Result<(Option<i64>, ProfileFields), String> {
    let mut user_id = None;
    let mut fields = ProfileFields::default();

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("missing value for {}\n{}", flag, USAGE))?;
        let number = |what: &str| value.parse::<f64>().map_err(|_| format!("{} must be a number, got '{}'", what, value));

        match flag.as_str() {
            "--user-id" => user_id = Some(value.parse::<i64>().map_err(|_| format!("invalid user id '{}'", value))?),
            "--name" => fields.name = Some(value.clone()),
            "--goal" => fields.goal = Some(value.clone()),
            "--diet" => fields.diet_type = Some(value.clone()),
            "--weight" => fields.weight_kg = Some(number("weight")?),
            "--height" => fields.height_cm = Some(number("height")?),
            "--age" => fields.age = Some(value.parse::<u32>().map_err(|_| format!("invalid age '{}'", value))?),
            "--sex" => fields.sex = Some(value.clone()),
            "--activity" => fields.activity_level = Some(value.clone()),
            "--allergies" => {
                fields.allergies = Some(
                    value
                        .split(',')
                        .map(|a| a.trim().to_string())
                        .filter(|a| !a.is_empty())
                        .collect(),
                )
            }
            other => return Err(format!("unknown flag {}\n{}", other, USAGE)),
        }
    }

    Ok((user_id, fields))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (user_id, fields) = parse_args(&args)?;

    let config = AppConfig::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = mealwise::db::Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        mealwise::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let engine_config: EngineConfig = config.engine;
    let user = match user_id {
        Some(id) => users::update_user(&database, id, &fields)?
            .ok_or_else(|| format!("User not found with id: {}", id))?,
        None => users::create_user(&database, &fields, &engine_config)?,
    };

    if user.body.is_some() && user.activity_level.is_some() {
        users::calculate_targets(&database, user.id, true, &engine_config)?;
    }

    let user = users::get_user(&database, user.id)?.ok_or("User disappeared after saving")?;
    println!("User profile saved:");
    println!("  ID: {}", user.id);
    println!("  Name: {}", user.name);
    println!("  Goal: {}", user.goal);
    println!("  Diet: {}", user.diet_type);
    let t = &user.daily_targets;
    println!(
        "  Targets: {:.0} kcal, {:.0}g protein, {:.0}g carbs, {:.0}g fat, {:.0}g fiber, {:.0} ml water",
        t.calories, t.protein, t.carbs, t.fat, t.fiber, t.water
    );
    println!("  Updated: {}", user.updated_at);

    Ok(())
}
