//! Mealwise
//!
//! An MCP server for meal logging and nutrition analytics.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use mealwise::analytics::{NutritionEngine, SystemClock};
use mealwise::build_info;
use mealwise::config::AppConfig;
use mealwise::db::{self, SqliteStore};
use mealwise::mcp::MealwiseService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    // Logs go to stderr; stdout carries the MCP stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = config.database_path.clone();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let store = Arc::new(SqliteStore::new(database.clone()));
    let engine = NutritionEngine::new(store.clone(), store, Arc::new(SystemClock)).with_config(config.engine);
    tracing::info!(now = ?engine.now(), "analytics engine ready");

    let service = MealwiseService::new(db_path, database, Arc::new(engine));

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
