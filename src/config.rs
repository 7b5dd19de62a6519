//! Runtime configuration
//!
//! Resolved from the environment at startup and shared by the server and the
//! utility binaries.

use std::path::PathBuf;

use crate::analytics::EngineConfig;

/// Database location override
pub const DATABASE_PATH_ENV: &str = "MEALWISE_DATABASE_PATH";

/// Log directive added on top of `RUST_LOG`
pub const DEFAULT_LOG_DIRECTIVE: &str = "mealwise=info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_directive: String,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_path: database_path_from(std::env::var(DATABASE_PATH_ENV).ok()),
            log_directive: DEFAULT_LOG_DIRECTIVE.to_string(),
            engine: EngineConfig::default(),
        }
    }
}

fn database_path_from(override_path: Option<String>) -> PathBuf {
    match override_path.filter(|p| !p.trim().is_empty()) {
        Some(path) => PathBuf::from(path),
        None => default_database_path(),
    }
}

/// `<project>/data/mealwise.db`, where the project root is found from the
/// executable's location
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("mealwise.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(
            database_path_from(Some("/tmp/meals.db".to_string())),
            PathBuf::from("/tmp/meals.db")
        );
    }

    #[test]
    fn test_blank_override_falls_back() {
        let path = database_path_from(Some("  ".to_string()));
        assert!(path.ends_with("data/mealwise.db"));
        assert!(database_path_from(None).ends_with("data/mealwise.db"));
    }
}
