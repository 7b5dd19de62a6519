//! Database module
//!
//! SQLite connection pool, migrations, and the SQLite-backed collaborator
//! stores consumed by the analytics engine.

pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::{Database, DbError, DbResult};
pub use store::SqliteStore;
