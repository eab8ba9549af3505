//! Database layer
//!
//! SQLite persistence for users, sessions, news, comments and notes.
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk::config::DatabaseConfig;
//! use newsdesk::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqliteDatabase};
