//! Storage layer - SQLite
//!
//! Provides database management and migrations for roster.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//!
//! # Usage
//!
//! ```ignore
//! use roster_core::storage::Database;
//!
//! // Create an in-memory database for testing
//! let db = Database::in_memory().await?;
//!
//! // Or open a file-backed database
//! let db = Database::open("roster.db").await?;
//! ```

pub mod database;
pub mod migrations;

pub use database::{Database, DatabaseConfig, DEFAULT_MAX_CONNECTIONS, default_database_path};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
