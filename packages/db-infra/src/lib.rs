//! Shared database configuration and connection infrastructure.
//! Used by the seeder and the migration CLI.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db;
pub use error::DbInfraError;
pub use infra::db::core::{build_admin_pool, connect, orchestrate_migration};
