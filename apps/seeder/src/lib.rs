//! Student seeder: connect, synchronize the `students` table and insert one record.

pub mod adapters;
pub mod db;
pub mod entities;
pub mod error;
pub mod infra;
pub mod repos;
pub mod seed;
pub mod telemetry;

pub use adapters::students_sea::StudentCreate;
pub use db::connection::{with_connection, Connection};
pub use error::AppError;
pub use infra::schema_sync::sync_schema;
