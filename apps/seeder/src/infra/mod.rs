pub mod db_errors;
pub mod schema_guard;
pub mod schema_sync;
