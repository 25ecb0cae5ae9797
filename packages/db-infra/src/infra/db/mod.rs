pub mod core;

pub use self::core::{build_admin_pool, connect, orchestrate_migration};
