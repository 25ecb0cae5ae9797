pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;
pub use sea_orm::{ConnectionTrait, DatabaseConnection};

mod m20251018_000001_create_students; // keep filename + module name in sync

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20251018_000001_create_students::Migration)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl MigrationCommand {
    /// Parse the CLI spelling of a command.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "fresh" => Some(Self::Fresh),
            "reset" => Some(Self::Reset),
            "refresh" => Some(Self::Refresh),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Run a migration command against an open connection.
/// Used by the seeder's schema sync, the CLI and tests.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let db_info_before = get_db_diagnostics(db).await?;

    tracing::info!("▶ cmd={command:?}  profile={}", db_info_before.profile);
    tracing::info!("▶ connected to DB: {}", db_info_before.name);
    tracing::info!(
        "▶ BEFORE: runner has {} migration(s) defined, {} applied",
        db_info_before.defined_migrations_count,
        db_info_before.mig_count
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            // Status does not change state
            if !matches!(command, MigrationCommand::Status) {
                let db_info_after = get_db_diagnostics(db).await?;
                tracing::info!(
                    "▶ AFTER: runner has {} migration(s) defined, {} applied",
                    db_info_after.defined_migrations_count,
                    db_info_after.mig_count
                );
            }
            tracing::info!("✅ {command:?} OK for {}", db_info_before.profile);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ {command:?} failed for {}: {e}", db_info_before.profile);
            Err(e)
        }
    }
}

#[derive(Debug)]
struct DbDiagnostics {
    profile: String,
    name: String,
    mig_count: usize,
    defined_migrations_count: usize,
}

async fn get_db_diagnostics(db: &DatabaseConnection) -> Result<DbDiagnostics, DbErr> {
    let backend = db.get_database_backend();
    let profile = format!("{backend:?}");

    let name = match backend {
        sea_orm::DatabaseBackend::MySql => {
            let stmt = Statement::from_string(backend, "SELECT DATABASE() AS name");
            match db.query_one(stmt).await? {
                Some(row) => row
                    .try_get::<Option<String>>("", "name")?
                    .unwrap_or_else(|| "<none>".to_string()),
                None => "<unknown>".to_string(),
            }
        }
        sea_orm::DatabaseBackend::Postgres => {
            let stmt = Statement::from_string(backend, "select current_database() as name");
            if let Some(row) = db.query_one(stmt).await? {
                row.try_get("", "name")?
            } else {
                "<unknown>".to_string()
            }
        }
        sea_orm::DatabaseBackend::Sqlite => {
            let stmt = Statement::from_string(
                backend,
                "SELECT file FROM pragma_database_list WHERE name = 'main'",
            );
            match db.query_one(stmt).await? {
                Some(row) => match row.try_get::<String>("", "file") {
                    Ok(file) if file.is_empty() => ":memory:".to_string(),
                    Ok(file) => file,
                    Err(_) => "<unknown>".to_string(),
                },
                None => "<unknown>".to_string(),
            }
        }
    };

    let applied_migrations_count = count_applied_migrations(db).await.unwrap_or(0);
    let defined_migrations_count = Migrator::migrations().len();

    Ok(DbDiagnostics {
        profile,
        name,
        mig_count: applied_migrations_count,
        defined_migrations_count,
    })
}

/// Count the number of migrations that have been applied to the database.
/// Returns 0 if the migration table doesn't exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) | Err(DbErr::Query(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Get the version string of the latest applied migration.
/// Returns None if no migrations have been applied or the migration table doesn't exist.
pub async fn get_latest_migration_version(
    db: &DatabaseConnection,
) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) | Err(DbErr::Query(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
